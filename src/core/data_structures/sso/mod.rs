/*!
 * SSO Strings
 *
 * Owned byte strings with small-string optimization:
 * - Inline storage for up to 23 bytes, heap beyond that
 * - NUL-terminated at all times, so C APIs can borrow the buffer
 * - One-way promotion: a heap string never moves back inline
 * - ASCII case transforms, trimming, search, split/join
 *
 * [`StrView`] is the borrowed counterpart carrying the read-only query set.
 */

mod case;
mod mutate;
mod query;
mod repr;
mod scan;
mod split;
mod traits;
mod view;

pub use repr::SsoString;
pub use view::StrView;
