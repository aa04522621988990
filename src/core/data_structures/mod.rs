/*!
 * Data Structures
 *
 * - SSO strings: inline storage for short strings, heap for the rest
 *
 * # Performance
 *
 * - Strings <= 23 bytes never allocate
 * - Heap growth doubles from 32 bytes
 */

mod sso;

pub use sso::{SsoString, StrView};
