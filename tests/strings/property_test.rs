/*!
 * SSO Property Tests
 */

use proptest::prelude::*;
use sysprims::SsoString;

fn ascii_text(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop::sample::select(b"abcXYZ ,_-\t.".to_vec()),
        0..max_len,
    )
}

fn build(bytes: &[u8]) -> SsoString {
    SsoString::from_bytes(bytes).unwrap()
}

proptest! {
    #[test]
    fn prop_nul_follows_content(chunks in prop::collection::vec(ascii_text(20), 0..8)) {
        let mut value = SsoString::new();
        let mut expected = Vec::new();
        for chunk in &chunks {
            value.append(chunk).unwrap();
            expected.extend_from_slice(chunk);

            prop_assert_eq!(value.as_bytes(), &expected[..]);
            prop_assert_eq!(value.as_bytes_with_nul()[value.len()], 0);
            prop_assert!(value.len() < value.capacity());
        }
    }

    #[test]
    fn prop_promotion_is_one_way(first in ascii_text(64), second in ascii_text(64)) {
        let mut value = build(&first);
        let was_heap = value.is_heap();
        value.append(&second).unwrap();
        value.trim();
        value.clear();
        prop_assert!(!was_heap || value.is_heap());
    }

    #[test]
    fn prop_case_and_trim_idempotent(text in ascii_text(48)) {
        let mut lower = build(&text);
        lower.lower();
        let once = lower.clone();
        lower.lower();
        prop_assert_eq!(&lower, &once);

        let mut upper = build(&text);
        upper.upper();
        let once = upper.clone();
        upper.upper();
        prop_assert_eq!(&upper, &once);

        let mut trimmed = build(&text);
        trimmed.trim();
        let once = trimmed.clone();
        trimmed.trim();
        prop_assert_eq!(&trimmed, &once);
    }

    #[test]
    fn prop_split_join_round_trip(
        text in ascii_text(64),
        delim in prop::sample::select(vec![",", "_", "--", ", "]),
    ) {
        let value = build(&text);
        let parts = value.split(delim).unwrap();
        prop_assert_eq!(parts.len(), value.count_substr(delim) + 1);

        let joined = SsoString::join(&parts, delim).unwrap();
        prop_assert_eq!(joined, value);
    }

    #[test]
    fn prop_replace_all_leaves_no_match(text in ascii_text(64)) {
        let value = build(&text);
        let replaced = value.replace_all(",", ";").unwrap();
        prop_assert_eq!(replaced.len(), value.len());
        prop_assert_eq!(replaced.count_substr(","), 0);
        prop_assert_eq!(replaced.count_substr(";"), value.count_substr(","));
    }

    #[test]
    fn prop_reverse_twice_is_identity(text in ascii_text(64)) {
        let value = build(&text);
        let back = value.reverse().unwrap().reverse().unwrap();
        prop_assert_eq!(back, value);
    }
}
