/*!
 * SSO String Tests
 * Inline/heap promotion, transforms and conversions through the public API
 */

use pretty_assertions::assert_eq;
use std::ffi::CString;
use sysprims::core::limits::{SSO_INLINE_CAPACITY, SSO_MAX};
use sysprims::{SsoString, StrError, StrView};

fn s(text: &str) -> SsoString {
    SsoString::from_bytes(text.as_bytes()).expect("Failed to build string")
}

#[test]
fn test_snake_case_promotes_to_heap() {
    let mut value = s("HelloWorldMyDearFriend");
    assert!(!value.is_heap());

    value.snake_case().expect("snake_case failed");
    assert_eq!(value, "hello_world_my_dear_friend");
    assert!(value.is_heap());
    assert_eq!(value.len(), 26);
}

#[test]
fn test_split_then_join_round_trips() {
    let value = s("a,b,,c,");
    let parts = value.split(",").unwrap();
    let texts: Vec<&[u8]> = parts.iter().map(|p| p.as_bytes()).collect();
    assert_eq!(texts, vec![&b"a"[..], b"b", b"", b"c", b""]);

    let joined = SsoString::join(&parts, ",").unwrap();
    assert_eq!(joined, value);
}

#[test]
fn test_inline_boundary() {
    let max_inline = "x".repeat(SSO_MAX);
    let value = s(&max_inline);
    assert!(!value.is_heap());
    assert_eq!(value.capacity(), SSO_INLINE_CAPACITY);

    let mut grown = value.clone();
    grown.append_char(b'y').unwrap();
    assert!(grown.is_heap());
    assert_eq!(grown.len(), SSO_MAX + 1);
}

#[test]
fn test_promotion_is_one_way() {
    let mut value = s(&"long enough to spill out of the inline buffer".repeat(2));
    assert!(value.is_heap());

    value.clear();
    assert!(value.is_empty());
    assert!(value.is_heap());

    value.append("tiny").unwrap();
    value.resize(2).unwrap();
    assert_eq!(value, "t");
    assert!(value.is_heap());
}

#[test]
fn test_always_nul_terminated() {
    let mut value = SsoString::new();
    assert_eq!(value.as_bytes_with_nul(), b"\0");

    value.append("abc").unwrap();
    value.prepend(">> ").unwrap();
    value.insert(3, "[").unwrap();
    value.remove(0, 1).unwrap();
    assert_eq!(value, "> [abc");
    assert_eq!(value.as_bytes_with_nul().last(), Some(&0));

    for _ in 0..10 {
        value.append(" more text").unwrap();
    }
    assert!(value.is_heap());
    assert_eq!(value.as_bytes_with_nul().len(), value.len() + 1);
    assert_eq!(value.as_bytes_with_nul()[value.len()], 0);
}

#[test]
fn test_c_string_interop() {
    let owned = CString::new("from C").unwrap();
    let value = SsoString::from_c_str(&owned).unwrap();
    assert_eq!(value, "from C");
    assert_eq!(value.as_c_str(), Some(owned.as_c_str()));

    // Interior NUL cannot be viewed as a C string
    let mut with_nul = s("a");
    with_nul.append_char(0).unwrap();
    with_nul.append_char(b'b').unwrap();
    assert_eq!(with_nul.len(), 3);
    assert!(with_nul.as_c_str().is_none());
}

#[test]
fn test_transform_chain() {
    let mut value = s("  \t hello_big_world \x0b\n");
    value.trim();
    assert_eq!(value, "hello_big_world");

    value.pascal_case().unwrap();
    assert_eq!(value, "HelloBigWorld");

    value.camel_case().unwrap();
    assert_eq!(value, "helloBigWorld");

    value.upper();
    assert_eq!(value, "HELLOBIGWORLD");

    let mut title = s("the QUICK brown fox");
    title.title_case();
    assert_eq!(title, "The Quick Brown Fox");
}

#[test]
fn test_search_edge_cases() {
    let value = s("abcabc");
    assert_eq!(value.find(""), Some(0));
    assert_eq!(value.rfind(""), Some(6));
    assert_eq!(value.count_substr(""), 0);
    assert_eq!(value.rfind("abc"), Some(3));
    assert_eq!(value.find("abcd"), None);
    assert_eq!(value.at(2), Some(b'c'));
    assert_eq!(value.at(6), None);
}

#[test]
fn test_remove_helpers() {
    let mut value = s("a-b-c--d");
    assert_eq!(value.remove_char(b'-'), 4);
    assert_eq!(value, "abcd");

    let mut value = s("foo bar foo baz foo");
    assert_eq!(value.remove_all("foo"), 3);
    assert_eq!(value, " bar  baz ");
}

#[test]
fn test_insert_out_of_bounds() {
    let mut value = s("abc");
    assert_eq!(
        value.insert(4, "x"),
        Err(StrError::IndexOutOfBounds { index: 4, len: 3 })
    );
    assert_eq!(value, "abc");
}

#[test]
fn test_append_fmt() {
    let mut value = s("id=");
    value
        .append_fmt(format_args!("{}:{:04}", "node", 7))
        .unwrap();
    assert_eq!(value, "id=node:0007");
}

#[test]
fn test_views_borrow_without_copying() {
    let value = s("key=value");
    let view = value.as_view();
    let eq = view.find("=").unwrap();

    let key = view.slice(0, eq);
    let val = view.slice(eq + 1, usize::MAX);
    assert_eq!(key, StrView::from("key"));
    assert_eq!(val.as_bytes(), b"value");
    assert_eq!(val.as_bytes().as_ptr(), value.as_bytes()[eq + 1..].as_ptr());

    let owned = val.to_owned_string().unwrap();
    assert_eq!(owned, "value");
}

#[test]
fn test_serde_round_trip() {
    let value = s("with \"quotes\" and a long enough tail");
    let json = serde_json::to_string(&value).unwrap();
    let back: SsoString = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
    assert!(back.is_heap());
}
