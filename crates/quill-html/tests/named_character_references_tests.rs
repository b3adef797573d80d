//! Integration tests for named character reference lookup.

use quill_html::tokenizer::named_character_references::{any_entity_has_prefix, lookup_entity};

#[test]
fn test_lookup_common_entities() {
    assert_eq!(lookup_entity("amp;"), Some("&"));
    assert_eq!(lookup_entity("lt;"), Some("<"));
    assert_eq!(lookup_entity("gt;"), Some(">"));
    assert_eq!(lookup_entity("quot;"), Some("\""));
    assert_eq!(lookup_entity("nbsp;"), Some("\u{00A0}"));
}

#[test]
fn test_lookup_legacy_entities() {
    // Legacy entities without semicolon
    assert_eq!(lookup_entity("amp"), Some("&"));
    assert_eq!(lookup_entity("lt"), Some("<"));
    assert_eq!(lookup_entity("gt"), Some(">"));
}

#[test]
fn test_lookup_unknown_entity() {
    assert_eq!(lookup_entity("notarealentity;"), None);
    assert_eq!(lookup_entity(""), None);
}

#[test]
fn test_prefix_matching() {
    assert!(any_entity_has_prefix("a")); // amp, apos, alpha, etc.
    assert!(any_entity_has_prefix("am")); // amp
    assert!(any_entity_has_prefix("amp")); // amp, amp;
    assert!(any_entity_has_prefix("amp;")); // amp;
    assert!(!any_entity_has_prefix("ampx")); // nothing
    assert!(!any_entity_has_prefix("xyz")); // nothing
}

#[test]
fn test_lookup_html5_only_entities() {
    assert_eq!(lookup_entity("rightarrow;"), Some("\u{2192}"));
    assert_eq!(lookup_entity("bigstar;"), Some("\u{2605}"));
    assert_eq!(lookup_entity("NotEqualTilde;"), Some("\u{2242}\u{0338}"));
    assert_eq!(lookup_entity("CounterClockwiseContourIntegral;"), Some("\u{2233}"));
    assert_eq!(lookup_entity("fjlig;"), Some("fj"));
    assert_eq!(lookup_entity("NewLine;"), Some("\n"));
    // Only the legacy names may appear without a semicolon.
    assert_eq!(lookup_entity("rightarrow"), None);
}

#[test]
fn test_lookup_mathematical_alphanumerics() {
    assert_eq!(lookup_entity("Afr;"), Some("\u{1D504}"));
    assert_eq!(lookup_entity("zopf;"), Some("\u{1D56B}"));
    assert_eq!(lookup_entity("Zscr;"), Some("\u{1D4B5}"));
}

#[test]
fn test_prefixes_of_long_names() {
    assert!(any_entity_has_prefix("CounterClockwise"));
    assert!(any_entity_has_prefix("NotEqualTilde"));
    assert!(!any_entity_has_prefix("NotEqualTildes"));
}
