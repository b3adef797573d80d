//! Parsing and serializing pathologically deep documents.

use quill_dom::{DomTree, NodeId};
use quill_html::{parse_document, to_html};

fn count_elements(tree: &DomTree, tag: &str) -> usize {
    tree.descendants(NodeId::ROOT)
        .filter(|&id| tree.as_element(id).is_some_and(|data| data.is_html(tag)))
        .count()
}

fn deepest(tree: &DomTree, tag: &str) -> NodeId {
    tree.descendants(NodeId::ROOT)
        .filter(|&id| tree.as_element(id).is_some_and(|data| data.is_html(tag)))
        .last()
        .expect("at least one element")
}

#[test]
fn test_ten_thousand_open_formatting_elements() {
    let input = "<b>".repeat(10_000);
    let (tree, _) = parse_document(&input);
    assert_eq!(count_elements(&tree, "b"), 10_000);
    assert!(tree.ancestors(deepest(&tree, "b")).count() >= 10_000);

    let html = to_html(&tree, NodeId::ROOT);
    assert_eq!(html.matches("<b>").count(), 10_000);
    assert_eq!(html.matches("</b>").count(), 10_000);
}

#[test]
fn test_hundred_thousand_nested_divs() {
    let input = format!("{}x", "<div>".repeat(100_000));
    let (tree, _) = parse_document(&input);
    assert_eq!(count_elements(&tree, "div"), 100_000);

    let inner = deepest(&tree, "div");
    assert_eq!(tree.children(inner).len(), 1);
    assert_eq!(tree.as_text(tree.children(inner)[0]), Some("x"));

    let html = to_html(&tree, NodeId::ROOT);
    assert!(html.contains("<div>x</div>"));
    assert_eq!(html.matches("</div>").count(), 100_000);
}

#[test]
fn test_nested_tables() {
    let input = "<table><tr><td>".repeat(5_000);
    let (tree, _) = parse_document(&input);
    assert_eq!(count_elements(&tree, "table"), 5_000);
    assert_eq!(count_elements(&tree, "tbody"), 5_000);
    assert_eq!(count_elements(&tree, "td"), 5_000);

    let html = to_html(&tree, NodeId::ROOT);
    assert_eq!(html.matches("<td>").count(), 5_000);
}

#[test]
fn test_paragraph_closing_under_deep_nesting() {
    let input = format!("{}<p>a<p>b", "<div>".repeat(1_000));
    let (tree, _) = parse_document(&input);
    let inner = deepest(&tree, "div");
    let paragraphs: Vec<_> = tree.children(inner).to_vec();
    assert_eq!(paragraphs.len(), 2);
    for paragraph in paragraphs {
        assert!(tree.as_element(paragraph).is_some_and(|data| data.is_html("p")));
    }
}

#[test]
fn test_paragraph_moved_by_adoption_agency_still_closes() {
    let (tree, _) = parse_document("<b><div><p>x</b><p>y");
    let paragraphs: Vec<_> = tree
        .descendants(NodeId::ROOT)
        .filter(|&id| tree.as_element(id).is_some_and(|data| data.is_html("p")))
        .collect();
    assert_eq!(paragraphs.len(), 2);
    assert!(!tree.is_descendant_of(paragraphs[1], paragraphs[0]));
}
