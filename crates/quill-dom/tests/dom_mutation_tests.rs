//! Tests for tree mutation methods: remove_child, insert_before, move_children,
//! insert_text. Also covers element namespaces and the table tainted flag.

use quill_dom::{AttributesMap, DomTree, ElementData, Namespace, NodeId, NodeType};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::html(tag, AttributesMap::default())))
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child);

    assert_eq!(tree.children(parent).len(), 1);

    tree.remove_child(parent, child);

    assert_eq!(tree.children(parent).len(), 0);
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_first_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, a);

    // b is now first child, c is second
    assert_eq!(tree.children(parent), &[b, c]);
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, b);

    // a and c are siblings now
    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_last_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, c);

    assert_eq!(tree.children(parent), &[a, b]);
    assert_eq!(tree.next_sibling(b), None);
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let existing = alloc_element(&mut tree, "b");
    tree.append_child(parent, existing);

    let new_child = alloc_element(&mut tree, "a");
    tree.insert_before(parent, new_child, existing);

    // new_child should be first, existing second
    assert_eq!(tree.children(parent), &[new_child, existing]);
    assert_eq!(tree.parent(new_child), Some(parent));
    assert_eq!(tree.next_sibling(new_child), Some(existing));
    assert_eq!(tree.prev_sibling(new_child), None);
    assert_eq!(tree.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_before_middle() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, c);

    let b = alloc_element(&mut tree, "b");
    tree.insert_before(parent, b, c);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

// ========== move_children ==========

#[test]
fn test_move_children_basic() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, from);
    tree.append_child(NodeId::ROOT, to);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(from, a);
    tree.append_child(from, b);

    tree.move_children(from, to);

    // from should be empty
    assert_eq!(tree.children(from).len(), 0);
    // to should have both children
    assert_eq!(tree.children(to), &[a, b]);
    assert_eq!(tree.parent(a), Some(to));
    assert_eq!(tree.parent(b), Some(to));
}

#[test]
fn test_move_children_appends_to_existing() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, from);
    tree.append_child(NodeId::ROOT, to);

    let existing = alloc_element(&mut tree, "x");
    tree.append_child(to, existing);

    let moved = alloc_element(&mut tree, "y");
    tree.append_child(from, moved);

    tree.move_children(from, to);

    assert_eq!(tree.children(to), &[existing, moved]);
    // Sibling links between existing and moved
    assert_eq!(tree.next_sibling(existing), Some(moved));
    assert_eq!(tree.prev_sibling(moved), Some(existing));
}

#[test]
fn test_move_children_empty_source() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, from);
    tree.append_child(NodeId::ROOT, to);

    // Moving no children should be a no-op
    tree.move_children(from, to);

    assert_eq!(tree.children(from).len(), 0);
    assert_eq!(tree.children(to).len(), 0);
}

#[test]
fn test_insert_before_unknown_reference_appends() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let other = alloc_element(&mut tree, "section");
    tree.append_child(NodeId::ROOT, parent);
    tree.append_child(NodeId::ROOT, other);

    let a = alloc_element(&mut tree, "a");
    tree.append_child(parent, a);

    // `other` is not a child of `parent`
    let b = alloc_element(&mut tree, "b");
    tree.insert_before(parent, b, other);

    assert_eq!(tree.children(parent), &[a, b]);
}

// ========== append_child re-parenting ==========

#[test]
fn test_append_child_detaches_from_old_parent() {
    let mut tree = DomTree::new();
    let first = alloc_element(&mut tree, "div");
    let second = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, first);
    tree.append_child(NodeId::ROOT, second);

    let moved = alloc_element(&mut tree, "b");
    tree.append_child(first, moved);
    tree.append_child(second, moved);

    assert!(tree.children(first).is_empty());
    assert_eq!(tree.children(second), &[moved]);
    assert_eq!(tree.parent(moved), Some(second));
}

#[test]
fn test_insert_before_moves_existing_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.insert_before(parent, c, a);

    assert_eq!(tree.children(parent), &[c, a, b]);
    assert_eq!(tree.prev_sibling(c), None);
    assert_eq!(tree.next_sibling(b), None);
}

// ========== insert_text ==========

#[test]
fn test_insert_text_merges_with_last_text_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, parent);

    tree.insert_text(parent, None, "Hello");
    tree.insert_text(parent, None, ", world");

    assert_eq!(tree.children(parent).len(), 1);
    let text = tree.children(parent)[0];
    assert_eq!(tree.as_text(text), Some("Hello, world"));
}

#[test]
fn test_insert_text_before_reference_merges_with_previous_sibling() {
    let mut tree = DomTree::new();
    let body = alloc_element(&mut tree, "body");
    tree.append_child(NodeId::ROOT, body);

    let table = alloc_element(&mut tree, "table");
    tree.append_child(body, table);

    tree.insert_text(body, Some(table), "A");
    tree.insert_text(body, Some(table), "B");

    assert_eq!(tree.children(body).len(), 2);
    let text = tree.children(body)[0];
    assert_eq!(tree.as_text(text), Some("AB"));
    assert_eq!(tree.next_sibling(text), Some(table));
}

#[test]
fn test_insert_text_does_not_merge_across_elements() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, parent);

    tree.insert_text(parent, None, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(parent, b);
    tree.insert_text(parent, None, "c");

    assert_eq!(tree.children(parent).len(), 3);
}

// ========== accessors ==========

#[test]
fn test_document_element_and_body() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, head);
    tree.append_child(html, body);

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.body(), Some(body));
    assert!(!tree.is_fragment());
    assert!(DomTree::new_fragment().is_fragment());
}

#[test]
fn test_descendants_are_in_document_order() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    let head = alloc_element(&mut tree, "head");
    let title = alloc_element(&mut tree, "title");
    let body = alloc_element(&mut tree, "body");
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, head);
    tree.append_child(head, title);
    tree.append_child(html, body);

    let order: Vec<NodeId> = tree.descendants(html).collect();
    assert_eq!(order, vec![html, head, title, body]);
    assert!(tree.is_descendant_of(title, html));
    assert!(!tree.is_descendant_of(body, head));
}

// ========== namespaces ==========

#[test]
fn test_foreign_element_is_not_html() {
    let mut tree = DomTree::new();
    let svg_title = tree.alloc(NodeType::Element(ElementData::new(
        "title",
        Namespace::Svg,
        AttributesMap::default(),
    )));
    let html_title = alloc_element(&mut tree, "title");
    tree.append_child(NodeId::ROOT, html_title);
    tree.append_child(html_title, svg_title);

    let svg = tree.as_element(svg_title).expect("element");
    assert_eq!(svg.namespace, Namespace::Svg);
    assert!(!svg.is_html("title"));
    assert!(tree.as_element(html_title).is_some_and(|data| data.is_html("title")));
}

#[test]
fn test_namespace_urls() {
    assert_eq!(Namespace::Html.url(), "http://www.w3.org/1999/xhtml");
    assert_eq!(Namespace::Svg.url(), "http://www.w3.org/2000/svg");
    assert_eq!(Namespace::MathMl.url(), "http://www.w3.org/1998/Math/MathML");
    assert!(!Namespace::Html.is_foreign());
    assert!(Namespace::Svg.is_foreign());
    assert!(Namespace::MathMl.is_foreign());
}

#[test]
fn test_foreign_root_is_still_document_element() {
    let mut tree = DomTree::new();
    let math = tree.alloc(NodeType::Element(ElementData::new(
        "math",
        Namespace::MathMl,
        AttributesMap::default(),
    )));
    tree.append_child(NodeId::ROOT, math);

    assert_eq!(tree.document_element(), Some(math));
    assert_eq!(tree.body(), None);
}

// ========== tainted flag ==========

#[test]
fn test_tainted_flag_starts_clear() {
    let mut tree = DomTree::new();
    let table = alloc_element(&mut tree, "table");
    assert!(tree.as_element(table).is_some_and(|data| !data.tainted));
}

#[test]
fn test_tainted_flag_survives_moves() {
    let mut tree = DomTree::new();
    let first = alloc_element(&mut tree, "div");
    let second = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, first);
    tree.append_child(NodeId::ROOT, second);

    let table = alloc_element(&mut tree, "table");
    tree.append_child(first, table);
    if let Some(data) = tree.as_element_mut(table) {
        data.tainted = true;
    }

    tree.move_children(first, second);
    assert_eq!(tree.parent(table), Some(second));
    assert!(tree.as_element(table).is_some_and(|data| data.tainted));

    tree.detach(table);
    assert_eq!(tree.parent(table), None);
    assert!(tree.as_element(table).is_some_and(|data| data.tainted));
}
