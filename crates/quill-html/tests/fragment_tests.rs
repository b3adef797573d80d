//! Integration tests for fragment parsing.

use quill_dom::{Namespace, NodeId, NodeType};
use quill_html::{Error, ParseErrorCode, Parser, ParserOptions, parse_fragment, test_serializer};

#[test]
fn test_text_in_cell_context() {
    let (tree, nodes, errors) = parse_fragment("hello", "td").expect("fragment");
    assert_eq!(nodes.len(), 1);
    assert_eq!(tree.as_text(nodes[0]), Some("hello"));
    assert!(errors.is_empty());
    assert!(tree.is_fragment());
    assert_eq!(tree.document_element(), None);
}

#[test]
fn test_no_html_wrapper() {
    let (tree, nodes, _) = parse_fragment("<p>a</p>b", "div").expect("fragment");
    assert_eq!(
        test_serializer(&tree, NodeId::ROOT),
        "#document-fragment\n|  <p>\n|    \"a\"\n|  \"b\""
    );
    assert_eq!(nodes.len(), 2);
    for node in nodes {
        assert_eq!(tree.parent(node), Some(NodeId::ROOT));
    }
}

#[test]
fn test_rcdata_context() {
    let (tree, nodes, _) = parse_fragment("<b>x</b>&amp;", "title").expect("fragment");
    assert_eq!(nodes.len(), 1);
    assert_eq!(tree.as_text(nodes[0]), Some("<b>x</b>&"));
}

#[test]
fn test_rawtext_context_ends_at_matching_end_tag() {
    let (tree, nodes, _) = parse_fragment("a</style>b", "style").expect("fragment");
    assert_eq!(nodes.len(), 1);
    assert_eq!(tree.as_text(nodes[0]), Some("ab"));
}

#[test]
fn test_row_context() {
    let (tree, nodes, _) = parse_fragment("<td>a<td>b", "tr").expect("fragment");
    assert_eq!(nodes.len(), 2);
    for node in nodes {
        assert!(tree.as_element(node).is_some_and(|data| data.is_html("td")));
    }
}

#[test]
fn test_text_in_table_context_reports_each_token() {
    let (tree, nodes, errors) = parse_fragment("abc", "table").expect("fragment");
    assert_eq!(nodes.len(), 1);
    assert_eq!(tree.as_text(nodes[0]), Some("abc"));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ParseErrorCode::UnexpectedCharImpliesTableVoodoo);

    let (_, _, errors) = parse_fragment("a<!--c-->b", "tbody").expect("fragment");
    let voodoo = errors
        .iter()
        .filter(|error| error.code == ParseErrorCode::UnexpectedCharImpliesTableVoodoo)
        .count();
    assert_eq!(voodoo, 2);
}

#[test]
fn test_select_context() {
    let (tree, nodes, errors) = parse_fragment("<option>a<p>b", "select").expect("fragment");
    assert_eq!(nodes.len(), 1);
    assert_eq!(
        test_serializer(&tree, NodeId::ROOT),
        "#document-fragment\n|  <option>\n|    \"ab\""
    );
    assert_eq!(errors[0].code, ParseErrorCode::UnexpectedStartTagInSelect);
}

#[test]
fn test_svg_context() {
    let (tree, nodes, _) = parse_fragment("<path/><foreignObject/>", "svg svg").expect("fragment");
    assert_eq!(nodes.len(), 2);
    let path = tree.as_element(nodes[0]).expect("path");
    assert_eq!(path.tag_name, "path");
    assert_eq!(path.namespace, Namespace::Svg);
    let foreign_object = tree.as_element(nodes[1]).expect("foreignObject");
    assert_eq!(foreign_object.tag_name, "foreignObject");
}

#[test]
fn test_svg_integration_point_context() {
    let (tree, nodes, _) = parse_fragment("<p>x</p>", "svg foreignObject").expect("fragment");
    assert_eq!(nodes.len(), 1);
    assert!(tree.as_element(nodes[0]).is_some_and(|data| data.is_html("p")));
}

#[test]
fn test_empty_context_is_rejected() {
    assert!(matches!(parse_fragment("x", ""), Err(Error::EmptyContext)));
    assert!(matches!(parse_fragment("x", "  "), Err(Error::EmptyContext)));
}

#[test]
fn test_end_html_is_ignored_in_fragment() {
    let (tree, nodes, errors) = parse_fragment("a</html>b", "div").expect("fragment");
    assert_eq!(nodes.len(), 1);
    assert_eq!(tree.as_text(nodes[0]), Some("ab"));
    assert!(!errors.is_empty());
}

#[test]
fn test_strict_fragment() {
    let parser = Parser::new(ParserOptions::new().with_strict_mode(true));
    let (tree, nodes) = parser
        .parse_fragment_strict("<em>fine</em>", "p")
        .expect("no errors");
    assert!(matches!(
        tree.get(nodes[0]).map(|node| &node.node_type),
        Some(NodeType::Element(_))
    ));
    assert!(matches!(
        parser.parse_fragment_strict("</em>", "p"),
        Err(Error::Strict(_))
    ));
}
