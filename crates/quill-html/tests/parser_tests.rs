//! Integration tests for the HTML parser.

use quill_dom::{DomTree, Namespace, NodeId, NodeType, QuirksMode};
use quill_html::{
    ParseError, ParseErrorCode, Parser, ParserOptions, TreeConstructor, parse_document,
    test_serializer,
};

/// Helper to parse HTML and return the DOM tree
fn parse(html: &str) -> DomTree {
    parse_document(html).0
}

/// Helper to parse HTML and return the fixture dump
fn dump(html: &str) -> String {
    test_serializer(&parse(html), NodeId::ROOT)
}

/// Helper to collect the error codes for an input
fn error_codes(html: &str) -> Vec<ParseErrorCode> {
    parse_document(html).1.iter().map(|error| error.code).collect()
}

/// Helper to get element by tag name (first match, depth-first)
fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    tree.descendants(from)
        .find(|&id| tree.as_element(id).is_some_and(|data| data.tag_name == tag))
}

/// Helper to get text content of a node (concatenated)
fn text_content(tree: &DomTree, id: NodeId) -> String {
    tree.descendants(id)
        .filter_map(|node| tree.as_text(node))
        .collect()
}

#[test]
fn test_document_structure() {
    let (tree, errors) = parse_document("<!DOCTYPE html><p>Hello</p>");
    assert!(errors.is_empty());
    assert_eq!(
        test_serializer(&tree, NodeId::ROOT),
        "#document\n\
         |  <!DOCTYPE html>\n\
         |  <html>\n\
         |    <head>\n\
         |    <body>\n\
         |      <p>\n\
         |        \"Hello\""
    );
    assert!(matches!(
        tree.get(NodeId::ROOT).map(|node| &node.node_type),
        Some(NodeType::Document)
    ));
}

#[test]
fn test_empty_input_builds_skeleton() {
    let (tree, errors) = parse_document("");
    assert_eq!(
        test_serializer(&tree, NodeId::ROOT),
        "#document\n|  <html>\n|    <head>\n|    <body>"
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ParseErrorCode::ExpectedDoctypeButGotEof);
}

#[test]
fn test_head_content() {
    assert_eq!(
        dump("<!DOCTYPE html><title>A &amp; B</title><script>if (a<b) {}</script>"),
        "#document\n\
         |  <!DOCTYPE html>\n\
         |  <html>\n\
         |    <head>\n\
         |      <title>\n\
         |        \"A & B\"\n\
         |      <script>\n\
         |        \"if (a<b) {}\"\n\
         |    <body>"
    );
}

#[test]
fn test_misnested_formatting_is_reconstructed() {
    assert_eq!(
        dump("<p>1<b>2<i>3</p>4"),
        "#document\n\
         |  <html>\n\
         |    <head>\n\
         |    <body>\n\
         |      <p>\n\
         |        \"1\"\n\
         |        <b>\n\
         |          \"2\"\n\
         |          <i>\n\
         |            \"3\"\n\
         |      <b>\n\
         |        <i>\n\
         |          \"4\""
    );
}

#[test]
fn test_adoption_agency_moves_block() {
    assert_eq!(
        dump("<b>1<p>2</b>3</p>"),
        "#document\n\
         |  <html>\n\
         |    <head>\n\
         |    <body>\n\
         |      <b>\n\
         |        \"1\"\n\
         |      <p>\n\
         |        <b>\n\
         |          \"2\"\n\
         |        \"3\""
    );
}

#[test]
fn test_foster_parenting_taints_table_once() {
    let (tree, errors) = parse_document("<table>X<tr><td>Y</td></tr></table>");
    assert_eq!(
        test_serializer(&tree, NodeId::ROOT),
        "#document\n\
         |  <html>\n\
         |    <head>\n\
         |    <body>\n\
         |      \"X\"\n\
         |      <table>\n\
         |        <tbody>\n\
         |          <tr>\n\
         |            <td>\n\
         |              \"Y\""
    );

    let voodoo = errors
        .iter()
        .filter(|error| error.code == ParseErrorCode::UnexpectedCharImpliesTableVoodoo)
        .count();
    assert_eq!(voodoo, 1);

    let table = find_element(&tree, NodeId::ROOT, "table").expect("table");
    assert!(tree.as_element(table).is_some_and(|data| data.tainted));
    let body = tree.body().expect("body");
    assert_eq!(tree.children(body).len(), 2);
    assert_eq!(tree.as_text(tree.children(body)[0]), Some("X"));
}

#[test]
fn test_tainted_table_fosters_later_text() {
    let (tree, errors) = parse_document("<table>a<tr>b</tr></table>");
    let body = tree.body().expect("body");
    assert_eq!(tree.as_text(tree.children(body)[0]), Some("ab"));
    let voodoo = errors
        .iter()
        .filter(|error| error.code == ParseErrorCode::UnexpectedCharImpliesTableVoodoo)
        .count();
    assert_eq!(voodoo, 1);
}

#[test]
fn test_whitespace_stays_in_untainted_table() {
    let tree = parse("<table> <tr><td>x</td></tr></table>");
    let table = find_element(&tree, NodeId::ROOT, "table").expect("table");
    assert_eq!(tree.as_text(tree.children(table)[0]), Some(" "));
    assert!(tree.as_element(table).is_some_and(|data| !data.tainted));
}

#[test]
fn test_table_closed_by_end_of_table() {
    assert_eq!(
        dump("<table><tr><td>a</table>b"),
        "#document\n\
         |  <html>\n\
         |    <head>\n\
         |    <body>\n\
         |      <table>\n\
         |        <tbody>\n\
         |          <tr>\n\
         |            <td>\n\
         |              \"a\"\n\
         |      \"b\""
    );
}

#[test]
fn test_void_element_with_trailing_solidus() {
    let (tree, errors) = parse_document("<!DOCTYPE html><p>a<br/>b");
    let br = find_element(&tree, NodeId::ROOT, "br").expect("br");
    assert!(tree.children(br).is_empty());
    let p = find_element(&tree, NodeId::ROOT, "p").expect("p");
    assert_eq!(tree.children(p).len(), 3);
    assert!(errors.is_empty());

    let codes = error_codes("<!DOCTYPE html><div/>x");
    assert_eq!(
        codes,
        vec![ParseErrorCode::NonVoidHtmlElementStartTagWithTrailingSolidus]
    );
}

#[test]
fn test_void_element_not_left_on_stack() {
    let mut parser = TreeConstructor::new("<!DOCTYPE html><br>", DomTree::new(), Vec::<ParseError>::new());
    parser.run();
    let top = *parser.open_elements().last().expect("open element");
    assert_eq!(
        parser.builder().as_element(top).map(|data| data.tag_name.as_str()),
        Some("body")
    );
}

#[test]
fn test_element_in_scope_after_insert() {
    let mut parser = TreeConstructor::new("<div><span>", DomTree::new(), Vec::<ParseError>::new());
    parser.run();
    assert!(parser.element_in_scope("span"));
    assert!(parser.element_in_scope("div"));
    assert!(!parser.element_in_scope("p"));
}

#[test]
fn test_stray_end_p_creates_paragraph() {
    let (tree, errors) = parse_document("<!DOCTYPE html><body></p>");
    let p = find_element(&tree, NodeId::ROOT, "p").expect("p");
    assert!(tree.children(p).is_empty());
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_list_items_close_each_other() {
    let tree = parse("<ul><li>a<li>b</ul>");
    let ul = find_element(&tree, NodeId::ROOT, "ul").expect("ul");
    assert_eq!(tree.children(ul).len(), 2);
    assert_eq!(text_content(&tree, ul), "ab");
}

#[test]
fn test_select_options() {
    assert_eq!(
        dump("<!DOCTYPE html><select><option>a<option>b<p>c</select>"),
        "#document\n\
         |  <!DOCTYPE html>\n\
         |  <html>\n\
         |    <head>\n\
         |    <body>\n\
         |      <select>\n\
         |        <option>\n\
         |          \"a\"\n\
         |        <option>\n\
         |          \"bc\""
    );
}

#[test]
fn test_pre_drops_leading_newline() {
    let tree = parse("<pre>\nx</pre><textarea>\n\ny</textarea>");
    let pre = find_element(&tree, NodeId::ROOT, "pre").expect("pre");
    assert_eq!(text_content(&tree, pre), "x");
    let textarea = find_element(&tree, NodeId::ROOT, "textarea").expect("textarea");
    assert_eq!(text_content(&tree, textarea), "\ny");
}

#[test]
fn test_plaintext_swallows_markup() {
    let tree = parse("<plaintext><b>x</plaintext>");
    let plaintext = find_element(&tree, NodeId::ROOT, "plaintext").expect("plaintext");
    assert_eq!(text_content(&tree, plaintext), "<b>x</plaintext>");
}

#[test]
fn test_image_renamed_to_img() {
    let (tree, errors) = parse_document("<!DOCTYPE html><image src=a>");
    assert!(find_element(&tree, NodeId::ROOT, "img").is_some());
    assert!(find_element(&tree, NodeId::ROOT, "image").is_none());
    assert_eq!(errors[0].code, ParseErrorCode::UnexpectedStartTagTreatedAs);
}

#[test]
fn test_frameset_document() {
    assert_eq!(
        dump("<!DOCTYPE html><frameset><frame></frameset>"),
        "#document\n\
         |  <!DOCTYPE html>\n\
         |  <html>\n\
         |    <head>\n\
         |    <frameset>\n\
         |      <frame>"
    );
}

#[test]
fn test_svg_names_are_adjusted() {
    assert_eq!(
        dump(r##"<!DOCTYPE html><svg viewbox="0 0 1 1"><foreignobject><p>x</p></foreignobject><a xlink:href="#y"/></svg>"##),
        "#document\n\
         |  <!DOCTYPE html>\n\
         |  <html>\n\
         |    <head>\n\
         |    <body>\n\
         |      <svg svg>\n\
         |        viewBox=\"0 0 1 1\"\n\
         |        <svg foreignObject>\n\
         |          <p>\n\
         |            \"x\"\n\
         |        <svg a>\n\
         |          xlink href=\"#y\""
    );
}

#[test]
fn test_html_breaks_out_of_mathml() {
    let (tree, errors) = parse_document("<!DOCTYPE html><math><mi>x</mi><p>y");
    assert_eq!(
        test_serializer(&tree, NodeId::ROOT),
        "#document\n\
         |  <!DOCTYPE html>\n\
         |  <html>\n\
         |    <head>\n\
         |    <body>\n\
         |      <math math>\n\
         |        <math mi>\n\
         |          \"x\"\n\
         |      <p>\n\
         |        \"y\""
    );
    assert_eq!(
        errors.iter().map(|error| error.code).collect::<Vec<_>>(),
        vec![ParseErrorCode::HtmlInForeignContent]
    );
    let p = find_element(&tree, NodeId::ROOT, "p").expect("p");
    assert_eq!(
        tree.as_element(p).map(|data| data.namespace),
        Some(Namespace::Html)
    );
}

#[test]
fn test_cdata_in_svg() {
    let tree = parse("<svg><![CDATA[a<b]]></svg>");
    let svg = find_element(&tree, NodeId::ROOT, "svg").expect("svg");
    assert_eq!(text_content(&tree, svg), "a<b");
}

#[test]
fn test_quirks_mode_from_doctype() {
    assert_eq!(parse("<p>").quirks_mode(), QuirksMode::Quirks);
    assert_eq!(parse("<!DOCTYPE html>").quirks_mode(), QuirksMode::NoQuirks);
    assert_eq!(
        parse(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "x">"#)
            .quirks_mode(),
        QuirksMode::LimitedQuirks
    );
}

#[test]
fn test_table_in_paragraph_depends_on_quirks() {
    let quirks = parse("<p><table></table>");
    let table = find_element(&quirks, NodeId::ROOT, "table").expect("table");
    let parent = quirks.parent(table).expect("parent");
    assert_eq!(
        quirks.as_element(parent).map(|data| data.tag_name.as_str()),
        Some("p")
    );

    let standard = parse("<!DOCTYPE html><p><table></table>");
    let table = find_element(&standard, NodeId::ROOT, "table").expect("table");
    let parent = standard.parent(table).expect("parent");
    assert_eq!(
        standard.as_element(parent).map(|data| data.tag_name.as_str()),
        Some("body")
    );
}

#[test]
fn test_noscript_depends_on_scripting() {
    let markup = "<!DOCTYPE html><body><noscript><p>x</p></noscript>";

    let (tree, _) = Parser::default().parse_document(markup);
    let noscript = find_element(&tree, NodeId::ROOT, "noscript").expect("noscript");
    assert!(find_element(&tree, noscript, "p").is_some());

    let parser = Parser::new(ParserOptions::new().with_scripting(true));
    let (tree, _) = parser.parse_document(markup);
    let noscript = find_element(&tree, NodeId::ROOT, "noscript").expect("noscript");
    assert_eq!(text_content(&tree, noscript), "<p>x</p>");
}

#[test]
fn test_head_noscript_keeps_head_content() {
    assert_eq!(
        dump("<!DOCTYPE html><head><noscript><link rel=x></noscript></head>"),
        "#document\n\
         |  <!DOCTYPE html>\n\
         |  <html>\n\
         |    <head>\n\
         |      <noscript>\n\
         |        <link>\n\
         |          rel=\"x\"\n\
         |    <body>"
    );
    assert!(error_codes("<!DOCTYPE html><head><noscript><style></style></noscript></head>").is_empty());
}

#[test]
fn test_head_noscript_closes_on_body_content() {
    let (tree, errors) = parse_document("<!DOCTYPE html><head><noscript><p>x</p></noscript>");
    let head = find_element(&tree, NodeId::ROOT, "head").expect("head");
    let noscript = find_element(&tree, head, "noscript").expect("noscript");
    assert!(tree.children(noscript).is_empty());

    let body = find_element(&tree, NodeId::ROOT, "body").expect("body");
    let p = find_element(&tree, body, "p").expect("p");
    assert_eq!(text_content(&tree, p), "x");
    assert!(errors.iter().any(|error| error.code == ParseErrorCode::UnexpectedStartTag));
}

#[test]
fn test_head_noscript_ignores_nested_head() {
    let codes = error_codes("<!DOCTYPE html><head><noscript><noscript><head></noscript></head>");
    assert_eq!(
        codes,
        vec![
            ParseErrorCode::UnexpectedStartTagIgnored,
            ParseErrorCode::UnexpectedStartTagIgnored
        ]
    );
    let tree = parse("<!DOCTYPE html><head><noscript><noscript></noscript></head>");
    let noscript = find_element(&tree, NodeId::ROOT, "noscript").expect("noscript");
    assert!(tree.children(noscript).is_empty());
}

#[test]
fn test_comments_after_body() {
    assert_eq!(
        dump("<!DOCTYPE html><body></body><!--a--></html><!--b-->"),
        "#document\n\
         |  <!DOCTYPE html>\n\
         |  <html>\n\
         |    <head>\n\
         |    <body>\n\
         |    <!-- a -->\n\
         |  <!-- b -->"
    );
}

#[test]
fn test_strict_mode_reports_first_error() {
    let parser = Parser::new(ParserOptions::new().with_strict_mode(true));
    assert!(parser.parse_document_strict("<!DOCTYPE html><p>ok</p>").is_ok());

    match parser.parse_document_strict("<p>") {
        Err(quill_html::Error::Strict(error)) => {
            assert_eq!(error.code, ParseErrorCode::ExpectedDoctypeButGotStartTag);
        }
        other => panic!("expected strict failure, got {other:?}"),
    }

    // Lenient parsers never fail.
    assert!(Parser::default().parse_document_strict("<p>").is_ok());
}

#[test]
fn test_max_errors_caps_the_list() {
    let parser = Parser::new(ParserOptions::new().with_max_errors(Some(1)));
    let (tree, errors) = parser.parse_document("</div></span></em>");
    assert_eq!(errors.len(), 1);
    assert!(tree.body().is_some());
}

#[test]
fn test_errors_serialize_to_json() {
    let (_, errors) = parse_document("<!DOCTYPE html><body></div>");
    let json = serde_json::to_value(&errors).expect("json");
    assert_eq!(json[0]["code"], "unexpected-end-tag");
    assert_eq!(json[0]["position"]["line"], 1);
    assert_eq!(json[0]["vars"]["name"], "div");
}

#[test]
fn test_error_display() {
    let (_, errors) = parse_document("<!DOCTYPE html><body></div>");
    assert_eq!(errors[0].to_string(), format!("{}: unexpected-end-tag name=div", errors[0].position));
}
