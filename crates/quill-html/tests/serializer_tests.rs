//! Integration tests for the tree dump and HTML serialization.

use quill_dom::NodeId;
use quill_html::{parse_document, parse_fragment, test_serializer, to_html};

fn roundtrip(html: &str) {
    let (first, _) = parse_document(html);
    let serialized = to_html(&first, NodeId::ROOT);
    let (second, _) = parse_document(&serialized);
    assert_eq!(
        test_serializer(&first, NodeId::ROOT),
        test_serializer(&second, NodeId::ROOT),
        "serialized as {serialized}"
    );
}

#[test]
fn test_dump_doctype_with_identifiers() {
    let (tree, _) = parse_document(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "sys">"#);
    assert!(
        test_serializer(&tree, NodeId::ROOT)
            .starts_with("#document\n|  <!DOCTYPE html \"-//W3C//DTD HTML 4.01//EN\" \"sys\">")
    );
}

#[test]
fn test_dump_indents_two_spaces_per_level() {
    let (tree, _) = parse_document("<!DOCTYPE html><p id=a>x");
    let dump = test_serializer(&tree, NodeId::ROOT);
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(
        lines,
        vec![
            "#document",
            "|  <!DOCTYPE html>",
            "|  <html>",
            "|    <head>",
            "|    <body>",
            "|      <p>",
            "|        id=\"a\"",
            "|        \"x\"",
        ]
    );
}

#[test]
fn test_dump_comment_and_attributes() {
    let (tree, _) = parse_document(r#"<!DOCTYPE html><!--c--><p id=x class="y z">"#);
    assert_eq!(
        test_serializer(&tree, NodeId::ROOT),
        "#document\n\
         |  <!DOCTYPE html>\n\
         |  <!-- c -->\n\
         |  <html>\n\
         |    <head>\n\
         |    <body>\n\
         |      <p>\n\
         |        class=\"y z\"\n\
         |        id=\"x\""
    );
}

#[test]
fn test_to_html_escapes() {
    let (tree, _, _) =
        parse_fragment(r#"<p title='a"b&amp;'>1 &lt; 2 &amp;&nbsp;</p><br>"#, "div").expect("fragment");
    assert_eq!(
        to_html(&tree, NodeId::ROOT),
        r#"<p title="a&quot;b&amp;">1 &lt; 2 &amp;&nbsp;</p><br>"#
    );
}

#[test]
fn test_to_html_raw_text() {
    let (tree, _) = parse_document("<script>a < b && c</script>");
    let html = to_html(&tree, NodeId::ROOT);
    assert!(html.contains("<script>a < b && c</script>"));
}

#[test]
fn test_roundtrip_well_formed_document() {
    roundtrip(
        "<!DOCTYPE html><html><head><title>T &amp; U</title><style>p > a {}</style></head>\
         <body><p class=\"a\" id=\"b\">x <b>bold</b> y</p><br><pre>\n\nz</pre>\
         <ul><li>one</li><li>two</li></ul>\
         <table><tbody><tr><td>1</td><td>2</td></tr></tbody></table>\
         <svg viewBox=\"0 0 1 1\"><circle r=\"1\"></circle></svg>\
         <!-- note --></body></html>",
    );
}

#[test]
fn test_roundtrip_implied_structure() {
    roundtrip("<p>1<b>2<i>3</p>4");
    roundtrip("<table><tr><td>a</table>");
    roundtrip("<select><option>a<option>b</select>");
}
