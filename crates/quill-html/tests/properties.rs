//! Property tests: the parser terminates on any input and always produces a
//! consistent document.

use quickcheck_macros::quickcheck;
use quill_dom::{DomTree, NodeId, NodeType};
use quill_html::{ParseError, TreeConstructor, parse_document, parse_fragment};

/// Snippets that drive the tree constructor through the body and table
/// insertion modes without switching the tokenizer to a text state.
const SNIPPETS: &[&str] = &[
    "<p>", "</p>", "<b>", "</b>", "<i>", "<a>", "</a>", "<table>", "</table>", "<tr>", "<td>",
    "</td>", "<caption>", "<ul>", "<li>", "<h1>", "</div>", "<button>", "</body>", "</html>", "x",
    " ", "<br>", "<hr>", "<colgroup>", "<tbody>",
];

fn build(indices: &[u8]) -> String {
    indices
        .iter()
        .map(|&i| SNIPPETS[usize::from(i) % SNIPPETS.len()])
        .collect()
}

fn links_consistent(tree: &DomTree, root: NodeId) -> bool {
    tree.descendants(root).all(|id| {
        tree.children(id)
            .iter()
            .all(|&child| tree.parent(child) == Some(id))
    })
}

#[quickcheck]
fn parse_document_terminates_with_one_document(input: String) -> bool {
    let (tree, _) = parse_document(&input);
    let document_nodes = tree
        .descendants(NodeId::ROOT)
        .filter(|&id| {
            tree.get(id)
                .is_some_and(|node| matches!(node.node_type, NodeType::Document))
        })
        .count();
    document_nodes == 1
        && tree
            .document_element()
            .and_then(|html| tree.as_element(html))
            .is_some_and(|data| data.is_html("html"))
}

#[quickcheck]
fn generated_markup_keeps_tree_consistent(indices: Vec<u8>) -> bool {
    let (tree, _) = parse_document(&build(&indices));
    links_consistent(&tree, NodeId::ROOT)
}

#[quickcheck]
fn fragment_nodes_hang_off_the_root(input: String) -> bool {
    let Ok((tree, nodes, _)) = parse_fragment(&input, "div") else {
        return false;
    };
    nodes.iter().all(|&node| tree.parent(node) == Some(NodeId::ROOT))
        && links_consistent(&tree, NodeId::ROOT)
}

#[quickcheck]
fn inserted_element_is_in_scope(indices: Vec<u8>) -> bool {
    let input = format!("{}<span>", build(&indices));
    let mut parser = TreeConstructor::new(&input, DomTree::new(), Vec::<ParseError>::new());
    parser.run();
    parser.element_in_scope("span")
}
