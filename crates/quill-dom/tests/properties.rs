//! Property tests: arbitrary sequences of mutations keep parent, child and
//! sibling links consistent.

use quickcheck_macros::quickcheck;
use quill_dom::{AttributesMap, DomTree, ElementData, NodeId, NodeType};

const POOL: usize = 8;

fn check_links(tree: &DomTree) -> bool {
    for index in 0..tree.len() {
        let id = NodeId(index);
        let children = tree.children(id);
        for (pos, &child) in children.iter().enumerate() {
            if tree.parent(child) != Some(id) {
                return false;
            }
            let expected_prev = pos.checked_sub(1).map(|p| children[p]);
            let expected_next = children.get(pos + 1).copied();
            if tree.prev_sibling(child) != expected_prev
                || tree.next_sibling(child) != expected_next
            {
                return false;
            }
        }
        if let Some(parent) = tree.parent(id)
            && !tree.children(parent).contains(&id)
        {
            return false;
        }
    }
    true
}

#[quickcheck]
fn mutations_keep_links_consistent(ops: Vec<(u8, u8, u8)>) -> bool {
    let mut tree = DomTree::new();
    let nodes: Vec<NodeId> = (0..POOL)
        .map(|i| {
            tree.alloc(NodeType::Element(ElementData::html(
                &format!("e{i}"),
                AttributesMap::default(),
            )))
        })
        .collect();

    for (op, a, b) in ops {
        let a = nodes[usize::from(a) % POOL];
        let b = nodes[usize::from(b) % POOL];
        // Never create cycles.
        if a == b || tree.is_descendant_of(a, b) {
            continue;
        }
        match op % 4 {
            0 => tree.append_child(a, b),
            1 => {
                if let Some(reference) = tree.first_child(a) {
                    tree.insert_before(a, b, reference);
                }
            }
            2 => tree.detach(b),
            _ => {
                if !tree.is_descendant_of(b, a) {
                    tree.move_children(a, b);
                }
            }
        }
        if !check_links(&tree) {
            return false;
        }
    }
    true
}
