//! The tree backend interface used by the tree constructor.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! "As each token is emitted from the tokenizer, the user agent must follow
//! the appropriate steps from the following list, known as the tree
//! construction dispatcher"
//!
//! The tree constructor owns the stack of open elements and the list of
//! active formatting elements. Everything it does to the document goes
//! through the structural primitives of [`TreeBuilder`], so any arena or
//! pointer-based DOM can sit behind it. [`DomTree`] is the default backend.

use std::fmt::Debug;

use quill_dom::{
    AttributesMap, DoctypeData, DomTree, ElementData, Namespace, NodeId, NodeType, QuirksMode,
};

use crate::tokenizer::Attribute;

/// Structural primitives the tree constructor issues against a document.
pub trait TreeBuilder {
    /// Opaque node handle.
    type Handle: Copy + Eq + Debug;

    /// The document (or document fragment) node.
    fn document(&self) -> Self::Handle;

    /// [§ 13.2.6.1 Create an element for a token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// Allocates an element that is not yet in the tree.
    fn create_element(
        &mut self,
        name: &str,
        namespace: Namespace,
        attributes: &[Attribute],
    ) -> Self::Handle;

    /// Allocates a comment node that is not yet in the tree.
    fn create_comment(&mut self, data: &str) -> Self::Handle;

    /// "Append a DocumentType node to the Document node"
    fn append_doctype(&mut self, name: &str, public_id: &str, system_id: &str);

    /// Appends `child` as the last child of `parent`, detaching it first.
    fn append_child(&mut self, parent: Self::Handle, child: Self::Handle);

    /// Inserts `child` into `parent` immediately before `reference`.
    fn insert_before(&mut self, parent: Self::Handle, child: Self::Handle, reference: Self::Handle);

    /// Removes `child` from `parent`. The node stays allocated.
    fn remove_child(&mut self, parent: Self::Handle, child: Self::Handle);

    /// Moves every child of `from` to the end of `to`, in order.
    fn reparent_children(&mut self, from: Self::Handle, to: Self::Handle);

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// Inserts text before `before` (or at the end of `parent`), merging with
    /// an adjacent text node.
    fn insert_text(&mut self, parent: Self::Handle, before: Option<Self::Handle>, data: &str);

    /// The parent of a node, if it is in the tree.
    fn parent(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The local name and namespace of an element. `None` for other nodes.
    fn element_name(&self, element: Self::Handle) -> Option<(&str, Namespace)>;

    /// "add the attribute and its corresponding value to that element" for
    /// each attribute the element does not already have.
    fn add_attributes_if_missing(&mut self, element: Self::Handle, attributes: &[Attribute]);

    /// Sets the tainted flag on a table. The flag is never cleared.
    fn mark_tainted(&mut self, table: Self::Handle);

    /// Whether content has been foster-parented out of this table.
    fn is_tainted(&self, table: Self::Handle) -> bool;

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    ///
    /// Records the document's quirks mode.
    fn set_quirks_mode(&mut self, mode: QuirksMode);

    /// A shallow copy of an element: same name, namespace and attributes, no
    /// children, not in the tree.
    fn clone_element(&mut self, element: Self::Handle) -> Self::Handle;
}

impl TreeBuilder for DomTree {
    type Handle = NodeId;

    fn document(&self) -> NodeId {
        self.root()
    }

    fn create_element(&mut self, name: &str, namespace: Namespace, attributes: &[Attribute]) -> NodeId {
        let attrs = attributes
            .iter()
            .map(|attr| (attr.name.clone(), attr.value.clone()))
            .collect();
        self.alloc(NodeType::Element(ElementData::new(name, namespace, attrs)))
    }

    fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Comment(data.to_string()))
    }

    fn append_doctype(&mut self, name: &str, public_id: &str, system_id: &str) {
        let doctype = self.alloc(NodeType::Doctype(DoctypeData {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }));
        self.append_child(self.root(), doctype);
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        Self::append_child(self, parent, child);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        Self::insert_before(self, parent, child, reference);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        Self::remove_child(self, parent, child);
    }

    fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        self.move_children(from, to);
    }

    fn insert_text(&mut self, parent: NodeId, before: Option<NodeId>, data: &str) {
        Self::insert_text(self, parent, before, data);
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Self::parent(self, node)
    }

    fn element_name(&self, element: NodeId) -> Option<(&str, Namespace)> {
        self.as_element(element)
            .map(|data| (data.tag_name.as_str(), data.namespace))
    }

    fn add_attributes_if_missing(&mut self, element: NodeId, attributes: &[Attribute]) {
        let Some(data) = self.as_element_mut(element) else {
            return;
        };
        for attr in attributes {
            let _ = data
                .attrs
                .entry(attr.name.clone())
                .or_insert_with(|| attr.value.clone());
        }
    }

    fn mark_tainted(&mut self, table: NodeId) {
        if let Some(data) = self.as_element_mut(table) {
            data.tainted = true;
        }
    }

    fn is_tainted(&self, table: NodeId) -> bool {
        self.as_element(table).is_some_and(|data| data.tainted)
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        Self::set_quirks_mode(self, mode);
    }

    fn clone_element(&mut self, element: NodeId) -> NodeId {
        let data = match self.as_element(element) {
            Some(data) => ElementData::new(&data.tag_name, data.namespace, data.attrs.clone()),
            None => ElementData::html("", AttributesMap::default()),
        };
        self.alloc(NodeType::Element(data))
    }
}
