//! Algorithms shared by the insertion modes: the stack of open elements and
//! its scopes, node insertion and foster parenting, the list of active
//! formatting elements and the adoption agency algorithm.

use quill_dom::Namespace;

use super::core::{FormattingEntry, Phase, TreeConstructor};
use super::foreign_content::{mathml, svg};
use crate::error::{ErrorSink, ParseErrorCode};
use crate::tokenizer::{Attribute, Token, TokenizerState};
use crate::tree_builder::TreeBuilder;

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
///
/// The element types that bound each flavour of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    /// "has an element in scope"
    Default,
    /// "has an element in list item scope"
    ListItem,
    /// "has an element in button scope"
    Button,
    /// "has an element in table scope"
    Table,
    /// "has an element in select scope"
    Select,
}

/// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
///
/// "while the current node is a dd element, a dt element, an li element, an
/// optgroup element, an option element, a p element, an rb element, an rp
/// element, an rt element, or an rtc element, the UA must pop the current
/// node off the stack of open elements."
const IMPLIED_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
///
/// "The following HTML elements are those that end up in the list of active
/// formatting elements: a, b, big, code, em, font, i, nobr, s, small, strike,
/// strong, tt, and u."
pub(super) const FORMATTING_ELEMENTS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt",
    "u",
];

/// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules"
const SPECIAL_HTML_ELEMENTS: &[&str] = &[
    "address",
    "applet",
    "area",
    "article",
    "aside",
    "base",
    "basefont",
    "bgsound",
    "blockquote",
    "body",
    "br",
    "button",
    "caption",
    "center",
    "col",
    "colgroup",
    "dd",
    "details",
    "dir",
    "div",
    "dl",
    "dt",
    "embed",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "frame",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hgroup",
    "hr",
    "html",
    "iframe",
    "img",
    "input",
    "keygen",
    "li",
    "link",
    "listing",
    "main",
    "marquee",
    "menu",
    "meta",
    "nav",
    "noembed",
    "noframes",
    "noscript",
    "object",
    "ol",
    "p",
    "param",
    "plaintext",
    "pre",
    "script",
    "search",
    "section",
    "select",
    "source",
    "style",
    "summary",
    "table",
    "tbody",
    "td",
    "template",
    "textarea",
    "tfoot",
    "th",
    "thead",
    "title",
    "tr",
    "track",
    "ul",
    "wbr",
    "xmp",
];

/// Elements whose content a foster-parented insertion is moved out of.
const TABLE_INSERTION_TARGETS: &[&str] = &["table", "tbody", "tfoot", "thead", "tr"];

// =============================================================================
// Stack of open elements
// =============================================================================

impl<B: TreeBuilder, S: ErrorSink> TreeConstructor<B, S> {
    /// "The current node is the bottommost node in this stack of open elements."
    pub(super) fn current_node(&self) -> Option<B::Handle> {
        self.open_elements.last().copied()
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#adjusted-current-node)
    ///
    /// "The adjusted current node is the context element if the parser was
    /// created as part of the HTML fragment parsing algorithm and the stack of
    /// open elements has only one element in it (fragment case); otherwise, the
    /// adjusted current node is the current node."
    pub(super) fn adjusted_current_node(&self) -> Option<B::Handle> {
        match self.context_element {
            Some(context) if self.open_elements.len() == 1 => Some(context),
            _ => self.current_node(),
        }
    }

    /// The local name of an HTML element; `None` for foreign elements.
    pub(super) fn html_name(&self, node: B::Handle) -> Option<&str> {
        match self.builder.element_name(node) {
            Some((name, Namespace::Html)) => Some(name),
            _ => None,
        }
    }

    pub(super) fn is_html_element(&self, node: B::Handle, name: &str) -> bool {
        self.html_name(node) == Some(name)
    }

    pub(super) fn is_html_element_in(&self, node: B::Handle, names: &[&str]) -> bool {
        self.html_name(node).is_some_and(|tag| names.contains(&tag))
    }

    pub(super) fn current_node_is(&self, name: &str) -> bool {
        self.current_node()
            .is_some_and(|node| self.is_html_element(node, name))
    }

    pub(super) fn current_node_is_one_of(&self, names: &[&str]) -> bool {
        self.current_node()
            .is_some_and(|node| self.is_html_element_in(node, names))
    }

    /// The current node's local name, for error variables.
    pub(super) fn current_node_name(&self) -> String {
        self.current_node()
            .and_then(|node| self.builder.element_name(node))
            .map_or_else(String::new, |(name, _)| name.to_string())
    }

    /// The `<body>` element, when it is the second entry on the stack.
    pub(super) fn body_element(&self) -> Option<B::Handle> {
        self.open_elements
            .get(1)
            .copied()
            .filter(|&node| self.is_html_element(node, "body"))
    }

    /// "push ... onto the stack of open elements"
    pub(super) fn push_open_element(&mut self, node: B::Handle) {
        if self.is_html_element(node, "p") {
            self.open_p_elements += 1;
        }
        self.open_elements.push(node);
    }

    /// Bookkeeping for a node that just left the stack of open elements.
    fn forget_open_element(&mut self, node: B::Handle) {
        if self.is_html_element(node, "p") {
            self.open_p_elements = self.open_p_elements.saturating_sub(1);
        }
        self.html_integration_points.retain(|&point| point != node);
    }

    /// "pop the current node off the stack of open elements"
    pub(super) fn pop(&mut self) -> Option<B::Handle> {
        let node = self.open_elements.pop();
        if let Some(node) = node {
            self.forget_open_element(node);
        }
        node
    }

    /// "Pop elements from the stack of open elements until an element with
    /// the same tag name as the token has been popped from the stack."
    pub(super) fn pop_until(&mut self, name: &str) {
        while let Some(node) = self.pop() {
            if self.is_html_element(node, name) {
                break;
            }
        }
    }

    /// Pops until an HTML element with one of `names` has been popped.
    pub(super) fn pop_until_one_of(&mut self, names: &[&str]) {
        while let Some(node) = self.pop() {
            if self.is_html_element_in(node, names) {
                break;
            }
        }
    }

    /// Pops until `target` has been popped.
    pub(super) fn pop_until_node(&mut self, target: B::Handle) {
        while let Some(node) = self.pop() {
            if node == target {
                break;
            }
        }
    }

    /// "remove node from the stack of open elements"
    pub(super) fn remove_from_stack(&mut self, target: B::Handle) {
        if let Some(index) = self.open_elements.iter().rposition(|&node| node == target) {
            let removed = self.open_elements.remove(index);
            self.forget_open_element(removed);
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#special)
    pub(super) fn is_special(&self, node: B::Handle) -> bool {
        match self.builder.element_name(node) {
            Some((name, Namespace::Html)) => SPECIAL_HTML_ELEMENTS.contains(&name),
            Some((name, Namespace::MathMl)) => {
                mathml::is_text_integration_point(name) || name == "annotation-xml"
            }
            Some((name, Namespace::Svg)) => svg::is_html_integration_point(name),
            None => false,
        }
    }

    /// Whether `node` ends the search for the given kind of scope.
    fn is_scope_boundary(&self, node: B::Handle, scope: Scope) -> bool {
        let Some((name, namespace)) = self.builder.element_name(node) else {
            return false;
        };
        match scope {
            // "html, table, template"
            Scope::Table => namespace == Namespace::Html && matches!(name, "html" | "table" | "template"),
            // "All element types except the following: optgroup in the HTML
            // namespace, option in the HTML namespace"
            Scope::Select => !(namespace == Namespace::Html && matches!(name, "optgroup" | "option")),
            Scope::Default | Scope::ListItem | Scope::Button => {
                let default = match namespace {
                    Namespace::Html => matches!(
                        name,
                        "applet" | "caption" | "html" | "table" | "td" | "th" | "marquee" | "object" | "template"
                    ),
                    Namespace::MathMl => {
                        mathml::is_text_integration_point(name) || name == "annotation-xml"
                    }
                    Namespace::Svg => svg::is_html_integration_point(name),
                };
                default
                    || (scope == Scope::ListItem
                        && namespace == Namespace::Html
                        && matches!(name, "ol" | "ul"))
                    || (scope == Scope::Button && namespace == Namespace::Html && name == "button")
            }
        }
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// "The stack of open elements is said to have a particular element in a
    /// specific scope consisting of a list of element types list when the
    /// following algorithm terminates in a match state"
    pub(super) fn has_element_in_specific_scope(&self, names: &[&str], scope: Scope) -> bool {
        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        for &node in self.open_elements.iter().rev() {
            // STEP 2: "If node is the target node, terminate in a match state."
            if self.is_html_element_in(node, names) {
                return true;
            }
            // STEP 3: "Otherwise, if node is one of the element types in list,
            //          terminate in a failure state."
            if self.is_scope_boundary(node, scope) {
                return false;
            }
            // STEP 4: "Otherwise, set node to the previous entry in the stack
            //          of open elements and return to step 2."
        }
        false
    }

    /// "has an element in scope"
    pub(super) fn has_element_in_scope(&self, name: &str) -> bool {
        self.has_element_in_specific_scope(&[name], Scope::Default)
    }

    /// "has an element in button scope"
    pub(super) fn has_element_in_button_scope(&self, name: &str) -> bool {
        if name == "p" && self.open_p_elements == 0 {
            return false;
        }
        self.has_element_in_specific_scope(&[name], Scope::Button)
    }

    /// "has an element in table scope"
    pub(super) fn has_element_in_table_scope(&self, name: &str) -> bool {
        self.has_element_in_specific_scope(&[name], Scope::Table)
    }

    /// Whether a particular node (not just a tag name) is in scope.
    pub(super) fn has_node_in_scope(&self, target: B::Handle) -> bool {
        for &node in self.open_elements.iter().rev() {
            if node == target {
                return true;
            }
            if self.is_scope_boundary(node, Scope::Default) {
                return false;
            }
        }
        false
    }

    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "If a step requires the UA to generate implied end tags but lists an
    /// element to exclude from the process, then the UA must perform the above
    /// steps as if that element was not in the above list."
    pub(super) fn generate_implied_end_tags(&mut self, exclude: Option<&str>) {
        while let Some(node) = self.current_node() {
            match self.html_name(node) {
                Some(name) if IMPLIED_END_TAGS.contains(&name) && Some(name) != exclude => {
                    let _ = self.pop();
                }
                _ => break,
            }
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "When the steps above say the user agent is to close a p element, it
    /// means that the user agent must run the following steps:"
    pub(super) fn close_p_element(&mut self) {
        // STEP 1: "Generate implied end tags, except for p elements."
        self.generate_implied_end_tags(Some("p"));
        // STEP 2: "If the current node is not a p element, then this is a parse error."
        if !self.current_node_is("p") {
            self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", "p")]);
        }
        // STEP 3: "Pop elements from the stack of open elements until a p
        //          element has been popped from the stack."
        self.pop_until("p");
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    pub(super) fn close_p_element_if_in_button_scope(&mut self) {
        if self.has_element_in_button_scope("p") {
            self.close_p_element();
        }
    }

    /// Clears the stack back to one of `names` (or `<html>`), reporting the
    /// elements that had to be popped.
    ///
    /// [§ 13.2.6.4.9](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-context)
    /// "When the steps above require the UA to clear the stack back to a table
    /// context, it means that the UA must, while the current node is not a
    /// table, template, or html element, pop elements from the stack of open
    /// elements."
    pub(super) fn clear_stack_back_to(&mut self, names: &[&str]) {
        while let Some(node) = self.current_node() {
            if self.is_html_element_in(node, names) || self.is_html_element(node, "html") {
                break;
            }
            let name = self.current_node_name();
            self.parse_error_with(ParseErrorCode::UnexpectedImpliedEndTagInTable, &[("name", name.as_str())]);
            let _ = self.pop();
        }
    }

    /// "clear the stack back to a table context"
    pub(super) fn clear_stack_back_to_table_context(&mut self) {
        self.clear_stack_back_to(&["table", "template"]);
    }

    /// "clear the stack back to a table body context"
    pub(super) fn clear_stack_back_to_table_body_context(&mut self) {
        self.clear_stack_back_to(&["tbody", "tfoot", "thead", "template"]);
    }

    /// "clear the stack back to a table row context"
    pub(super) fn clear_stack_back_to_table_row_context(&mut self) {
        self.clear_stack_back_to(&["tr", "template"]);
    }

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    ///
    /// "When the steps below require the UA to reset the insertion mode
    /// appropriately, it means the UA must follow these steps:"
    pub(super) fn reset_insertion_mode_appropriately(&mut self) {
        // STEP 1: "Let last be false."
        // STEP 2: "Let node be the last node in the stack of open elements."
        for index in (0..self.open_elements.len()).rev() {
            let mut node = self.open_elements[index];
            // STEP 3: "Loop: If node is the first node in the stack of open
            //          elements, then set last to true, and, if the parser was
            //          created as part of the HTML fragment parsing algorithm
            //          (fragment case), set node to the context element."
            let last = index == 0;
            if last && let Some(context) = self.context_element {
                node = context;
            }
            let Some(name) = self.html_name(node) else {
                if last {
                    self.switch_to(Phase::InBody);
                    return;
                }
                continue;
            };
            let phase = match name {
                // STEP 4: "If node is a select element..."
                "select" => {
                    let in_table = !last
                        && self.open_elements[..index]
                            .iter()
                            .rev()
                            .any(|&ancestor| self.is_html_element(ancestor, "table"));
                    if in_table {
                        Phase::InSelectInTable
                    } else {
                        Phase::InSelect
                    }
                }
                // STEP 5: "If node is a td or th element and last is false"
                "td" | "th" if !last => Phase::InCell,
                "tr" => Phase::InRow,
                "tbody" | "thead" | "tfoot" => Phase::InTableBody,
                "caption" => Phase::InCaption,
                "colgroup" => Phase::InColumnGroup,
                "table" => Phase::InTable,
                "head" if !last => Phase::InHead,
                "body" => Phase::InBody,
                "frameset" => Phase::InFrameset,
                // STEP 15: "If node is an html element, run these substeps:
                //           If the head element pointer is null, switch the
                //           insertion mode to "before head"... Otherwise, the
                //           head element pointer is not null, switch the
                //           insertion mode to "after head"."
                "html" => {
                    if self.head_element.is_none() {
                        Phase::BeforeHead
                    } else {
                        Phase::AfterHead
                    }
                }
                // STEP 16: "If last is true, then switch the insertion mode to
                //           "in body" and return."
                _ if last => Phase::InBody,
                // STEP 17: "Let node now be the node before node in the stack
                //           of open elements."
                _ => continue,
            };
            self.switch_to(phase);
            return;
        }
    }
}

// =============================================================================
// Creating and inserting nodes
// =============================================================================

impl<B: TreeBuilder, S: ErrorSink> TreeConstructor<B, S> {
    /// [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// "The appropriate place for inserting a node, optionally using a
    /// particular override target, is the position in an element returned by
    /// running the following steps:"
    ///
    /// Returns the parent and the child to insert before (`None` appends).
    pub(super) fn appropriate_place(
        &self,
        override_target: Option<B::Handle>,
    ) -> (B::Handle, Option<B::Handle>) {
        // STEP 1: "If there was an override target specified, then let target
        //          be the override target. Otherwise, let target be the
        //          current node."
        let target = override_target
            .or_else(|| self.current_node())
            .unwrap_or_else(|| self.builder.document());

        // STEP 2: "If foster parenting is enabled and target is a table,
        //          tbody, tfoot, thead, or tr element"
        if self.insert_from_table && self.is_html_element_in(target, TABLE_INSERTION_TARGETS) {
            return self.foster_parent_place();
        }
        (target, None)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) fn foster_parent_place(&self) -> (B::Handle, Option<B::Handle>) {
        // "Let last table be the last table element in the stack of open
        // elements, if any."
        let last_table = self
            .open_elements
            .iter()
            .rposition(|&node| self.is_html_element(node, "table"));
        match last_table {
            Some(index) => {
                let table = self.open_elements[index];
                // "If last table has a parent node, then let adjusted
                // insertion location be inside last table's parent node,
                // immediately before last table"
                if let Some(parent) = self.builder.parent(table) {
                    return (parent, Some(table));
                }
                // "Let previous element be the element immediately above last
                // table in the stack of open elements"
                let previous = index
                    .checked_sub(1)
                    .map_or_else(|| self.builder.document(), |i| self.open_elements[i]);
                (previous, None)
            }
            // "If there is no last table... let adjusted insertion location be
            // inside the first element in the stack of open elements (the html
            // element), after its last child (if any)"
            None => (
                self.open_elements
                    .first()
                    .copied()
                    .unwrap_or_else(|| self.builder.document()),
                None,
            ),
        }
    }

    /// Inserts `node` at a place computed by [`Self::appropriate_place`].
    pub(super) fn insert_at(&mut self, (parent, before): (B::Handle, Option<B::Handle>), node: B::Handle) {
        match before {
            Some(reference) => self.builder.insert_before(parent, node, reference),
            None => self.builder.append_child(parent, node),
        }
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "When the steps below require the user agent to insert an HTML element
    /// for a token, the user agent must insert a foreign element for the token,
    /// in the HTML namespace."
    pub(super) fn insert_html_element(&mut self, name: &str, attributes: &[Attribute]) -> B::Handle {
        self.insert_foreign_element(name, Namespace::Html, attributes)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    pub(super) fn insert_foreign_element(
        &mut self,
        name: &str,
        namespace: Namespace,
        attributes: &[Attribute],
    ) -> B::Handle {
        // STEP 1: "Let the adjusted insertion location be the appropriate
        //          place for inserting a node."
        let place = self.appropriate_place(None);
        // STEP 2: "Let element be the result of creating an element for the
        //          token in the given namespace"
        let element = self.builder.create_element(name, namespace, attributes);
        if namespace == Namespace::MathMl
            && name == "annotation-xml"
            && mathml::annotation_xml_is_integration_point(attributes)
        {
            self.html_integration_points.push(element);
        }
        // STEP 3: "insert element at the adjusted insertion location"
        self.insert_at(place, element);
        // STEP 4: "Push element onto the stack of open elements so that it is
        //          the new current node."
        self.push_open_element(element);
        element
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    pub(super) fn insert_characters(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        let (parent, before) = self.appropriate_place(None);
        // "If the adjusted insertion location is in a Document node, then
        // return."
        if parent == self.builder.document() {
            return;
        }
        self.builder.insert_text(parent, before, data);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    ///
    /// With `parent` set the comment is appended there; otherwise it goes to
    /// the appropriate place for inserting a node.
    pub(super) fn insert_comment(&mut self, data: &str, parent: Option<B::Handle>) {
        let place = match parent {
            Some(parent) => (parent, None),
            None => self.appropriate_place(None),
        };
        let comment = self.builder.create_comment(data);
        self.insert_at(place, comment);
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    ///
    /// "The generic raw text element parsing algorithm and the generic RCDATA
    /// element parsing algorithm consist of the following steps."
    pub(super) fn parse_text_element(&mut self, name: &str, attributes: &[Attribute], state: TokenizerState) {
        // STEP 1: "Insert an HTML element for the token."
        let _ = self.insert_html_element(name, attributes);
        // STEP 2: "If the algorithm that was invoked is the generic raw text
        //          element parsing algorithm, switch the tokenizer to the
        //          RAWTEXT state; otherwise the algorithm invoked was the
        //          generic RCDATA element parsing algorithm, switch the
        //          tokenizer to the RCDATA state."
        self.tokenizer.set_state(state);
        // STEP 3: "Let the original insertion mode be the current insertion mode."
        self.original_phase = self.current_mode();
        // STEP 4: "Then, switch the insertion mode to "text"."
        self.switch_to(Phase::Text);
    }
}

// =============================================================================
// List of active formatting elements
// =============================================================================

impl<B: TreeBuilder, S: ErrorSink> TreeConstructor<B, S> {
    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// "When the steps below require the UA to push onto the list of active
    /// formatting elements an element element, the UA must perform the
    /// following steps:"
    pub(super) fn push_active_formatting_element(&mut self, handle: B::Handle, token: Token) {
        // STEP 1: "If there are already three elements in the list of active
        //          formatting elements after the last marker, if any, or
        //          anywhere in the list if there are no markers, that have the
        //          same tag name, namespace, and attributes as element, then
        //          remove the earliest such element from the list of active
        //          formatting elements."
        let mut matching = Vec::new();
        for (index, entry) in self.active_formatting_elements.iter().enumerate().rev() {
            match entry {
                FormattingEntry::Marker => break,
                FormattingEntry::Element { token: existing, .. } => {
                    if Self::same_formatting_token(existing, &token) {
                        matching.push(index);
                    }
                }
            }
        }
        if matching.len() >= 3
            && let Some(&earliest) = matching.last()
        {
            let _ = self.active_formatting_elements.remove(earliest);
        }

        // STEP 2: "Add element to the list of active formatting elements."
        self.active_formatting_elements
            .push(FormattingEntry::Element { handle, token });
    }

    /// "For these purposes, the attributes must be compared as they were when
    /// the elements were created by the parser; two elements have the same
    /// attributes if all their parsed attributes can be paired such that the
    /// two attributes in each pair have identical names, namespaces, and
    /// values (the order of the attributes does not matter)."
    fn same_formatting_token(a: &Token, b: &Token) -> bool {
        match (a, b) {
            (
                Token::StartTag {
                    name: a_name,
                    attributes: a_attrs,
                    ..
                },
                Token::StartTag {
                    name: b_name,
                    attributes: b_attrs,
                    ..
                },
            ) => {
                a_name == b_name
                    && a_attrs.len() == b_attrs.len()
                    && a_attrs.iter().all(|attr| b_attrs.contains(attr))
            }
            _ => false,
        }
    }

    /// "insert a marker at the end of the list of active formatting elements"
    pub(super) fn insert_marker(&mut self) {
        self.active_formatting_elements.push(FormattingEntry::Marker);
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    ///
    /// "When the steps below require the UA to clear the list of active
    /// formatting elements up to the last marker, the UA must perform the
    /// following steps:"
    pub(super) fn clear_active_formatting_elements_to_last_marker(&mut self) {
        // STEP 1: "Let entry be the last (most recently added) entry in the
        //          list of active formatting elements."
        // STEP 2: "Remove entry from the list of active formatting elements."
        // STEP 3: "If entry was a marker, then stop the algorithm at this point."
        // STEP 4: "Go to step 1."
        while let Some(entry) = self.active_formatting_elements.pop() {
            if matches!(entry, FormattingEntry::Marker) {
                break;
            }
        }
    }

    pub(super) fn formatting_index_of(&self, handle: B::Handle) -> Option<usize> {
        self.active_formatting_elements
            .iter()
            .rposition(|entry| entry.handle() == Some(handle))
    }

    pub(super) fn remove_active_formatting_element(&mut self, handle: B::Handle) {
        if let Some(index) = self.formatting_index_of(handle) {
            let _ = self.active_formatting_elements.remove(index);
        }
    }

    /// The last element named `name` in the list after the last marker.
    pub(super) fn formatting_element_after_last_marker(&self, name: &str) -> Option<B::Handle> {
        for entry in self.active_formatting_elements.iter().rev() {
            match entry {
                FormattingEntry::Marker => return None,
                FormattingEntry::Element { handle, .. } => {
                    if self.is_html_element(*handle, name) {
                        return Some(*handle);
                    }
                }
            }
        }
        None
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    ///
    /// "When the steps below require the UA to reconstruct the active
    /// formatting elements, the UA must perform the following steps:"
    pub(super) fn reconstruct_active_formatting_elements(&mut self) {
        // STEP 1: "If there are no entries in the list of active formatting
        //          elements, then there is nothing to reconstruct; stop this
        //          algorithm."
        let Some(last) = self.active_formatting_elements.last() else {
            return;
        };

        // STEP 2: "If the last (most recently added) entry in the list of
        //          active formatting elements is a marker, or if it is an
        //          element that is in the stack of open elements, then there is
        //          nothing to reconstruct; stop this algorithm."
        match last.handle() {
            None => return,
            Some(handle) if self.open_elements.contains(&handle) => return,
            Some(_) => {}
        }

        // STEP 3-6: "Rewind: If there are no entries before entry in the list
        //            of active formatting elements, then jump to the step
        //            labeled create. Let entry be the entry one earlier than
        //            entry in the list of active formatting elements. If entry
        //            is neither a marker nor an element that is also in the
        //            stack of open elements, go to the step labeled rewind."
        let mut index = self.active_formatting_elements.len() - 1;
        while index > 0 {
            let open = match self.active_formatting_elements[index - 1].handle() {
                None => true,
                Some(handle) => self.open_elements.contains(&handle),
            };
            if open {
                break;
            }
            index -= 1;
        }

        // STEP 7-10: "Create: Insert an HTML element for the token for which
        //             the element entry was created, to obtain new element.
        //             Replace the entry for entry in the list with an entry for
        //             new element. If the entry for new element in the list of
        //             active formatting elements is not the last entry in the
        //             list, return to the step labeled advance."
        for position in index..self.active_formatting_elements.len() {
            let Some(handle) = self.active_formatting_elements[position].handle() else {
                continue;
            };
            let place = self.appropriate_place(None);
            let clone = self.builder.clone_element(handle);
            self.insert_at(place, clone);
            self.push_open_element(clone);
            if let FormattingEntry::Element { handle, .. } = &mut self.active_formatting_elements[position] {
                *handle = clone;
            }
        }
    }

    /// [§ 13.2.6.4.7 Adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// Returns `false` when the caller must "act as described in the "any
    /// other end tag" entry" instead.
    pub(super) fn run_adoption_agency(&mut self, subject: &str) -> bool {
        // STEP 2: "If the current node is an HTML element whose tag name is
        //          subject, and the current node is not in the list of active
        //          formatting elements, then pop the current node off the stack
        //          of open elements and return."
        if let Some(current) = self.current_node()
            && self.is_html_element(current, subject)
            && self.formatting_index_of(current).is_none()
        {
            let _ = self.pop();
            return true;
        }

        // STEP 3-4: "Let outer loop counter be 0. Outer loop: If outer loop
        //            counter is greater than or equal to 8, then return."
        for _ in 0..8 {
            // STEP 4.3: "Let formatting element be the last element in the list
            //            of active formatting elements that: is between the end
            //            of the list and the last marker in the list, if any,
            //            or the start of the list otherwise, and has the tag
            //            name subject. If there is no such element, then return
            //            and instead act as described in the "any other end
            //            tag" entry above."
            let Some(formatting_element) = self.formatting_element_after_last_marker(subject) else {
                return false;
            };

            // STEP 4.4: "If formatting element is not in the stack of open
            //            elements, then this is a parse error; remove the
            //            element from the list, and return."
            let Some(formatting_index) = self
                .open_elements
                .iter()
                .position(|&node| node == formatting_element)
            else {
                self.parse_error_with(ParseErrorCode::AdoptionAgencyNotOpen, &[("name", subject)]);
                self.remove_active_formatting_element(formatting_element);
                return true;
            };

            // STEP 4.5: "If formatting element is in the stack of open
            //            elements, but the element is not in scope, then this
            //            is a parse error; return."
            if !self.has_node_in_scope(formatting_element) {
                self.parse_error_with(ParseErrorCode::AdoptionAgencyNotInScope, &[("name", subject)]);
                return true;
            }

            // STEP 4.6: "If formatting element is not the current node, this
            //            is a parse error. (But do not return.)"
            if self.current_node() != Some(formatting_element) {
                self.parse_error_with(ParseErrorCode::AdoptionAgencyNotCurrent, &[("name", subject)]);
            }

            // STEP 4.7: "Let furthest block be the topmost node in the stack of
            //            open elements that is lower in the stack than
            //            formatting element, and is an element in the special
            //            category. There might not be one."
            let furthest_block_index = (formatting_index + 1..self.open_elements.len())
                .find(|&index| self.is_special(self.open_elements[index]));

            // STEP 4.8: "If there is no furthest block, then the UA must first
            //            pop all the nodes from the bottom of the stack of open
            //            elements, from the current node up to and including
            //            formatting element, then remove formatting element
            //            from the list of active formatting elements, and
            //            finally return."
            let Some(furthest_block_index) = furthest_block_index else {
                self.pop_until_node(formatting_element);
                self.remove_active_formatting_element(formatting_element);
                return true;
            };
            let furthest_block = self.open_elements[furthest_block_index];

            // STEP 4.9: "Let common ancestor be the element immediately above
            //            formatting element in the stack of open elements."
            let Some(common_ancestor) = formatting_index
                .checked_sub(1)
                .map(|index| self.open_elements[index])
            else {
                return true;
            };

            // STEP 4.10: "Let a bookmark note the position of formatting
            //             element in the list of active formatting elements
            //             relative to the elements on either side of it in the
            //             list."
            let mut bookmark = self.formatting_index_of(formatting_element).unwrap_or(0);

            // STEP 4.11: "Let node and last node be furthest block."
            let mut node_index = furthest_block_index;
            let mut last_node = furthest_block;

            // STEP 4.13: "Inner loop"
            let mut inner_loop_counter = 0;
            loop {
                // STEP 4.13.1: "Increment inner loop counter by 1."
                inner_loop_counter += 1;

                // STEP 4.13.2: "Let node be the element immediately above node
                //               in the stack of open elements, or if node is no
                //               longer in the stack of open elements (e.g.
                //               because it got removed by this algorithm), the
                //               element that was immediately above node in the
                //               stack of open elements before node was removed."
                node_index -= 1;
                let node = self.open_elements[node_index];

                // STEP 4.13.3: "If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 4.13.4: "If inner loop counter is greater than 3 and
                //               node is in the list of active formatting
                //               elements, then remove node from the list of
                //               active formatting elements."
                let mut formatting_position = self.formatting_index_of(node);
                if inner_loop_counter > 3
                    && let Some(position) = formatting_position
                {
                    let _ = self.active_formatting_elements.remove(position);
                    if position < bookmark {
                        bookmark -= 1;
                    }
                    formatting_position = None;
                }

                // STEP 4.13.5: "If node is not in the list of active formatting
                //               elements, then remove node from the stack of
                //               open elements and continue."
                let Some(position) = formatting_position else {
                    let removed = self.open_elements.remove(node_index);
                    self.forget_open_element(removed);
                    continue;
                };

                // STEP 4.13.6: "Create an element for the token for which the
                //               element node was created... Replace the entry
                //               for node in the list of active formatting
                //               elements with an entry for the new element,
                //               replace the entry for node in the stack of open
                //               elements with an entry for the new element, and
                //               let node be the new element."
                let new_element = self.builder.clone_element(node);
                if let FormattingEntry::Element { handle, .. } = &mut self.active_formatting_elements[position] {
                    *handle = new_element;
                }
                self.open_elements[node_index] = new_element;

                // STEP 4.13.7: "If last node is furthest block, then move the
                //               aforementioned bookmark to be immediately after
                //               the new node in the list of active formatting
                //               elements."
                if last_node == furthest_block {
                    bookmark = position + 1;
                }

                // STEP 4.13.8: "Append last node to node."
                self.builder.append_child(new_element, last_node);

                // STEP 4.13.9: "Set last node to node."
                last_node = new_element;
            }

            // STEP 4.14: "Insert whatever last node ended up being in the
            //             previous step at the appropriate place for inserting
            //             a node, but using common ancestor as the override
            //             target."
            let place = if self.is_html_element_in(common_ancestor, TABLE_INSERTION_TARGETS) {
                self.foster_parent_place()
            } else {
                (common_ancestor, None)
            };
            self.insert_at(place, last_node);

            // STEP 4.15: "Create an element for the token for which formatting
            //             element was created, in the HTML namespace, with
            //             common ancestor as the intended parent."
            let new_element = self.builder.clone_element(formatting_element);

            // STEP 4.16: "Take all of the child nodes of furthest block and
            //             append them to the element created in the last step."
            self.builder.reparent_children(furthest_block, new_element);

            // STEP 4.17: "Append that new element to furthest block."
            self.builder.append_child(furthest_block, new_element);

            // STEP 4.18: "Remove formatting element from the list of active
            //             formatting elements, and insert the new element into
            //             the list of active formatting elements at the
            //             position of the aforementioned bookmark."
            if let Some(old_position) = self.formatting_index_of(formatting_element) {
                let entry = self.active_formatting_elements.remove(old_position);
                if old_position < bookmark {
                    bookmark -= 1;
                }
                let token = match entry {
                    FormattingEntry::Element { token, .. } => token,
                    FormattingEntry::Marker => Token::new_start_tag(),
                };
                let bookmark = bookmark.min(self.active_formatting_elements.len());
                self.active_formatting_elements.insert(
                    bookmark,
                    FormattingEntry::Element {
                        handle: new_element,
                        token,
                    },
                );
            }

            // STEP 4.19: "Remove formatting element from the stack of open
            //             elements, and insert the new element into the stack
            //             of open elements immediately below the position of
            //             furthest block in that stack."
            self.remove_from_stack(formatting_element);
            if let Some(index) = self
                .open_elements
                .iter()
                .position(|&node| node == furthest_block)
            {
                self.open_elements.insert(index + 1, new_element);
            }
        }
        true
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "Any other end tag"
    pub(super) fn any_other_end_tag(&mut self, name: &str) {
        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        for index in (0..self.open_elements.len()).rev() {
            let node = self.open_elements[index];
            // STEP 2: "Loop: If node is an HTML element with the same tag name
            //          as the token, then:"
            if self.is_html_element(node, name) {
                // STEP 2.1: "Generate implied end tags, except for HTML
                //            elements with the same tag name as the token."
                self.generate_implied_end_tags(Some(name));
                // STEP 2.2: "If node is not the current node, then this is a
                //            parse error."
                if self.current_node() != Some(node) {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name)]);
                }
                // STEP 2.3: "Pop all the nodes from the current node up to
                //            node, including node, then stop these steps."
                self.pop_until_node(node);
                return;
            }
            // STEP 3: "Otherwise, if node is in the special category, then this
            //          is a parse error; ignore the token, and return."
            if self.is_special(node) {
                self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name)]);
                return;
            }
            // STEP 4: "Set node to the previous entry in the stack of open
            //          elements."
        }
    }
}
