use crate::error::{ErrorSink, ParseErrorCode};
use crate::parser::algorithms::Scope;
use crate::parser::core::{Step, TreeConstructor};
use crate::tokenizer::Token;
use crate::tree_builder::TreeBuilder;

/// Table structure tags that end a select inside a table.
const TABLE_TAGS: &[&str] = &["caption", "table", "tbody", "tfoot", "thead", "tr", "td", "th"];

impl<B: TreeBuilder, S: ErrorSink> TreeConstructor<B, S> {
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(in crate::parser) fn handle_in_select(&mut self, token: &mut Token) -> Step {
        match &*token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            // "Any other character token"
            // "Insert the token's character."
            Token::Character { data } | Token::SpaceCharacters { data } => {
                if data.contains('\0') {
                    self.parse_error(ParseErrorCode::InvalidCodepoint);
                    let data = data.replace('\0', "");
                    self.insert_characters(&data);
                } else {
                    self.insert_characters(data);
                }
                Step::Done
            }

            Token::Comment { data } => {
                self.insert_comment(data, None);
                Step::Done
            }

            Token::Doctype { .. } => {
                self.parse_error(ParseErrorCode::UnexpectedDoctype);
                Step::Done
            }

            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                "html" => self.handle_in_body(token),

                // "A start tag whose tag name is "option""
                // "If the current node is an option element, pop that node
                // from the stack of open elements."
                "option" => {
                    self.pop_if_current("option");
                    let _ = self.insert_html_element(name, attributes);
                    Step::Done
                }

                // "A start tag whose tag name is "optgroup"" / "A start tag
                // whose tag name is "hr""
                // "If the current node is an option element, pop that node from
                // the stack of open elements. If the current node is an
                // optgroup element, pop that node from the stack of open
                // elements."
                "optgroup" | "hr" => {
                    self.pop_if_current("option");
                    self.pop_if_current("optgroup");
                    let _ = self.insert_html_element(name, attributes);
                    if name == "hr" {
                        let _ = self.pop();
                        self.acknowledge_self_closing();
                    }
                    Step::Done
                }

                // "A start tag whose tag name is "select""
                // "Parse error. If the stack of open elements does not have a
                // select element in select scope, ignore the token. (fragment
                // case) Otherwise: Pop elements from the stack of open elements
                // until a select element has been popped from the stack. Reset
                // the insertion mode appropriately."
                "select" => {
                    self.parse_error(ParseErrorCode::UnexpectedSelectInSelect);
                    let _ = self.close_select();
                    Step::Done
                }

                // "A start tag whose tag name is one of: "input", "keygen",
                // "textarea""
                // "Parse error. If the stack of open elements does not have a
                // select element in select scope, ignore the token. (fragment
                // case) Otherwise: ... Reprocess the token."
                "input" | "keygen" | "textarea" => {
                    self.parse_error_with(ParseErrorCode::UnexpectedInputInSelect, &[("name", name.as_str())]);
                    if self.close_select() {
                        Step::Reprocess
                    } else {
                        Step::Done
                    }
                }

                // "A start tag whose tag name is one of: "script", "template""
                // "Process the token using the rules for the "in head"
                // insertion mode."
                "script" => self.handle_in_head(token),

                // "Anything else"
                // "Parse error. Ignore the token."
                _ => {
                    self.parse_error_with(ParseErrorCode::UnexpectedStartTagInSelect, &[("name", name.as_str())]);
                    Step::Done
                }
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "optgroup""
                "optgroup" => {
                    // "First, if the current node is an option element, and the
                    // node immediately before it in the stack of open elements
                    // is an optgroup element, then pop the current node from the
                    // stack of open elements."
                    let len = self.open_elements.len();
                    if len >= 2
                        && self.current_node_is("option")
                        && self.is_html_element(self.open_elements[len - 2], "optgroup")
                    {
                        let _ = self.pop();
                    }
                    // "If the current node is an optgroup element, then pop that
                    // node from the stack of open elements. Otherwise, this is a
                    // parse error; ignore the token."
                    if self.current_node_is("optgroup") {
                        let _ = self.pop();
                    } else {
                        self.parse_error_with(ParseErrorCode::UnexpectedEndTagInSelect, &[("name", "optgroup")]);
                    }
                    Step::Done
                }

                // "An end tag whose tag name is "option""
                // "If the current node is an option element, then pop that node
                // from the stack of open elements. Otherwise, this is a parse
                // error; ignore the token."
                "option" => {
                    if self.current_node_is("option") {
                        let _ = self.pop();
                    } else {
                        self.parse_error_with(ParseErrorCode::UnexpectedEndTagInSelect, &[("name", "option")]);
                    }
                    Step::Done
                }

                // "An end tag whose tag name is "select""
                "select" => {
                    let _ = self.close_select();
                    Step::Done
                }

                _ => {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTagInSelect, &[("name", name.as_str())]);
                    Step::Done
                }
            },

            // "An end-of-file token"
            Token::EndOfFile => {
                if !self.current_node_is("html") {
                    self.parse_error(ParseErrorCode::EofInSelect);
                }
                self.stop_parsing();
                Step::Done
            }
        }
    }

    fn pop_if_current(&mut self, name: &str) {
        if self.current_node_is(name) {
            let _ = self.pop();
        }
    }

    /// "If the stack of open elements does not have a select element in select
    /// scope, this is a parse error; ignore the token. (fragment case)"
    /// "Otherwise: Pop elements from the stack of open elements until a select
    /// element has been popped from the stack. Reset the insertion mode
    /// appropriately."
    ///
    /// Returns `false` when there was no select to close.
    fn close_select(&mut self) -> bool {
        if !self.has_element_in_specific_scope(&["select"], Scope::Select) {
            self.parse_error_with(ParseErrorCode::UnexpectedEndTagInSelect, &[("name", "select")]);
            return false;
        }
        self.pop_until("select");
        self.reset_insertion_mode_appropriately();
        true
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(in crate::parser) fn handle_in_select_in_table(&mut self, token: &mut Token) -> Step {
        match &*token {
            // "A start tag whose tag name is one of: "caption", "table",
            // "tbody", "tfoot", "thead", "tr", "td", "th""
            // "Parse error. Pop elements from the stack of open elements until
            // a select element has been popped from the stack. Reset the
            // insertion mode appropriately. Reprocess the token."
            Token::StartTag { name, .. } if TABLE_TAGS.contains(&name.as_str()) => {
                self.parse_error_with(
                    ParseErrorCode::UnexpectedTableElementStartTagInSelectInTable,
                    &[("name", name.as_str())],
                );
                self.pop_until("select");
                self.reset_insertion_mode_appropriately();
                Step::Reprocess
            }

            // "An end tag whose tag name is one of: "caption", "table",
            // "tbody", "tfoot", "thead", "tr", "td", "th""
            Token::EndTag { name } if TABLE_TAGS.contains(&name.as_str()) => {
                // "Parse error."
                self.parse_error_with(
                    ParseErrorCode::UnexpectedTableElementEndTagInSelectInTable,
                    &[("name", name.as_str())],
                );
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // that of the token, then ignore the token."
                if !self.has_element_in_table_scope(name) {
                    return Step::Done;
                }
                // "Otherwise: Pop elements from the stack of open elements until
                // a select element has been popped from the stack. Reset the
                // insertion mode appropriately. Reprocess the token."
                self.pop_until("select");
                self.reset_insertion_mode_appropriately();
                Step::Reprocess
            }

            // "Anything else"
            // "Process the token using the rules for the "in select" insertion
            // mode."
            _ => self.handle_in_select(token),
        }
    }
}
