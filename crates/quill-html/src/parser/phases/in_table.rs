//! The table insertion modes: "in table", "in caption", "in column group",
//! "in table body", "in row" and "in cell".
//!
//! Misnested content in a table is foster-parented: the first such token
//! taints the table and is reported, later ones are moved silently.

use crate::error::{ErrorSink, ParseErrorCode};
use crate::parser::algorithms::Scope;
use crate::parser::core::{Phase, Step, TreeConstructor};
use crate::tokenizer::Token;
use crate::tree_builder::TreeBuilder;

const TABLE_SECTIONS: &[&str] = &["tbody", "tfoot", "thead"];

const CELLS: &[&str] = &["td", "th"];

impl<B: TreeBuilder, S: ErrorSink> TreeConstructor<B, S> {
    /// The last `<table>` on the stack of open elements.
    fn current_table(&self) -> Option<B::Handle> {
        self.open_elements
            .iter()
            .rev()
            .copied()
            .find(|&node| self.is_html_element(node, "table"))
    }

    fn current_table_is_tainted(&self) -> bool {
        self.current_table()
            .is_some_and(|table| self.builder.is_tainted(table))
    }

    /// Sets the tainted flag on the current table, reporting `code` the first
    /// time only. Without a table element on the stack (a fragment parsed in
    /// a table context) there is nothing to mark, so every token reports.
    fn taint_current_table(&mut self, code: ParseErrorCode, name: &str) {
        match self.current_table() {
            Some(table) if self.builder.is_tainted(table) => {}
            Some(table) => {
                self.parse_error_with(code, &[("name", name)]);
                self.builder.mark_tainted(table);
            }
            None => self.parse_error_with(code, &[("name", name)]),
        }
    }

    /// "Process the token using the rules for the "in body" insertion mode,
    /// except that whenever a node would be inserted into the current node
    /// when the current node is a table, tbody, tfoot, thead, or tr element,
    /// then it must instead be foster parented."
    fn process_from_table(&mut self, token: &mut Token) -> Step {
        self.insert_from_table = true;
        let step = self.handle_in_body(token);
        self.insert_from_table = false;
        step
    }

    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    pub(in crate::parser) fn handle_in_table(&mut self, token: &mut Token) -> Step {
        match &*token {
            // Whitespace goes into the table until the table has been
            // tainted.
            Token::SpaceCharacters { data } if !self.current_table_is_tainted() => {
                self.insert_characters(data);
                Step::Done
            }

            Token::Character { data } | Token::SpaceCharacters { data } => {
                self.taint_current_table(ParseErrorCode::UnexpectedCharImpliesTableVoodoo, "#text");
                self.insert_from_table = true;
                self.insert_body_text(data);
                self.insert_from_table = false;
                Step::Done
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => {
                self.insert_comment(data, None);
                Step::Done
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => {
                self.parse_error(ParseErrorCode::UnexpectedDoctype);
                Step::Done
            }

            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                "html" => self.handle_in_body(token),

                // "A start tag whose tag name is "caption""
                // "Clear the stack back to a table context. Insert a marker at
                // the end of the list of active formatting elements. Insert an
                // HTML element for the token, then switch the insertion mode to
                // "in caption"."
                "caption" => {
                    self.clear_stack_back_to_table_context();
                    self.insert_marker();
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(Phase::InCaption);
                    Step::Done
                }

                // "A start tag whose tag name is "colgroup""
                "colgroup" => {
                    self.clear_stack_back_to_table_context();
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(Phase::InColumnGroup);
                    Step::Done
                }

                // "A start tag whose tag name is "col""
                // "Clear the stack back to a table context. Insert an HTML
                // element for a "colgroup" start tag token with no attributes,
                // then switch the insertion mode to "in column group".
                // Reprocess the current token."
                "col" => {
                    self.clear_stack_back_to_table_context();
                    let _ = self.insert_html_element("colgroup", &[]);
                    self.switch_to(Phase::InColumnGroup);
                    Step::Reprocess
                }

                // "A start tag whose tag name is one of: "tbody", "tfoot",
                // "thead""
                "tbody" | "tfoot" | "thead" => {
                    self.clear_stack_back_to_table_context();
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(Phase::InTableBody);
                    Step::Done
                }

                // "A start tag whose tag name is one of: "td", "th", "tr""
                // "Clear the stack back to a table context. Insert an HTML
                // element for a "tbody" start tag token with no attributes,
                // then switch the insertion mode to "in table body". Reprocess
                // the current token."
                "td" | "th" | "tr" => {
                    self.clear_stack_back_to_table_context();
                    let _ = self.insert_html_element("tbody", &[]);
                    self.switch_to(Phase::InTableBody);
                    Step::Reprocess
                }

                // "A start tag whose tag name is "table""
                "table" => {
                    // "Parse error."
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        &[("name", "table")],
                    );
                    // "If the stack of open elements does not have a table
                    // element in table scope, ignore the token."
                    if !self.has_element_in_table_scope("table") {
                        return Step::Done;
                    }
                    // "Otherwise: Pop elements from this stack until a table
                    // element has been popped from the stack. Reset the
                    // insertion mode appropriately. Reprocess the token."
                    self.pop_until("table");
                    self.reset_insertion_mode_appropriately();
                    Step::Reprocess
                }

                // "A start tag whose tag name is one of: "style", "script",
                // "template""
                // "Process the token using the rules for the "in head"
                // insertion mode."
                "style" | "script" if !self.current_table_is_tainted() => self.handle_in_head(token),

                // "A start tag whose tag name is "input""
                // "If the token does not have an attribute with the name
                // "type", or if it does, but that attribute's value is not an
                // ASCII case-insensitive match for the string "hidden", then:
                // act as described in the "anything else" entry below."
                "input"
                    if !self.current_table_is_tainted()
                        && token
                            .attribute("type")
                            .is_some_and(|value| value.eq_ignore_ascii_case("hidden")) =>
                {
                    // "Parse error. Insert an HTML element for the token. Pop
                    // that input element off the stack of open elements.
                    // Acknowledge the token's self-closing flag, if it is set."
                    self.parse_error(ParseErrorCode::UnexpectedHiddenInputInTable);
                    let _ = self.insert_html_element(name, attributes);
                    let _ = self.pop();
                    self.acknowledge_self_closing();
                    Step::Done
                }

                // "A start tag whose tag name is "form""
                "form" => {
                    // "Parse error."
                    self.parse_error(ParseErrorCode::UnexpectedFormInTable);
                    // "If... the form element pointer is not null, ignore the
                    // token."
                    if self.form_element.is_some() {
                        return Step::Done;
                    }
                    // "Otherwise: Insert an HTML element for the token, and set
                    // the form element pointer to point to the element created.
                    // Pop that form element off the stack of open elements."
                    let form = self.insert_html_element(name, attributes);
                    self.form_element = Some(form);
                    let _ = self.pop();
                    Step::Done
                }

                // "Anything else"
                // "Parse error. Enable foster parenting, process the token
                // using the rules for the "in body" insertion mode, and then
                // disable foster parenting."
                _ => {
                    let name = name.clone();
                    self.taint_current_table(ParseErrorCode::UnexpectedStartTagImpliesTableVoodoo, &name);
                    self.process_from_table(token)
                }
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "table""
                "table" => {
                    // "If the stack of open elements does not have a table
                    // element in table scope, this is a parse error; ignore the
                    // token."
                    if !self.has_element_in_table_scope("table") {
                        self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", "table")]);
                        return Step::Done;
                    }
                    self.generate_implied_end_tags(None);
                    if !self.current_node_is("table") {
                        let current = self.current_node_name();
                        self.parse_error_with(
                            ParseErrorCode::EndTagTooEarlyNamed,
                            &[("name", "table"), ("expected", current.as_str())],
                        );
                    }
                    // "Pop elements from this stack until a table element has
                    // been popped from the stack."
                    self.pop_until("table");
                    // "Reset the insertion mode appropriately."
                    self.reset_insertion_mode_appropriately();
                    Step::Done
                }

                // "An end tag whose tag name is one of: "body", "caption",
                // "col", "colgroup", "html", "tbody", "td", "tfoot", "th",
                // "thead", "tr""
                // "Parse error. Ignore the token."
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                | "th" | "thead" | "tr" => {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name.as_str())]);
                    Step::Done
                }

                _ => {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedEndTagImpliesTableVoodoo,
                        &[("name", name.as_str())],
                    );
                    self.process_from_table(token)
                }
            },

            // "An end-of-file token"
            Token::EndOfFile => {
                if !self.current_node_is("html") {
                    self.parse_error(ParseErrorCode::EofInTable);
                }
                self.stop_parsing();
                Step::Done
            }
        }
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(in crate::parser) fn handle_in_caption(&mut self, token: &mut Token) -> Step {
        match &*token {
            // "An end tag whose tag name is "caption""
            Token::EndTag { name } if name == "caption" => {
                let _ = self.close_caption();
                Step::Done
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "An end tag whose tag name is "table""
            // "If the stack of open elements does not have a caption element
            // in table scope, this is a parse error; ignore the token.
            // (fragment case)"
            // "Otherwise: ... Reprocess the token."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                if self.close_caption() {
                    Step::Reprocess
                } else {
                    Step::Done
                }
            }
            Token::EndTag { name } if name == "table" => {
                if self.close_caption() {
                    Step::Reprocess
                } else {
                    Step::Done
                }
            }

            // "An end tag whose tag name is one of: "body", "col",
            // "colgroup", "html", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name.as_str())]);
                Step::Done
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            _ => self.handle_in_body(token),
        }
    }

    /// The steps of `</caption>`. Returns `false` when there was no caption to
    /// close.
    fn close_caption(&mut self) -> bool {
        // "If the stack of open elements does not have a caption element in
        // table scope, this is a parse error; ignore the token. (fragment
        // case)"
        if !self.has_element_in_table_scope("caption") {
            self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", "caption")]);
            return false;
        }
        // STEP 1: "Generate implied end tags."
        self.generate_implied_end_tags(None);
        // STEP 2: "Now, if the current node is not a caption element, then
        //          this is a parse error."
        if !self.current_node_is("caption") {
            self.parse_error_with(ParseErrorCode::EndTagTooEarly, &[("name", "caption")]);
        }
        // STEP 3: "Pop elements from this stack until a caption element has
        //          been popped from the stack."
        self.pop_until("caption");
        // STEP 4: "Clear the list of active formatting elements up to the last
        //          marker."
        self.clear_active_formatting_elements_to_last_marker();
        // STEP 5: "Switch the insertion mode to "in table"."
        self.switch_to(Phase::InTable);
        true
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    pub(in crate::parser) fn handle_in_column_group(&mut self, token: &mut Token) -> Step {
        match &*token {
            Token::SpaceCharacters { data } => {
                self.insert_characters(data);
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
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body(token),

            // "A start tag whose tag name is "col""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements. Acknowledge the
            // token's self-closing flag, if it is set."
            Token::StartTag {
                name, attributes, ..
            } if name == "col" => {
                let _ = self.insert_html_element(name, attributes);
                let _ = self.pop();
                self.acknowledge_self_closing();
                Step::Done
            }

            // "An end tag whose tag name is "colgroup""
            Token::EndTag { name } if name == "colgroup" => {
                // "If the current node is not a colgroup element, then this is
                // a parse error; ignore the token."
                if !self.current_node_is("colgroup") {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", "colgroup")]);
                    return Step::Done;
                }
                // "Otherwise, pop the current node from the stack of open
                // elements. Switch the insertion mode to "in table"."
                let _ = self.pop();
                self.switch_to(Phase::InTable);
                Step::Done
            }

            // "An end tag whose tag name is "col""
            // "Parse error. Ignore the token."
            Token::EndTag { name } if name == "col" => {
                self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", "col")]);
                Step::Done
            }

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::EndOfFile => self.handle_in_body(token),

            // "Anything else"
            _ => {
                // "If the current node is not a colgroup element, then this is
                // a parse error; ignore the token."
                if !self.current_node_is("colgroup") {
                    self.parse_error(ParseErrorCode::UnexpectedStartTagIgnored);
                    return Step::Done;
                }
                // "Otherwise, pop the current node from the stack of open
                // elements. Switch the insertion mode to "in table". Reprocess
                // the token."
                let _ = self.pop();
                self.switch_to(Phase::InTable);
                Step::Reprocess
            }
        }
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    pub(in crate::parser) fn handle_in_table_body(&mut self, token: &mut Token) -> Step {
        match &*token {
            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                // "A start tag whose tag name is "tr""
                // "Clear the stack back to a table body context. Insert an HTML
                // element for the token, then switch the insertion mode to "in
                // row"."
                "tr" => {
                    self.clear_stack_back_to_table_body_context();
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(Phase::InRow);
                    Step::Done
                }

                // "A start tag whose tag name is one of: "th", "td""
                // "Parse error. Clear the stack back to a table body context.
                // Insert an HTML element for a "tr" start tag token with no
                // attributes, then switch the insertion mode to "in row".
                // Reprocess the current token."
                "th" | "td" => {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedCellInTableBody,
                        &[("name", name.as_str())],
                    );
                    self.clear_stack_back_to_table_body_context();
                    let _ = self.insert_html_element("tr", &[]);
                    self.switch_to(Phase::InRow);
                    Step::Reprocess
                }

                // "A start tag whose tag name is one of: "caption", "col",
                // "colgroup", "tbody", "tfoot", "thead""
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" => {
                    self.leave_table_body()
                }

                _ => self.handle_in_table(token),
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is one of: "tbody", "tfoot",
                // "thead""
                "tbody" | "tfoot" | "thead" => {
                    // "If the stack of open elements does not have an element
                    // in table scope that is an HTML element with the same tag
                    // name as the token, this is a parse error; ignore the
                    // token."
                    if !self.has_element_in_table_scope(name) {
                        self.parse_error_with(
                            ParseErrorCode::UnexpectedEndTagInTableBody,
                            &[("name", name.as_str())],
                        );
                        return Step::Done;
                    }
                    // "Otherwise: Clear the stack back to a table body context.
                    // Pop the current node from the stack of open elements.
                    // Switch the insertion mode to "in table"."
                    self.clear_stack_back_to_table_body_context();
                    let _ = self.pop();
                    self.switch_to(Phase::InTable);
                    Step::Done
                }

                // "An end tag whose tag name is "table""
                "table" => self.leave_table_body(),

                // "An end tag whose tag name is one of: "body", "caption",
                // "col", "colgroup", "html", "td", "th", "tr""
                // "Parse error. Ignore the token."
                "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr" => {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedEndTagInTableBody,
                        &[("name", name.as_str())],
                    );
                    Step::Done
                }

                _ => self.handle_in_table(token),
            },

            // "Anything else"
            // "Process the token using the rules for the "in table" insertion
            // mode."
            _ => self.handle_in_table(token),
        }
    }

    /// "If the stack of open elements does not have a tbody, thead, or tfoot
    /// element in table scope, this is a parse error; ignore the token."
    /// "Otherwise: Clear the stack back to a table body context. Pop the
    /// current node from the stack of open elements. Switch the insertion mode
    /// to "in table". Reprocess the token."
    fn leave_table_body(&mut self) -> Step {
        if !self.has_element_in_specific_scope(TABLE_SECTIONS, Scope::Table) {
            self.parse_error(ParseErrorCode::UnexpectedEndTagInTableBody);
            return Step::Done;
        }
        self.clear_stack_back_to_table_body_context();
        let _ = self.pop();
        self.switch_to(Phase::InTable);
        Step::Reprocess
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    pub(in crate::parser) fn handle_in_row(&mut self, token: &mut Token) -> Step {
        match &*token {
            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                // "A start tag whose tag name is one of: "th", "td""
                // "Clear the stack back to a table row context. Insert an HTML
                // element for the token, then switch the insertion mode to "in
                // cell". Insert a marker at the end of the list of active
                // formatting elements."
                "th" | "td" => {
                    self.clear_stack_back_to_table_row_context();
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(Phase::InCell);
                    self.insert_marker();
                    Step::Done
                }

                // "A start tag whose tag name is one of: "caption", "col",
                // "colgroup", "tbody", "tfoot", "thead", "tr""
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr" => {
                    if self.close_row() {
                        Step::Reprocess
                    } else {
                        Step::Done
                    }
                }

                _ => self.handle_in_table(token),
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "tr""
                "tr" => {
                    let _ = self.close_row();
                    Step::Done
                }

                // "An end tag whose tag name is "table""
                "table" => {
                    if self.close_row() {
                        Step::Reprocess
                    } else {
                        Step::Done
                    }
                }

                // "An end tag whose tag name is one of: "tbody", "tfoot",
                // "thead""
                "tbody" | "tfoot" | "thead" => {
                    // "If the stack of open elements does not have an element
                    // in table scope that is an HTML element with the same tag
                    // name as the token, this is a parse error; ignore the
                    // token."
                    if !self.has_element_in_table_scope(name) {
                        self.parse_error_with(
                            ParseErrorCode::UnexpectedEndTagInTableRow,
                            &[("name", name.as_str())],
                        );
                        return Step::Done;
                    }
                    // "If the stack of open elements does not have a tr element
                    // in table scope, ignore the token."
                    if self.close_row() {
                        Step::Reprocess
                    } else {
                        Step::Done
                    }
                }

                // "An end tag whose tag name is one of: "body", "caption",
                // "col", "colgroup", "html", "td", "th""
                // "Parse error. Ignore the token."
                "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" => {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedEndTagInTableRow,
                        &[("name", name.as_str())],
                    );
                    Step::Done
                }

                _ => self.handle_in_table(token),
            },

            _ => self.handle_in_table(token),
        }
    }

    /// The steps of `</tr>`. Returns `false` when no row was open.
    fn close_row(&mut self) -> bool {
        // "If the stack of open elements does not have a tr element in table
        // scope, this is a parse error; ignore the token."
        if !self.has_element_in_table_scope("tr") {
            self.parse_error_with(ParseErrorCode::UnexpectedEndTagInTableRow, &[("name", "tr")]);
            return false;
        }
        // "Otherwise: Clear the stack back to a table row context. Pop the
        // current node (which will be a tr element) from the stack of open
        // elements. Switch the insertion mode to "in table body"."
        self.clear_stack_back_to_table_row_context();
        let _ = self.pop();
        self.switch_to(Phase::InTableBody);
        true
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    pub(in crate::parser) fn handle_in_cell(&mut self, token: &mut Token) -> Step {
        match &*token {
            // "An end tag whose tag name is one of: "td", "th""
            Token::EndTag { name } if CELLS.contains(&name.as_str()) => {
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name as
                // that of the token, then this is a parse error; ignore the
                // token."
                if !self.has_element_in_table_scope(name) {
                    self.parse_error_with(ParseErrorCode::UnexpectedCellEndTag, &[("name", name.as_str())]);
                    return Step::Done;
                }
                // STEP 1: "Generate implied end tags."
                self.generate_implied_end_tags(None);
                // STEP 2: "Now, if the current node is not an HTML element with
                //          the same tag name as the token, then this is a parse
                //          error."
                if !self.current_node_is(name) {
                    self.parse_error_with(ParseErrorCode::EndTagTooEarly, &[("name", name.as_str())]);
                }
                // STEP 3: "Pop elements from the stack of open elements until an
                //          HTML element with the same tag name as the token has
                //          been popped from the stack."
                self.pop_until(name);
                // STEP 4: "Clear the list of active formatting elements up to
                //          the last marker."
                self.clear_active_formatting_elements_to_last_marker();
                // STEP 5: "Switch the insertion mode to "in row"."
                self.switch_to(Phase::InRow);
                Step::Done
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Assert: The stack of open elements has a td or th element in
            // table scope. Close the cell and reprocess the token."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                if !self.has_element_in_specific_scope(CELLS, Scope::Table) {
                    self.parse_error_with(ParseErrorCode::UnexpectedStartTagIgnored, &[("name", name.as_str())]);
                    return Step::Done;
                }
                self.close_cell();
                Step::Reprocess
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html""
            // "Parse error. Ignore the token."
            Token::EndTag { name }
                if matches!(name.as_str(), "body" | "caption" | "col" | "colgroup" | "html") =>
            {
                self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name.as_str())]);
                Step::Done
            }

            // "An end tag whose tag name is one of: "table", "tbody", "tfoot",
            // "thead", "tr""
            // "If the stack of open elements does not have an element in table
            // scope that is an HTML element with the same tag name as that of
            // the token, then this is a parse error; ignore the token."
            // "Otherwise, close the cell and reprocess the token."
            Token::EndTag { name }
                if matches!(name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                if !self.has_element_in_table_scope(name) {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name.as_str())]);
                    return Step::Done;
                }
                self.close_cell();
                Step::Reprocess
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            _ => self.handle_in_body(token),
        }
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "Where the steps above say to close the cell, they mean to run the
    /// following algorithm:"
    fn close_cell(&mut self) {
        // STEP 1: "Generate implied end tags."
        self.generate_implied_end_tags(None);
        // STEP 2: "If the current node is not now a td element or a th element,
        //          then this is a parse error."
        if !self.current_node_is_one_of(CELLS) {
            self.parse_error(ParseErrorCode::UnexpectedCellEndTag);
        }
        // STEP 3: "Pop elements from the stack of open elements until a td
        //          element or a th element has been popped from the stack."
        self.pop_until_one_of(CELLS);
        // STEP 4: "Clear the list of active formatting elements up to the last
        //          marker."
        self.clear_active_formatting_elements_to_last_marker();
        // STEP 5: "Switch the insertion mode to "in row"."
        self.switch_to(Phase::InRow);
    }
}
