use quill_dom::{Namespace, QuirksMode};

use crate::error::{ErrorSink, ParseErrorCode};
use crate::parser::algorithms::{FORMATTING_ELEMENTS, Scope};
use crate::parser::core::{Phase, Step, TreeConstructor};
use crate::parser::foreign_content::{
    adjust_foreign_attributes, adjust_mathml_attributes, adjust_svg_attributes,
};
use crate::tokenizer::{Attribute, Token, TokenizerState};
use crate::tree_builder::TreeBuilder;

/// "A start tag whose tag name is one of: "address", "article", "aside",
/// "blockquote", "center", "details", "dialog", "dir", "div", "dl",
/// "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "main",
/// "menu", "nav", "ol", "p", "search", "section", "summary", "ul""
const BLOCK_START_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "search",
    "section",
    "summary",
    "ul",
];

/// "An end tag whose tag name is one of: "address", "article", "aside",
/// "blockquote", "button", "center", "details", "dialog", "dir", "div", "dl",
/// "fieldset", "figcaption", "figure", "footer", "header", "hgroup",
/// "listing", "main", "menu", "nav", "ol", "pre", "search", "section",
/// "summary", "ul""
const BLOCK_END_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "button",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "listing",
    "main",
    "menu",
    "nav",
    "ol",
    "pre",
    "search",
    "section",
    "summary",
    "ul",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements that may still be open at `</body>` or end of input without a
/// parse error.
const MAY_REMAIN_OPEN: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc", "tbody", "td", "tfoot",
    "th", "thead", "tr", "body", "html",
];

/// "A start tag whose tag name is one of: "caption", "col", "colgroup",
/// "frame", "head", "tbody", "td", "tfoot", "th", "thead", "tr""
const IGNORED_START_TAGS: &[&str] = &[
    "caption", "col", "colgroup", "frame", "head", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// [§ 13.2.6.4.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
///
/// Start tags that in body are processed using the rules for "in head".
const HEAD_START_TAGS: &[&str] = &[
    "base", "basefont", "bgsound", "link", "meta", "noframes", "script", "style", "title",
];

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0C')
}

impl<B: TreeBuilder, S: ErrorSink> TreeConstructor<B, S> {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(in crate::parser) fn handle_in_body(&mut self, token: &mut Token) -> Step {
        // "A start tag whose tag name is "image""
        // "Parse error. Change the token's tag name to "img" and reprocess it.
        // (Don't ask.)"
        if let Token::StartTag { name, .. } = token
            && name == "image"
        {
            self.parse_error_with(
                ParseErrorCode::UnexpectedStartTagTreatedAs,
                &[("name", "image"), ("treated_as", "img")],
            );
            *name = "img".to_string();
        }

        match &*token {
            Token::Character { data } | Token::SpaceCharacters { data } => {
                self.insert_body_text(data);
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

            // "An end-of-file token"
            Token::EndOfFile => {
                // "If there is a node in the stack of open elements that is not
                // either a dd element, a dt element, an li element, ... then
                // this is a parse error."
                if self.has_unclosed_elements() {
                    self.parse_error(ParseErrorCode::ExpectedClosingTagButGotEof);
                }
                // "Stop parsing."
                self.stop_parsing();
                Step::Done
            }

            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => self.in_body_start_tag(name, attributes, *self_closing, token),

            Token::EndTag { name } => self.in_body_end_tag(name),
        }
    }

    /// "A character token that is U+0000 NULL"
    /// "Parse error. Ignore the token."
    ///
    /// "Any other character token"
    /// "Reconstruct the active formatting elements, if any. Insert the token's
    /// character. Set the frameset-ok flag to "not ok"." (only for characters
    /// that are not whitespace)
    pub(in crate::parser) fn insert_body_text(&mut self, data: &str) {
        let stripped;
        let data = if data.contains('\0') {
            self.parse_error(ParseErrorCode::InvalidCodepoint);
            stripped = data.replace('\0', "");
            stripped.as_str()
        } else {
            data
        };
        if data.is_empty() {
            return;
        }
        self.reconstruct_active_formatting_elements();
        self.insert_characters(data);
        if !data.chars().all(is_space) {
            self.frameset_ok = false;
        }
    }

    /// Whether anything other than the elements allowed to stay open at the
    /// end of the body is on the stack.
    fn has_unclosed_elements(&self) -> bool {
        self.open_elements
            .iter()
            .any(|&node| !self.is_html_element_in(node, MAY_REMAIN_OPEN))
    }

    fn in_body_start_tag(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        self_closing: bool,
        token: &Token,
    ) -> Step {
        match name {
            // "A start tag whose tag name is "html""
            // "Parse error." ... "Otherwise, for each attribute on the token,
            // check to see if the attribute is already present on the top
            // element of the stack of open elements. If it is not, add the
            // attribute and its corresponding value to that element."
            "html" => {
                self.parse_error_with(ParseErrorCode::UnexpectedStartTag, &[("name", name)]);
                if let Some(&root) = self.open_elements.first() {
                    self.builder.add_attributes_if_missing(root, attributes);
                }
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            _ if HEAD_START_TAGS.contains(&name) => {
                let mut token = token.clone();
                return self.handle_in_head(&mut token);
            }

            // "A start tag whose tag name is "body""
            "body" => {
                // "Parse error."
                self.parse_error_with(ParseErrorCode::UnexpectedStartTag, &[("name", name)]);
                // "If the second element on the stack of open elements is not a
                // body element, if the stack of open elements has only one node
                // on it... ignore the token. (fragment case)"
                // "Otherwise, set the frameset-ok flag to "not ok"; then, for
                // each attribute on the token, check to see if the attribute is
                // already present on the body element..."
                if let Some(body) = self.body_element() {
                    self.frameset_ok = false;
                    self.builder.add_attributes_if_missing(body, attributes);
                }
            }

            // "A start tag whose tag name is "frameset""
            "frameset" => {
                // "Parse error."
                self.parse_error_with(ParseErrorCode::UnexpectedStartTag, &[("name", name)]);
                // "If the stack of open elements has only one node on it, or if
                // the second element on the stack of open elements is not a
                // body element, then ignore the token. (fragment case)"
                // "If the frameset-ok flag is set to "not ok", ignore the token."
                let Some(body) = self.body_element() else {
                    return Step::Done;
                };
                if !self.frameset_ok {
                    return Step::Done;
                }
                // STEP 1: "Remove the second element on the stack of open
                //          elements from its parent node, if it has one."
                if let Some(parent) = self.builder.parent(body) {
                    self.builder.remove_child(parent, body);
                }
                // STEP 2: "Pop all the nodes from the bottom of the stack of
                //          open elements, from the current node up to, but not
                //          including, the root html element."
                while self.open_elements.len() > 1 {
                    let _ = self.pop();
                }
                // STEP 3: "Insert an HTML element for the token."
                let _ = self.insert_html_element(name, attributes);
                // STEP 4: "Switch the insertion mode to "in frameset"."
                self.switch_to(Phase::InFrameset);
            }

            _ if BLOCK_START_TAGS.contains(&name) => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                self.close_p_element_if_in_button_scope();
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            _ if HEADINGS.contains(&name) => {
                self.close_p_element_if_in_button_scope();
                // "If the current node is an HTML element whose tag name is one
                // of "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
                // error; pop the current node off the stack of open elements."
                if self.current_node_is_one_of(HEADINGS) {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        &[("name", name)],
                    );
                    let _ = self.pop();
                }
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            "pre" | "listing" => {
                self.close_p_element_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
                // "If the next token is a U+000A LINE FEED (LF) character
                // token, then ignore that token and move on to the next one.
                // (Newlines at the start of pre blocks are ignored as an
                // authoring convenience.)"
                self.ignore_linefeed = true;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "form""
            "form" => {
                // "If the form element pointer is not null... then this is a
                // parse error; ignore the token."
                if self.form_element.is_some() {
                    self.parse_error_with(ParseErrorCode::UnexpectedStartTagIgnored, &[("name", name)]);
                    return Step::Done;
                }
                self.close_p_element_if_in_button_scope();
                // "Insert an HTML element for the token, and... set the form
                // element pointer to point to the element created."
                let form = self.insert_html_element(name, attributes);
                self.form_element = Some(form);
            }

            // "A start tag whose tag name is "li"" / "A start tag whose tag
            // name is one of: "dd", "dt""
            "li" | "dd" | "dt" => self.start_list_item(name, attributes),

            // "A start tag whose tag name is "plaintext""
            "plaintext" => {
                self.close_p_element_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
                // "Switch the tokenizer to the PLAINTEXT state."
                self.tokenizer.set_state(TokenizerState::Plaintext);
            }

            // "A start tag whose tag name is "button""
            "button" => {
                // "If the stack of open elements has a button element in
                // scope, then run these substeps: Parse error. Generate implied
                // end tags. Pop elements from the stack of open elements until
                // a button element has been popped from the stack."
                if self.has_element_in_scope("button") {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        &[("name", name)],
                    );
                    self.generate_implied_end_tags(None);
                    self.pop_until("button");
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "a""
            "a" => {
                // "If the list of active formatting elements contains an a
                // element between the end of the list and the last marker on
                // the list (or the start of the list if there is no marker on
                // the list), then this is a parse error; run the adoption
                // agency algorithm for the token, then remove that element from
                // the list of active formatting elements and the stack of open
                // elements if the adoption agency algorithm didn't already
                // remove it (it might not have if the element is not in table
                // scope)."
                if let Some(existing) = self.formatting_element_after_last_marker("a") {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        &[("name", "a")],
                    );
                    let _ = self.run_adoption_agency("a");
                    self.remove_active_formatting_element(existing);
                    self.remove_from_stack(existing);
                }
                self.insert_formatting_element(name, attributes, token);
            }

            // "A start tag whose tag name is "nobr""
            "nobr" => {
                self.reconstruct_active_formatting_elements();
                // "If the stack of open elements has a nobr element in scope,
                // then this is a parse error; run the adoption agency algorithm
                // for the token, then once again reconstruct the active
                // formatting elements, if any."
                if self.has_element_in_scope("nobr") {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        &[("name", name)],
                    );
                    let _ = self.run_adoption_agency("nobr");
                }
                self.insert_formatting_element(name, attributes, token);
            }

            // "A start tag whose tag name is one of: "b", "big", "code", "em",
            // "font", "i", "s", "small", "strike", "strong", "tt", "u""
            _ if FORMATTING_ELEMENTS.contains(&name) => {
                self.insert_formatting_element(name, attributes, token);
            }

            // "A start tag whose tag name is one of: "applet", "marquee",
            // "object""
            "applet" | "marquee" | "object" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
                // "Insert a marker at the end of the list of active formatting
                // elements."
                self.insert_marker();
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "table""
            "table" => {
                // "If the Document is not set to quirks mode, and the stack of
                // open elements has a p element in button scope, then close a
                // p element."
                if self.quirks_mode != QuirksMode::Quirks {
                    self.close_p_element_if_in_button_scope();
                }
                let _ = self.insert_html_element(name, attributes);
                self.frameset_ok = false;
                self.switch_to(Phase::InTable);
            }

            // "A start tag whose tag name is one of: "area", "br", "embed",
            // "img", "keygen", "wbr""
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.insert_void_element(name, attributes);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "input""
            "input" => {
                self.insert_void_element(name, attributes);
                // "If the token does not have an attribute with the name
                // "type", or if it does, but that attribute's value is not an
                // ASCII case-insensitive match for the string "hidden", then:
                // set the frameset-ok flag to "not ok"."
                let hidden = token
                    .attribute("type")
                    .is_some_and(|value| value.eq_ignore_ascii_case("hidden"));
                if !hidden {
                    self.frameset_ok = false;
                }
            }

            // "A start tag whose tag name is one of: "param", "source", "track""
            "param" | "source" | "track" => {
                let _ = self.insert_html_element(name, attributes);
                let _ = self.pop();
                self.acknowledge_self_closing();
            }

            // "A start tag whose tag name is "hr""
            "hr" => {
                self.close_p_element_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
                let _ = self.pop();
                self.acknowledge_self_closing();
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "textarea""
            "textarea" => {
                // STEP 1: "Insert an HTML element for the token."
                let _ = self.insert_html_element(name, attributes);
                // STEP 2: "If the next token is a U+000A LINE FEED (LF)
                //          character token, then ignore that token and move on
                //          to the next one."
                self.ignore_linefeed = true;
                // STEP 3: "Switch the tokenizer to the RCDATA state."
                self.tokenizer.set_state(TokenizerState::Rcdata);
                // STEP 4: "Let the original insertion mode be the current
                //          insertion mode."
                self.original_phase = self.current_mode();
                // STEP 5: "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // STEP 6: "Switch the insertion mode to "text"."
                self.switch_to(Phase::Text);
            }

            // "A start tag whose tag name is "xmp""
            "xmp" => {
                self.close_p_element_if_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.frameset_ok = false;
                self.parse_text_element(name, attributes, TokenizerState::Rawtext);
            }

            // "A start tag whose tag name is "iframe""
            "iframe" => {
                self.frameset_ok = false;
                self.parse_text_element(name, attributes, TokenizerState::Rawtext);
            }

            // "A start tag whose tag name is "noembed""
            // "A start tag whose tag name is "noscript", if the scripting flag
            // is enabled"
            "noembed" => self.parse_text_element(name, attributes, TokenizerState::Rawtext),
            "noscript" if self.scripting => {
                self.parse_text_element(name, attributes, TokenizerState::Rawtext);
            }

            // "A start tag whose tag name is "select""
            "select" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
                self.frameset_ok = false;
                // "If the insertion mode is one of "in table", "in caption",
                // "in table body", "in row", or "in cell", then switch the
                // insertion mode to "in select in table". Otherwise, switch the
                // insertion mode to "in select"."
                let phase = match self.current_mode() {
                    Phase::InTable
                    | Phase::InCaption
                    | Phase::InTableBody
                    | Phase::InRow
                    | Phase::InCell => Phase::InSelectInTable,
                    _ => Phase::InSelect,
                };
                self.switch_to(phase);
            }

            // "A start tag whose tag name is one of: "optgroup", "option""
            "optgroup" | "option" => {
                // "If the current node is an option element, then pop the
                // current node off the stack of open elements."
                if self.current_node_is("option") {
                    let _ = self.pop();
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is one of: "rb", "rtc""
            "rb" | "rtc" => {
                // "If the stack of open elements has a ruby element in scope,
                // then generate implied end tags. If the current node is not
                // now a ruby element, this is a parse error."
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(None);
                    if !self.current_node_is("ruby") {
                        self.parse_error_with(ParseErrorCode::UnexpectedStartTag, &[("name", name)]);
                    }
                }
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is one of: "rp", "rt""
            "rp" | "rt" => {
                // "If the stack of open elements has a ruby element in scope,
                // then generate implied end tags, except for rtc elements. If
                // the current node is not now a rtc element or a ruby element,
                // this is a parse error."
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(Some("rtc"));
                    if !self.current_node_is_one_of(&["rtc", "ruby"]) {
                        self.parse_error_with(ParseErrorCode::UnexpectedStartTag, &[("name", name)]);
                    }
                }
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is "math"" / "A start tag whose tag
            // name is "svg""
            "math" | "svg" => {
                self.reconstruct_active_formatting_elements();
                let mut attributes = attributes.to_vec();
                // "Adjust MathML attributes for the token." / "Adjust SVG
                // attributes for the token."
                let namespace = if name == "math" {
                    adjust_mathml_attributes(&mut attributes);
                    Namespace::MathMl
                } else {
                    adjust_svg_attributes(&mut attributes);
                    Namespace::Svg
                };
                // "Adjust foreign attributes for the token."
                adjust_foreign_attributes(&mut attributes);
                // "Insert a foreign element for the token, with MathML/SVG
                // namespace and false."
                let _ = self.insert_foreign_element(name, namespace, &attributes);
                // "If the token has its self-closing flag set, pop the current
                // node off the stack of open elements and acknowledge the
                // token's self-closing flag."
                if self_closing {
                    let _ = self.pop();
                    self.acknowledge_self_closing();
                } else {
                    self.enter_foreign_content();
                }
            }

            // "Parse error. Ignore the token."
            _ if IGNORED_START_TAGS.contains(&name) => {
                self.parse_error_with(ParseErrorCode::UnexpectedStartTagIgnored, &[("name", name)]);
            }

            // "Any other start tag"
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token."
            _ => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
            }
        }
        Step::Done
    }

    fn in_body_end_tag(&mut self, name: &str) -> Step {
        match name {
            // "An end tag whose tag name is "body""
            "body" => {
                if self.close_body() {
                    // "Switch the insertion mode to "after body"."
                    self.switch_to(Phase::AfterBody);
                }
            }

            // "An end tag whose tag name is "html""
            "html" => {
                if self.close_body() {
                    self.switch_to(Phase::AfterBody);
                    // "Reprocess the token."
                    return Step::Reprocess;
                }
            }

            _ if BLOCK_END_TAGS.contains(&name) => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element with the same tag name as that
                // of the token, then this is a parse error; ignore the token."
                if !self.has_element_in_scope(name) {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name)]);
                    return Step::Done;
                }
                self.close_element_in_scope(name);
            }

            // "An end tag whose tag name is "form""
            "form" => {
                // "Let node be the element that the form element pointer is set
                // to, or null if it is not set to an element."
                // "Set the form element pointer to null."
                let node = self.form_element.take();
                // "If node is null or if the stack of open elements does not
                // have node in scope, then this is a parse error; return and
                // ignore the token."
                let Some(node) = node.filter(|&node| self.has_node_in_scope(node)) else {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name)]);
                    return Step::Done;
                };
                self.generate_implied_end_tags(None);
                // "If the current node is not node, then this is a parse error."
                if self.current_node() != Some(node) {
                    self.parse_error_with(ParseErrorCode::EndTagTooEarlyIgnored, &[("name", name)]);
                }
                // "Remove node from the stack of open elements."
                self.remove_from_stack(node);
            }

            // "An end tag whose tag name is "p""
            "p" => {
                // "If the stack of open elements does not have a p element in
                // button scope, then this is a parse error; insert an HTML
                // element for a "p" start tag token with no attributes."
                if !self.has_element_in_button_scope("p") {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name)]);
                    let _ = self.insert_html_element("p", &[]);
                }
                // "Close a p element."
                self.close_p_element();
            }

            // "An end tag whose tag name is "li""
            "li" => {
                if !self.has_element_in_specific_scope(&["li"], Scope::ListItem) {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name)]);
                    return Step::Done;
                }
                self.close_element_in_scope(name);
            }

            // "An end tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => {
                if !self.has_element_in_scope(name) {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name)]);
                    return Step::Done;
                }
                self.close_element_in_scope(name);
            }

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            _ if HEADINGS.contains(&name) => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element and whose tag name is one of
                // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
                // error; ignore the token."
                if !self.has_element_in_specific_scope(HEADINGS, Scope::Default) {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name)]);
                    return Step::Done;
                }
                self.generate_implied_end_tags(None);
                if !self.current_node_is(name) {
                    self.parse_error_with(ParseErrorCode::EndTagTooEarly, &[("name", name)]);
                }
                self.pop_until_one_of(HEADINGS);
            }

            // "An end tag whose tag name is one of: "a", "b", "big", "code",
            // "em", "font", "i", "nobr", "s", "small", "strike", "strong",
            // "tt", "u""
            // "Run the adoption agency algorithm for the token."
            _ if FORMATTING_ELEMENTS.contains(&name) => {
                if !self.run_adoption_agency(name) {
                    self.any_other_end_tag(name);
                }
            }

            // "An end tag token whose tag name is one of: "applet",
            // "marquee", "object""
            "applet" | "marquee" | "object" => {
                if !self.has_element_in_scope(name) {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name)]);
                    return Step::Done;
                }
                self.close_element_in_scope(name);
                // "Clear the list of active formatting elements up to the last
                // marker."
                self.clear_active_formatting_elements_to_last_marker();
            }

            // "An end tag whose tag name is "br""
            // "Parse error. Drop the attributes from the token, and act as
            // described in the next entry; i.e. act as if this was a "br"
            // start tag token with no attributes, rather than the end tag
            // token that it actually is."
            "br" => {
                self.parse_error_with(
                    ParseErrorCode::UnexpectedEndTagTreatedAs,
                    &[("name", "br"), ("treated_as", "<br>")],
                );
                self.insert_void_element("br", &[]);
                self.frameset_ok = false;
            }

            // "Any other end tag"
            _ => self.any_other_end_tag(name),
        }
        Step::Done
    }

    /// The shared steps of `</body>` and `</html>`. Returns `false` when the
    /// token is ignored.
    fn close_body(&mut self) -> bool {
        // "If the stack of open elements does not have a body element in
        // scope, this is a parse error; ignore the token."
        if !self.has_element_in_scope("body") {
            self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", "body")]);
            return false;
        }
        // "Otherwise, if there is a node in the stack of open elements that is
        // not either a dd element, a dt element, ... then this is a parse
        // error."
        if self.has_unclosed_elements() {
            let current = self.current_node_name();
            self.parse_error_with(
                ParseErrorCode::EndTagTooEarly,
                &[("name", "body"), ("open", current.as_str())],
            );
        }
        true
    }

    /// "Generate implied end tags, except for HTML elements with the same tag
    /// name as the token. If the current node is not an HTML element with the
    /// same tag name as that of the token, then this is a parse error. Pop
    /// elements from the stack of open elements until an HTML element with
    /// the same tag name as the token has been popped from the stack."
    fn close_element_in_scope(&mut self, name: &str) {
        self.generate_implied_end_tags(Some(name));
        if !self.current_node_is(name) {
            self.parse_error_with(ParseErrorCode::EndTagTooEarly, &[("name", name)]);
        }
        self.pop_until(name);
    }

    /// Start tags for `li`, `dd` and `dt`.
    fn start_list_item(&mut self, name: &str, attributes: &[Attribute]) {
        // STEP 1: "Set the frameset-ok flag to "not ok"."
        self.frameset_ok = false;

        // STEP 2-3: "Initialize node to be the current node (the bottommost
        //            node of the stack). Loop: ..."
        for index in (0..self.open_elements.len()).rev() {
            let node = self.open_elements[index];
            // "If node is an li element, then run these substeps" / "If node
            // is a dd element..." / "If node is a dt element..."
            let closes = match (name, self.html_name(node)) {
                ("li", Some("li")) => Some("li"),
                ("dd" | "dt", Some("dd")) => Some("dd"),
                ("dd" | "dt", Some("dt")) => Some("dt"),
                _ => None,
            };
            if let Some(closes) = closes {
                // "Generate implied end tags, except for li elements."
                self.generate_implied_end_tags(Some(closes));
                // "If the current node is not an li element, then this is a
                // parse error."
                if !self.current_node_is(closes) {
                    self.parse_error_with(ParseErrorCode::EndTagTooEarly, &[("name", closes)]);
                }
                // "Pop elements from the stack of open elements until an li
                // element has been popped from the stack."
                self.pop_until(closes);
                break;
            }
            // "If node is in the special category, but is not an address, div,
            // or p element, then jump to the step labeled done below."
            if self.is_special(node) && !self.is_html_element_in(node, &["address", "div", "p"]) {
                break;
            }
            // "Otherwise, set node to the previous entry in the stack of open
            // elements and return to the step labeled loop."
        }

        // "Done: If the stack of open elements has a p element in button scope,
        // then close a p element."
        self.close_p_element_if_in_button_scope();
        // "Finally, insert an HTML element for the token."
        let _ = self.insert_html_element(name, attributes);
    }

    /// "Reconstruct the active formatting elements, if any. Insert an HTML
    /// element for the token. Push onto the list of active formatting elements
    /// that element."
    fn insert_formatting_element(&mut self, name: &str, attributes: &[Attribute], token: &Token) {
        self.reconstruct_active_formatting_elements();
        let element = self.insert_html_element(name, attributes);
        self.push_active_formatting_element(element, token.clone());
    }

    /// "Reconstruct the active formatting elements, if any. Insert an HTML
    /// element for the token. Immediately pop the current node off the stack of
    /// open elements. Acknowledge the token's self-closing flag, if it is set."
    fn insert_void_element(&mut self, name: &str, attributes: &[Attribute]) {
        self.reconstruct_active_formatting_elements();
        let _ = self.insert_html_element(name, attributes);
        let _ = self.pop();
        self.acknowledge_self_closing();
    }
}
