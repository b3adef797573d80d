use quill_dom::Namespace;

use crate::error::{ErrorSink, ParseErrorCode};
use crate::parser::core::{Step, TreeConstructor};
use crate::parser::foreign_content::{
    adjust_foreign_attributes, adjust_mathml_attributes, adjust_svg_attributes,
    adjust_svg_tag_name, is_breakout_tag, mathml, svg,
};
use crate::tokenizer::{Attribute, Token};
use crate::tree_builder::TreeBuilder;

impl<B: TreeBuilder, S: ErrorSink> TreeConstructor<B, S> {
    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    ///
    /// Tokens the dispatcher hands to HTML content are processed in the
    /// secondary phase. Foreign content ends once no SVG or MathML element is
    /// left open.
    pub(in crate::parser) fn handle_in_foreign_content(&mut self, token: &mut Token) -> Step {
        if self.uses_html_rules(token) {
            let step = self.dispatch_html(self.secondary_phase, token);
            self.leave_foreign_content_if_done();
            return step;
        }

        match &*token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Insert a U+FFFD REPLACEMENT CHARACTER character."
            // "Any other character token"
            // "Insert the token's character. Set the frameset-ok flag to "not
            // ok"."
            Token::Character { data } => {
                if data.contains('\0') {
                    self.parse_error(ParseErrorCode::InvalidCodepoint);
                    let data = data.replace('\0', "\u{FFFD}");
                    self.insert_characters(&data);
                } else {
                    self.insert_characters(data);
                }
                if data.chars().any(|c| !matches!(c, ' ' | '\t' | '\n' | '\x0C')) {
                    self.frameset_ok = false;
                }
                Step::Done
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION..."
            // "Insert the token's character."
            Token::SpaceCharacters { data } => {
                self.insert_characters(data);
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
                name,
                self_closing,
                attributes,
            } => {
                // "A start tag whose tag name is one of: "b", "big",
                // "blockquote", "body", "br", ..." / "A start tag whose tag
                // name is "font", if the token has any attributes named
                // "color", "face", or "size""
                if is_breakout_tag(name, attributes) {
                    self.parse_error_with(ParseErrorCode::HtmlInForeignContent, &[("name", name.as_str())]);
                    return self.break_out_of_foreign_content(token);
                }
                self.insert_foreign_start_tag(name, attributes.clone(), *self_closing);
                Step::Done
            }

            // "An end tag whose tag name is "br", "p""
            // "Parse error. ... reprocess the token."
            Token::EndTag { name } if matches!(name.as_str(), "br" | "p") => {
                self.parse_error_with(ParseErrorCode::HtmlInForeignContent, &[("name", name.as_str())]);
                self.break_out_of_foreign_content(token)
            }

            Token::EndTag { name } => {
                let name = name.clone();
                self.foreign_end_tag(&name, token)
            }

            // The end-of-file token is always handled by the HTML rules.
            Token::EndOfFile => Step::Done,
        }
    }

    /// "While the current node is not a MathML text integration point, an HTML
    /// integration point, or an element in the HTML namespace, pop elements
    /// from the stack of open elements."
    /// "Reprocess the token according to the rules given in the section
    /// corresponding to the current insertion mode in HTML content."
    fn break_out_of_foreign_content(&mut self, token: &mut Token) -> Step {
        while let Some(node) = self.current_node() {
            let stop = match self.builder.element_name(node) {
                Some((_, Namespace::Html)) | None => true,
                Some((name, Namespace::MathMl)) => {
                    mathml::is_text_integration_point(name) || self.html_integration_points.contains(&node)
                }
                Some((name, Namespace::Svg)) => svg::is_html_integration_point(name),
            };
            if stop {
                break;
            }
            let _ = self.pop();
        }
        let step = self.dispatch_html(self.secondary_phase, token);
        self.leave_foreign_content_if_done();
        step
    }

    /// "Any other start tag"
    fn insert_foreign_start_tag(&mut self, name: &str, mut attributes: Vec<Attribute>, self_closing: bool) {
        let namespace = self
            .adjusted_current_node()
            .and_then(|node| self.builder.element_name(node))
            .map_or(Namespace::Html, |(_, namespace)| namespace);
        let mut name = name;
        match namespace {
            // "If the adjusted current node is an element in the MathML
            // namespace, adjust MathML attributes for the token."
            Namespace::MathMl => adjust_mathml_attributes(&mut attributes),
            // "If the adjusted current node is an element in the SVG namespace,
            // and the token's tag name is one of the ones in the first column
            // of the following table, change the tag name to the name given in
            // the corresponding cell in the second column."
            // "If the adjusted current node is an element in the SVG namespace,
            // adjust SVG attributes for the token."
            Namespace::Svg => {
                if let Some(adjusted) = adjust_svg_tag_name(name) {
                    name = adjusted;
                }
                adjust_svg_attributes(&mut attributes);
            }
            Namespace::Html => {}
        }
        // "Adjust foreign attributes for the token."
        adjust_foreign_attributes(&mut attributes);
        // "Insert a foreign element for the token, with adjusted current node's
        // namespace and false."
        let _ = self.insert_foreign_element(name, namespace, &attributes);
        // "If the token has its self-closing flag set, then ... pop the current
        // node off the stack of open elements and acknowledge the token's
        // self-closing flag."
        if self_closing {
            let _ = self.pop();
            self.acknowledge_self_closing();
        }
    }

    /// "Any other end tag"
    fn foreign_end_tag(&mut self, name: &str, token: &mut Token) -> Step {
        let matches_token = |this: &Self, node: B::Handle| {
            this.builder
                .element_name(node)
                .is_some_and(|(tag, _)| tag.eq_ignore_ascii_case(name))
        };

        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        let Some(mut index) = self.open_elements.len().checked_sub(1) else {
            return Step::Done;
        };

        // STEP 2: "If node's tag name, converted to ASCII lowercase, is not the
        //          same as the tag name of the token, then this is a parse
        //          error."
        if !matches_token(self, self.open_elements[index]) {
            self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name)]);
        }

        loop {
            // STEP 3: "Loop: If node is the topmost element in the stack of
            //          open elements, then return. (fragment case)"
            if index == 0 {
                return Step::Done;
            }

            // STEP 4: "If node's tag name, converted to ASCII lowercase, is the
            //          same as the tag name of the token, pop elements from the
            //          stack of open elements until node has been popped from
            //          the stack, and then return."
            let node = self.open_elements[index];
            if matches_token(self, node) {
                self.pop_until_node(node);
                self.leave_foreign_content_if_done();
                return Step::Done;
            }

            // STEP 5: "Set node to the previous entry in the stack of open
            //          elements."
            index -= 1;

            // STEP 6: "If node is not an element in the HTML namespace, return
            //          to the step labeled loop."
            // STEP 7: "Otherwise, process the token according to the rules
            //          given in the section corresponding to the current
            //          insertion mode in HTML content."
            if self.html_name(self.open_elements[index]).is_some() {
                let step = self.dispatch_html(self.secondary_phase, token);
                self.leave_foreign_content_if_done();
                return step;
            }
        }
    }
}
