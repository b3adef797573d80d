use crate::error::{ErrorSink, ParseErrorCode};
use crate::parser::core::{Phase, Step, TreeConstructor};
use crate::tokenizer::{Token, TokenizerState};
use crate::tree_builder::TreeBuilder;

impl<B: TreeBuilder, S: ErrorSink> TreeConstructor<B, S> {
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(in crate::parser) fn handle_in_head(&mut self, token: &mut Token) -> Step {
        match &*token {
            // "A character token that is one of U+0009 CHARACTER TABULATION..."
            // "Insert the character."
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
                name, attributes, ..
            } => match name.as_str() {
                // "A start tag whose tag name is "html""
                // "Process the token using the rules for the "in body"
                // insertion mode."
                "html" => self.handle_in_body(token),

                // "A start tag whose tag name is one of: "base", "basefont",
                // "bgsound", "link""
                // "Insert an HTML element for the token. Immediately pop the
                // current node off the stack of open elements."
                // "Acknowledge the token's self-closing flag, if it is set."
                //
                // "A start tag whose tag name is "meta"" is handled the same
                // way; there is no encoding to change.
                "base" | "basefont" | "bgsound" | "link" | "meta" => {
                    let _ = self.insert_html_element(name, attributes);
                    let _ = self.pop();
                    self.acknowledge_self_closing();
                    Step::Done
                }

                // "A start tag whose tag name is "title""
                // "Follow the generic RCDATA element parsing algorithm."
                "title" => {
                    self.parse_text_element(name, attributes, TokenizerState::Rcdata);
                    Step::Done
                }

                // "A start tag whose tag name is one of: "noframes", "style""
                // "Follow the generic raw text element parsing algorithm."
                "noframes" | "style" => {
                    self.parse_text_element(name, attributes, TokenizerState::Rawtext);
                    Step::Done
                }

                // "A start tag whose tag name is "noscript", if the scripting
                // flag is enabled"
                // "Follow the generic raw text element parsing algorithm."
                "noscript" if self.scripting => {
                    self.parse_text_element(name, attributes, TokenizerState::Rawtext);
                    Step::Done
                }

                // "A start tag whose tag name is "noscript", if the scripting
                // flag is disabled"
                // "Insert an HTML element for the token."
                // "Switch the insertion mode to "in head noscript"."
                "noscript" => {
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(Phase::InHeadNoscript);
                    Step::Done
                }

                // "A start tag whose tag name is "script""
                "script" => {
                    self.parse_text_element(name, attributes, TokenizerState::ScriptData);
                    Step::Done
                }

                // "A start tag whose tag name is "head""
                // "Parse error. Ignore the token."
                "head" => {
                    self.parse_error(ParseErrorCode::TwoHeadsAreNotBetterThanOne);
                    Step::Done
                }

                _ => self.leave_head(),
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "head""
                // "Pop the current node (which will be the head element) off the
                // stack of open elements."
                // "Switch the insertion mode to "after head"."
                "head" => {
                    let _ = self.pop();
                    self.switch_to(Phase::AfterHead);
                    Step::Done
                }

                // "An end tag whose tag name is one of: "body", "html", "br""
                // "Act as described in the "anything else" entry below."
                "body" | "html" | "br" => self.leave_head(),

                // "Any other end tag"
                // "Parse error. Ignore the token."
                _ => {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name.as_str())]);
                    Step::Done
                }
            },

            Token::Character { .. } | Token::EndOfFile => self.leave_head(),
        }
    }

    /// "Anything else"
    /// "Pop the current node (which will be the head element) off the stack of
    /// open elements."
    /// "Switch the insertion mode to "after head"."
    /// "Reprocess the token."
    fn leave_head(&mut self) -> Step {
        let _ = self.pop();
        self.switch_to(Phase::AfterHead);
        Step::Reprocess
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(in crate::parser) fn handle_in_head_noscript(&mut self, token: &mut Token) -> Step {
        match &*token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => {
                self.parse_error(ParseErrorCode::UnexpectedDoctype);
                Step::Done
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION..."
            // "A comment token"
            // "Process the token using the rules for the "in head" insertion
            // mode."
            Token::SpaceCharacters { .. } | Token::Comment { .. } => self.handle_in_head(token),

            Token::StartTag { name, .. } => match name.as_str() {
                // "A start tag whose tag name is "html""
                "html" => self.handle_in_body(token),

                // "A start tag whose tag name is one of: "basefont", "bgsound",
                // "link", "meta", "noframes", "style""
                "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style" => {
                    self.handle_in_head(token)
                }

                // "A start tag whose tag name is one of: "head", "noscript""
                // "Parse error. Ignore the token."
                "head" | "noscript" => {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedStartTagIgnored,
                        &[("name", name.as_str())],
                    );
                    Step::Done
                }

                _ => {
                    self.parse_error_with(ParseErrorCode::UnexpectedStartTag, &[("name", name.as_str())]);
                    self.leave_noscript()
                }
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "noscript""
                // "Pop the current node (which will be a noscript element) from
                // the stack of open elements; the new current node will be a
                // head element."
                // "Switch the insertion mode to "in head"."
                "noscript" => {
                    let _ = self.pop();
                    self.switch_to(Phase::InHead);
                    Step::Done
                }

                // "An end tag whose tag name is "br""
                // "Act as described in the "anything else" entry below."
                "br" => {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", "br")]);
                    self.leave_noscript()
                }

                // "Any other end tag"
                // "Parse error. Ignore the token."
                _ => {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name.as_str())]);
                    Step::Done
                }
            },

            Token::Character { .. } => {
                self.parse_error(ParseErrorCode::UnexpectedCharInNoscript);
                self.leave_noscript()
            }

            Token::EndOfFile => {
                self.parse_error_with(
                    ParseErrorCode::ExpectedNamedClosingTagButGotEof,
                    &[("name", "noscript")],
                );
                self.leave_noscript()
            }
        }
    }

    /// "Anything else"
    /// "Pop the current node (which will be a noscript element) from the stack
    /// of open elements; the new current node will be a head element."
    /// "Switch the insertion mode to "in head"."
    /// "Reprocess the token."
    fn leave_noscript(&mut self) -> Step {
        let _ = self.pop();
        self.switch_to(Phase::InHead);
        Step::Reprocess
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(in crate::parser) fn handle_after_head(&mut self, token: &mut Token) -> Step {
        match &*token {
            // "A character token that is one of U+0009 CHARACTER TABULATION..."
            // "Insert the character."
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
                name, attributes, ..
            } => match name.as_str() {
                // "A start tag whose tag name is "html""
                // "Process the token using the rules for the "in body"
                // insertion mode."
                "html" => self.handle_in_body(token),

                // "A start tag whose tag name is "body""
                // "Insert an HTML element for the token."
                // "Set the frameset-ok flag to "not ok"."
                // "Switch the insertion mode to "in body"."
                "body" => {
                    let _ = self.insert_html_element(name, attributes);
                    self.frameset_ok = false;
                    self.switch_to(Phase::InBody);
                    Step::Done
                }

                // "A start tag whose tag name is "frameset""
                // "Insert an HTML element for the token."
                // "Switch the insertion mode to "in frameset"."
                "frameset" => {
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(Phase::InFrameset);
                    Step::Done
                }

                // "A start tag whose tag name is one of: "base", "basefont",
                // "bgsound", "link", "meta", "noframes", "script", "style",
                // "template", "title""
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "title" => {
                    // "Parse error."
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedStartTagOutOfMyHead,
                        &[("name", name.as_str())],
                    );
                    // "Push the node pointed to by the head element pointer
                    // onto the stack of open elements."
                    let Some(head) = self.head_element else {
                        return Step::Done;
                    };
                    self.push_open_element(head);
                    // "Process the token using the rules for the "in head"
                    // insertion mode."
                    let step = self.handle_in_head(token);
                    // "Remove the node pointed to by the head element pointer
                    // from the stack of open elements. (It might not be the
                    // current node at this point.)"
                    self.remove_from_stack(head);
                    step
                }

                // "A start tag whose tag name is "head""
                // "Parse error. Ignore the token."
                "head" => {
                    self.parse_error(ParseErrorCode::UnexpectedStartTagIgnored);
                    Step::Done
                }

                _ => self.start_body(),
            },

            // "An end tag whose tag name is one of: "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.start_body()
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } => {
                self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name.as_str())]);
                Step::Done
            }

            Token::Character { .. } | Token::EndOfFile => self.start_body(),
        }
    }

    /// "Anything else"
    /// "Insert an HTML element for a "body" start tag token with no attributes."
    /// "Switch the insertion mode to "in body"."
    /// "Reprocess the current token."
    fn start_body(&mut self) -> Step {
        let _ = self.insert_html_element("body", &[]);
        self.switch_to(Phase::InBody);
        Step::Reprocess
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(in crate::parser) fn handle_text(&mut self, token: &mut Token) -> Step {
        match &*token {
            // "A character token"
            // "Insert the token's character."
            Token::Character { data } | Token::SpaceCharacters { data } => {
                self.insert_characters(data);
                Step::Done
            }

            // "An end-of-file token"
            // "Parse error."
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode and
            // reprocess the token."
            Token::EndOfFile => {
                let name = self.current_node_name();
                self.parse_error_with(
                    ParseErrorCode::ExpectedNamedClosingTagButGotEof,
                    &[("name", name.as_str())],
                );
                let _ = self.pop();
                self.switch_to(self.original_phase);
                Step::Reprocess
            }

            // "An end tag whose tag name is "script"" / "Any other end tag"
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode."
            Token::EndTag { .. } => {
                let _ = self.pop();
                self.switch_to(self.original_phase);
                Step::Done
            }

            // The tokenizer only produces text and end tags in the text
            // content models.
            Token::StartTag { .. } | Token::Comment { .. } | Token::Doctype { .. } => Step::Done,
        }
    }
}
