//! The insertion modes after the body or frameset has been closed, and "in
//! frameset".

use crate::error::{ErrorSink, ParseErrorCode};
use crate::parser::core::{Phase, Step, TreeConstructor};
use crate::tokenizer::Token;
use crate::tree_builder::TreeBuilder;

/// The error codes a phase reports for stray text, start tags and end tags.
struct Unexpected {
    text: ParseErrorCode,
    start_tag: ParseErrorCode,
    end_tag: ParseErrorCode,
}

const AFTER_BODY: Unexpected = Unexpected {
    text: ParseErrorCode::UnexpectedCharAfterBody,
    start_tag: ParseErrorCode::UnexpectedStartTagAfterBody,
    end_tag: ParseErrorCode::UnexpectedEndTagAfterBody,
};

const IN_FRAMESET: Unexpected = Unexpected {
    text: ParseErrorCode::UnexpectedCharInFrameset,
    start_tag: ParseErrorCode::UnexpectedStartTagInFrameset,
    end_tag: ParseErrorCode::UnexpectedEndTagInFrameset,
};

const AFTER_FRAMESET: Unexpected = Unexpected {
    text: ParseErrorCode::UnexpectedCharAfterFrameset,
    start_tag: ParseErrorCode::UnexpectedStartTagAfterFrameset,
    end_tag: ParseErrorCode::UnexpectedEndTagAfterFrameset,
};

const AFTER_HTML: Unexpected = Unexpected {
    text: ParseErrorCode::ExpectedEofButGotChar,
    start_tag: ParseErrorCode::ExpectedEofButGotStartTag,
    end_tag: ParseErrorCode::ExpectedEofButGotEndTag,
};

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0C')
}

impl<B: TreeBuilder, S: ErrorSink> TreeConstructor<B, S> {
    fn report_unexpected(&mut self, codes: &Unexpected, token: &Token) {
        match token {
            Token::StartTag { name, .. } => {
                self.parse_error_with(codes.start_tag, &[("name", name.as_str())]);
            }
            Token::EndTag { name } => {
                self.parse_error_with(codes.end_tag, &[("name", name.as_str())]);
            }
            _ => self.parse_error(codes.text),
        }
    }

    /// Reports stray text and keeps only its whitespace, which these phases
    /// insert.
    fn keep_whitespace(&mut self, codes: &Unexpected, data: &str) -> String {
        self.parse_error(codes.text);
        data.chars().filter(|&c| is_space(c)).collect()
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(in crate::parser) fn handle_after_body(&mut self, token: &mut Token) -> Step {
        match &*token {
            // "A character token that is one of U+0009 CHARACTER TABULATION..."
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::SpaceCharacters { .. } => self.handle_in_body(token),

            // "A comment token"
            // "Insert a comment as the last child of the first element in the
            // stack of open elements (the html element)."
            Token::Comment { data } => {
                let html = self.open_elements.first().copied();
                self.insert_comment(data, html);
                Step::Done
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => {
                self.parse_error(ParseErrorCode::UnexpectedDoctype);
                Step::Done
            }

            Token::StartTag { name, .. } if name == "html" => self.handle_in_body(token),

            // "An end tag whose tag name is "html""
            Token::EndTag { name } if name == "html" => {
                // "If the parser was created as part of the HTML fragment
                // parsing algorithm, this is a parse error; ignore the token.
                // (fragment case)"
                if self.context_element.is_some() {
                    self.parse_error_with(ParseErrorCode::UnexpectedEndTagAfterBody, &[("name", "html")]);
                    return Step::Done;
                }
                // "Otherwise, switch the insertion mode to "after after body"."
                self.switch_to(Phase::AfterAfterBody);
                Step::Done
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => {
                self.stop_parsing();
                Step::Done
            }

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            Token::Character { .. } | Token::StartTag { .. } | Token::EndTag { .. } => {
                self.report_unexpected(&AFTER_BODY, token);
                self.switch_to(Phase::InBody);
                Step::Reprocess
            }
        }
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    pub(in crate::parser) fn handle_in_frameset(&mut self, token: &mut Token) -> Step {
        match &*token {
            // "Insert the character."
            Token::SpaceCharacters { data } => {
                self.insert_characters(data);
                Step::Done
            }
            Token::Character { data } => {
                let spaces = self.keep_whitespace(&IN_FRAMESET, data);
                self.insert_characters(&spaces);
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

                // "A start tag whose tag name is "frameset""
                // "Insert an HTML element for the token."
                "frameset" => {
                    let _ = self.insert_html_element(name, attributes);
                    Step::Done
                }

                // "A start tag whose tag name is "frame""
                // "Insert an HTML element for the token. Immediately pop the
                // current node off the stack of open elements. Acknowledge the
                // token's self-closing flag, if it is set."
                "frame" => {
                    let _ = self.insert_html_element(name, attributes);
                    let _ = self.pop();
                    self.acknowledge_self_closing();
                    Step::Done
                }

                // "A start tag whose tag name is "noframes""
                // "Process the token using the rules for the "in head"
                // insertion mode."
                "noframes" => self.handle_in_head(token),

                _ => {
                    self.report_unexpected(&IN_FRAMESET, token);
                    Step::Done
                }
            },

            // "An end tag whose tag name is "frameset""
            Token::EndTag { name } if name == "frameset" => {
                // "If the current node is the root html element, then this is
                // a parse error; ignore the token. (fragment case)"
                if self.current_node_is("html") {
                    self.parse_error(ParseErrorCode::UnexpectedFramesetInFramesetInnerhtml);
                    return Step::Done;
                }
                // "Otherwise, pop the current node from the stack of open
                // elements."
                let _ = self.pop();
                // "If the parser was not created as part of the HTML fragment
                // parsing algorithm (fragment case), and the current node is no
                // longer a frameset element, then switch the insertion mode to
                // "after frameset"."
                if self.context_element.is_none() && !self.current_node_is("frameset") {
                    self.switch_to(Phase::AfterFrameset);
                }
                Step::Done
            }

            Token::EndTag { .. } => {
                self.report_unexpected(&IN_FRAMESET, token);
                Step::Done
            }

            // "An end-of-file token"
            // "If the current node is not the root html element, then this is
            // a parse error."
            Token::EndOfFile => {
                if !self.current_node_is("html") {
                    self.parse_error(ParseErrorCode::EofInFrameset);
                }
                self.stop_parsing();
                Step::Done
            }
        }
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    pub(in crate::parser) fn handle_after_frameset(&mut self, token: &mut Token) -> Step {
        match &*token {
            Token::SpaceCharacters { data } => {
                self.insert_characters(data);
                Step::Done
            }
            Token::Character { data } => {
                let spaces = self.keep_whitespace(&AFTER_FRAMESET, data);
                self.insert_characters(&spaces);
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
            Token::StartTag { name, .. } if name == "noframes" => self.handle_in_head(token),

            // "An end tag whose tag name is "html""
            // "Switch the insertion mode to "after after frameset"."
            Token::EndTag { name } if name == "html" => {
                self.switch_to(Phase::AfterAfterFrameset);
                Step::Done
            }

            Token::EndOfFile => {
                self.stop_parsing();
                Step::Done
            }

            // "Anything else"
            // "Parse error. Ignore the token."
            Token::StartTag { .. } | Token::EndTag { .. } => {
                self.report_unexpected(&AFTER_FRAMESET, token);
                Step::Done
            }
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(in crate::parser) fn handle_after_after_body(&mut self, token: &mut Token) -> Step {
        match &*token {
            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                let document = self.builder.document();
                self.insert_comment(data, Some(document));
                Step::Done
            }

            // "A DOCTYPE token" / "A character token that is one of U+0009
            // CHARACTER TABULATION..." / "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::Doctype { .. } | Token::SpaceCharacters { .. } => self.handle_in_body(token),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body(token),

            Token::EndOfFile => {
                self.stop_parsing();
                Step::Done
            }

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            Token::Character { .. } | Token::StartTag { .. } | Token::EndTag { .. } => {
                self.report_unexpected(&AFTER_HTML, token);
                self.switch_to(Phase::InBody);
                Step::Reprocess
            }
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    pub(in crate::parser) fn handle_after_after_frameset(&mut self, token: &mut Token) -> Step {
        match &*token {
            Token::Comment { data } => {
                let document = self.builder.document();
                self.insert_comment(data, Some(document));
                Step::Done
            }
            Token::Doctype { .. } | Token::SpaceCharacters { .. } => self.handle_in_body(token),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body(token),

            // "A start tag whose tag name is "noframes""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            Token::StartTag { name, .. } if name == "noframes" => self.handle_in_head(token),

            Token::EndOfFile => {
                self.stop_parsing();
                Step::Done
            }

            // "Anything else"
            // "Parse error. Ignore the token."
            Token::Character { data } => {
                let spaces = self.keep_whitespace(&AFTER_HTML, data);
                self.insert_body_text(&spaces);
                Step::Done
            }
            Token::StartTag { .. } | Token::EndTag { .. } => {
                self.report_unexpected(&AFTER_HTML, token);
                Step::Done
            }
        }
    }
}
