//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input handling ("Consume the next input character")
//! - Token emission ("Emit the current token")
//! - Attribute bookkeeping

use super::core::{Tokenizer, TokenizerState};
use super::token::{Attribute, Token};
use crate::error::{ErrorVars, ParseError, ParseErrorCode};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl Tokenizer {
    /// "Switch to the X state"
    ///
    /// The next character will be consumed on the next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input Helpers
// =============================================================================

impl Tokenizer {
    /// "Consume the next input character"
    ///
    /// [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream):
    /// control characters and noncharacters are parse errors the first time
    /// they are consumed.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.stream.consume();
        if let Some(invalid) = self.stream.take_invalid_code_point() {
            if super::input_stream::is_control(invalid) {
                self.log_parse_error(ParseErrorCode::ControlCharacterInInputStream);
            } else {
                self.log_parse_error(ParseErrorCode::NoncharacterInInputStream);
            }
        }
        c
    }

    /// [Infra § 4.6 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// NOTE: The tokenizer never sees CR, which is normalized away before tokenization.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        // "U+0009 CHARACTER TABULATION (tab)"
        // "U+000A LINE FEED (LF)"
        // "U+000C FORM FEED (FF)"
        // "U+0020 SPACE"
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl Tokenizer {
    /// "Emit the current token"
    ///
    /// Finishes the attribute being built, then queues the token along with the
    /// errors reported while building it.
    pub(super) fn emit_token(&mut self) {
        self.commit_attribute();
        let Some(token) = self.current_token.take() else {
            return;
        };
        match &token {
            // "The last start tag token emitted" drives appropriate end tag checks.
            Token::StartTag { name, .. } => {
                self.last_start_tag_name = Some(name.clone());
            }
            // [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#parse-error-end-tag-with-attributes)
            // "When an end tag token is emitted with attributes, that is an
            // end-tag-with-attributes parse error."
            Token::EndTag { .. } if self.end_tag_has_attributes => {
                self.log_parse_error(ParseErrorCode::EndTagWithAttributes);
            }
            _ => {}
        }
        self.end_tag_has_attributes = false;
        log::trace!("token {token}");
        self.push_token(token);
    }

    /// "Emit the current input character as a character token."
    pub(super) fn emit_character_token(&mut self, c: char) {
        self.push_text(c, false);
    }

    /// Data state characters: whitespace runs become [`Token::SpaceCharacters`].
    pub(super) fn emit_data_character(&mut self, c: char) {
        self.push_text(c, Self::is_whitespace_char(c));
    }

    /// "Emit an end-of-file token."
    ///
    /// Anything still being built is dropped.
    pub(super) fn emit_eof_token(&mut self) {
        self.current_token = None;
        self.current_attribute = None;
        self.at_eof = true;
        self.push_token(Token::EndOfFile);
    }

    fn push_token(&mut self, token: Token) {
        let errors = std::mem::take(&mut self.pending_errors);
        self.queue.push_back((token, errors));
    }

    /// Adjacent characters of the same kind share one token.
    fn push_text(&mut self, c: char, space: bool) {
        if let Some((back, errors)) = self.queue.back_mut() {
            let run = match back {
                Token::SpaceCharacters { data } if space => Some(data),
                Token::Character { data } if !space => Some(data),
                _ => None,
            };
            if let Some(data) = run {
                data.push(c);
                errors.append(&mut self.pending_errors);
                return;
            }
        }
        let data = c.to_string();
        let token = if space {
            Token::SpaceCharacters { data }
        } else {
            Token::Character { data }
        };
        self.push_token(token);
    }
}

// =============================================================================
// Tag Helpers
// =============================================================================

impl Tokenizer {
    /// "Create a new end tag token, set its tag name to the empty string."
    pub(super) fn start_end_tag(&mut self) {
        self.current_token = Some(Token::new_end_tag());
        self.current_attribute = None;
        self.end_tag_has_attributes = false;
    }

    pub(super) fn append_to_tag_name(&mut self, c: char) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_to_tag_name(c);
        }
    }

    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any. If no start tag has been emitted from this tokenizer,
    /// then no end tag token is appropriate."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        if let (Some(last_start_tag), Some(Token::EndTag { name })) =
            (&self.last_start_tag_name, &self.current_token)
        {
            return name == last_start_tag;
        }
        false
    }

    /// The "anything else" entry of the RCDATA, RAWTEXT, script data and
    /// script data escaped end tag name states:
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character
    /// token, and a character token for each of the characters in the temporary
    /// buffer (in the order they were added to the buffer). Reconsume in the
    /// ... state."
    pub(super) fn emit_end_tag_name_anything_else(&mut self, text_state: TokenizerState) {
        // STEP 1: "Emit a U+003C LESS-THAN SIGN character token"
        self.emit_character_token('<');
        // STEP 2: "Emit a U+002F SOLIDUS character token"
        self.emit_character_token('/');
        // STEP 3: "a character token for each of the characters in the temporary buffer"
        let buffer = std::mem::take(&mut self.temporary_buffer);
        for c in buffer.chars() {
            self.emit_character_token(c);
        }
        // STEP 4: The end tag token is discarded.
        self.current_token = None;
        self.current_attribute = None;
        self.end_tag_has_attributes = false;
        // STEP 5: "Reconsume in the ... state"
        self.reconsume_in(text_state);
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl Tokenizer {
    /// "Start a new attribute in the current tag token. Set that attribute
    /// name and value to the empty string."
    pub(super) fn start_new_attribute(&mut self) {
        self.commit_attribute();
        if matches!(self.current_token, Some(Token::EndTag { .. })) {
            self.end_tag_has_attributes = true;
        }
        self.current_attribute = Some(Attribute::new(String::new(), String::new()));
    }

    pub(super) fn append_to_current_attribute_name(&mut self, c: char) {
        if let Some(attribute) = self.current_attribute.as_mut() {
            attribute.name.push(c);
        }
    }

    pub(super) fn append_to_current_attribute_value(&mut self, c: char) {
        if let Some(attribute) = self.current_attribute.as_mut() {
            attribute.value.push(c);
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "When the user agent leaves the attribute name state (and before emitting
    /// the tag token, if appropriate), the complete attribute's name must be
    /// compared to the other attributes on the same token; if there is already
    /// an attribute on the token with the exact same name, then this is a
    /// duplicate-attribute parse error and the new attribute must be removed
    /// from the token."
    pub(super) fn commit_attribute(&mut self) {
        let Some(attribute) = self.current_attribute.take() else {
            return;
        };
        let added = self
            .current_token
            .as_mut()
            .is_none_or(|token| token.push_attribute(attribute));
        if !added {
            self.log_parse_error(ParseErrorCode::DuplicateAttribute);
        }
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl Tokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Parse errors are not fatal. The error is held until the token it
    /// belongs to is queued.
    pub(super) fn log_parse_error(&mut self, code: ParseErrorCode) {
        let position = self.stream.position();
        log::debug!("tokenizer parse error {code} at {position}");
        self.pending_errors.push(ParseError {
            code,
            position,
            vars: ErrorVars::new(),
        });
    }
}
