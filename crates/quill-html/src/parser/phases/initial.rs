use quill_dom::{Namespace, QuirksMode};

use crate::error::{ErrorSink, ParseErrorCode};
use crate::parser::core::{Phase, Step, TreeConstructor};
use crate::tokenizer::{Attribute, Token};
use crate::tree_builder::TreeBuilder;

/// [§ 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
///
/// "The public identifier starts with: ..." (quirks mode).
const QUIRKS_PUBLIC_ID_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

/// "The public identifier is set to: ..." (quirks mode).
const QUIRKS_PUBLIC_IDS: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

/// Public identifiers that select quirks mode when the system identifier is
/// missing and limited-quirks mode when it is present.
const HTML401_PUBLIC_ID_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

/// "The public identifier starts with: ..." (limited-quirks mode).
const LIMITED_QUIRKS_PUBLIC_ID_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

/// [§ 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
///
/// The document mode selected by a DOCTYPE token. Identifiers are compared
/// ASCII case-insensitively.
fn quirks_mode_for(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> QuirksMode {
    let public = public_id.map(str::to_ascii_lowercase);
    let system = system_id.map(str::to_ascii_lowercase);
    let public_starts_with =
        |prefixes: &[&str]| public.as_deref().is_some_and(|id| prefixes.iter().any(|p| id.starts_with(p)));

    if force_quirks
        || name != Some("html")
        || public.as_deref().is_some_and(|id| QUIRKS_PUBLIC_IDS.contains(&id))
        || system.as_deref() == Some("http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd")
        || public_starts_with(QUIRKS_PUBLIC_ID_PREFIXES)
        || (system.is_none() && public_starts_with(HTML401_PUBLIC_ID_PREFIXES))
    {
        QuirksMode::Quirks
    } else if public_starts_with(LIMITED_QUIRKS_PUBLIC_ID_PREFIXES)
        || (system.is_some() && public_starts_with(HTML401_PUBLIC_ID_PREFIXES))
    {
        QuirksMode::LimitedQuirks
    } else {
        QuirksMode::NoQuirks
    }
}

impl<B: TreeBuilder, S: ErrorSink> TreeConstructor<B, S> {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(in crate::parser) fn handle_initial(&mut self, token: &mut Token) -> Step {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::SpaceCharacters { .. } => Step::Done,

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                let document = self.builder.document();
                self.insert_comment(data, Some(document));
                Step::Done
            }

            // "A DOCTYPE token"
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                // "If the DOCTYPE token's name is not "html", or the token's
                // public identifier is not missing, or the token's system
                // identifier is neither missing nor "about:legacy-compat", then
                // there is a parse error."
                if name.as_deref() != Some("html")
                    || public_identifier.is_some()
                    || system_identifier
                        .as_deref()
                        .is_some_and(|id| id != "about:legacy-compat")
                {
                    self.parse_error_with(
                        ParseErrorCode::UnknownDoctype,
                        &[("name", name.as_deref().unwrap_or_default())],
                    );
                }

                // "Append a DocumentType node to the Document node, with its
                // name set to the name given in the DOCTYPE token, or the empty
                // string if the name was missing; its public ID set to the
                // public identifier given in the DOCTYPE token, or the empty
                // string if the public identifier was missing; and its system
                // ID set to the system identifier given in the DOCTYPE token,
                // or the empty string if the system identifier was missing."
                self.builder.append_doctype(
                    name.as_deref().unwrap_or_default(),
                    public_identifier.as_deref().unwrap_or_default(),
                    system_identifier.as_deref().unwrap_or_default(),
                );

                let mode = quirks_mode_for(
                    name.as_deref(),
                    public_identifier.as_deref(),
                    system_identifier.as_deref(),
                    *force_quirks,
                );
                self.set_quirks_mode(mode);

                // "Then, switch the insertion mode to "before html"."
                self.switch_to(Phase::BeforeHtml);
                Step::Done
            }

            // "Anything else"
            // "If the document is not an iframe srcdoc document, then this is a
            // parse error; if the parser cannot change the mode flag is false,
            // set the Document to quirks mode."
            // "In any case, switch the insertion mode to "before html", then
            // reprocess the token."
            _ => {
                let code = match token {
                    Token::StartTag { .. } => ParseErrorCode::ExpectedDoctypeButGotStartTag,
                    Token::EndTag { .. } => ParseErrorCode::ExpectedDoctypeButGotEndTag,
                    Token::EndOfFile => ParseErrorCode::ExpectedDoctypeButGotEof,
                    _ => ParseErrorCode::ExpectedDoctypeButGotChars,
                };
                self.parse_error(code);
                self.set_quirks_mode(QuirksMode::Quirks);
                self.switch_to(Phase::BeforeHtml);
                Step::Reprocess
            }
        }
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        log::trace!("document mode {mode}");
        self.quirks_mode = mode;
        self.builder.set_quirks_mode(mode);
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(in crate::parser) fn handle_before_html(&mut self, token: &mut Token) -> Step {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => {
                self.parse_error(ParseErrorCode::UnexpectedDoctype);
                Step::Done
            }

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                let document = self.builder.document();
                self.insert_comment(data, Some(document));
                Step::Done
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION..."
            // "Ignore the token."
            Token::SpaceCharacters { .. } => Step::Done,

            // "A start tag whose tag name is "html""
            // "Create an element for the token in the HTML namespace, with the
            // Document as the intended parent. Append it to the Document
            // object. Put this element in the stack of open elements."
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                self.insert_root_element(attributes);
                Step::Done
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error_with(ParseErrorCode::UnexpectedEndTagBeforeHtml, &[("name", name.as_str())]);
                Step::Done
            }

            // "Anything else"
            // "Create an html element whose node document is the Document
            // object. Append it to the Document object. Put this element in the
            // stack of open elements. Switch the insertion mode to "before
            // head", then reprocess the token."
            _ => {
                self.insert_root_element(&[]);
                Step::Reprocess
            }
        }
    }

    fn insert_root_element(&mut self, attributes: &[Attribute]) {
        let document = self.builder.document();
        let html = self.builder.create_element("html", Namespace::Html, attributes);
        self.builder.append_child(document, html);
        self.push_open_element(html);
        // "Switch the insertion mode to "before head"."
        self.switch_to(Phase::BeforeHead);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(in crate::parser) fn handle_before_head(&mut self, token: &mut Token) -> Step {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION..."
            // "Ignore the token."
            Token::SpaceCharacters { .. } => Step::Done,

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

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body(token),

            // "A start tag whose tag name is "head""
            // "Insert an HTML element for the token. Set the head element
            // pointer to the newly created head element. Switch the insertion
            // mode to "in head"."
            Token::StartTag {
                name, attributes, ..
            } if name == "head" => {
                let head = self.insert_html_element("head", attributes);
                self.head_element = Some(head);
                self.switch_to(Phase::InHead);
                Step::Done
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error_with(ParseErrorCode::UnexpectedEndTag, &[("name", name.as_str())]);
                Step::Done
            }

            // "Anything else"
            // "Insert an HTML element for a "head" start tag token with no
            // attributes. Set the head element pointer to the newly created
            // head element. Switch the insertion mode to "in head". Reprocess
            // the current token."
            _ => {
                let head = self.insert_html_element("head", &[]);
                self.head_element = Some(head);
                self.switch_to(Phase::InHead);
                Step::Reprocess
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html5_doctype_is_no_quirks() {
        assert_eq!(
            quirks_mode_for(Some("html"), None, None, false),
            QuirksMode::NoQuirks
        );
    }

    #[test]
    fn missing_or_forced_doctype_is_quirks() {
        assert_eq!(quirks_mode_for(None, None, None, false), QuirksMode::Quirks);
        assert_eq!(
            quirks_mode_for(Some("html"), None, None, true),
            QuirksMode::Quirks
        );
    }

    #[test]
    fn html401_transitional_depends_on_system_identifier() {
        let public = Some("-//W3C//DTD HTML 4.01 Transitional//EN");
        assert_eq!(
            quirks_mode_for(Some("html"), public, None, false),
            QuirksMode::Quirks
        );
        assert_eq!(
            quirks_mode_for(
                Some("html"),
                public,
                Some("http://www.w3.org/TR/html4/loose.dtd"),
                false
            ),
            QuirksMode::LimitedQuirks
        );
    }

    #[test]
    fn xhtml_transitional_is_limited_quirks() {
        assert_eq!(
            quirks_mode_for(
                Some("html"),
                Some("-//W3C//DTD XHTML 1.0 Transitional//EN"),
                None,
                false
            ),
            QuirksMode::LimitedQuirks
        );
    }
}
