//! Parse errors, the error sink, and the crate error type.
//!
//! [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
//!
//! "This specification defines the parsing rules for HTML documents, whether
//! they are syntactically correct or not. Certain points in the parsing
//! algorithm are said to be parse errors. The error handling for parse errors
//! is well-defined."
//!
//! Parse errors never stop the parser. They are handed to an [`ErrorSink`]
//! in input order, together with the recovery the parser already performed.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter, IntoStaticStr};
use thiserror::Error;

/// Named variables attached to a parse error (`name`, `expectedName`, ...).
pub type ErrorVars = BTreeMap<String, String>;

/// Every anomaly the tokenizer or tree constructor can report.
///
/// The kebab-case form (`Display`, `AsRef<str>`, serde) is the stable error
/// code. Tokenizer codes follow the WHATWG names; tree construction codes
/// follow the html5lib conformance fixtures.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, IntoStaticStr, EnumIter, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorCode {
    // ----- input stream -----
    /// A control character other than whitespace or NULL in the input.
    ControlCharacterInInputStream,
    /// A Unicode noncharacter in the input.
    NoncharacterInInputStream,

    // ----- tokenizer -----
    /// `<!---->`-style comment closed with `>` right after the opening.
    AbruptClosingOfEmptyComment,
    /// `>` inside a DOCTYPE public identifier.
    AbruptDoctypePublicIdentifier,
    /// `>` inside a DOCTYPE system identifier.
    AbruptDoctypeSystemIdentifier,
    /// `&#` or `&#x` with no digits.
    AbsenceOfDigitsInNumericCharacterReference,
    /// `<![CDATA[` outside foreign content.
    CdataInHtmlContent,
    /// Numeric reference above U+10FFFF.
    CharacterReferenceOutsideUnicodeRange,
    /// Numeric reference to a control character.
    ControlCharacterReference,
    /// An attribute name repeated on the same tag; the later one is dropped.
    DuplicateAttribute,
    /// An end tag carrying attributes.
    EndTagWithAttributes,
    /// An end tag with a `/` before `>`.
    EndTagWithTrailingSolidus,
    /// `<` immediately followed by end of input.
    EofBeforeTagName,
    /// End of input inside a CDATA section.
    EofInCdata,
    /// End of input inside a comment.
    EofInComment,
    /// End of input inside a DOCTYPE.
    EofInDoctype,
    /// End of input inside `<!--` in script data.
    EofInScriptHtmlCommentLikeText,
    /// End of input inside a tag.
    EofInTag,
    /// Comment closed with `--!>`.
    IncorrectlyClosedComment,
    /// `<!` not followed by `--`, `DOCTYPE` or `[CDATA[`.
    IncorrectlyOpenedComment,
    /// Garbage after the DOCTYPE name.
    InvalidCharacterSequenceAfterDoctypeName,
    /// `<` followed by a character that cannot start a tag name.
    InvalidFirstCharacterOfTagName,
    /// `name=` followed by `>`.
    MissingAttributeValue,
    /// `<!DOCTYPE>` with no name.
    MissingDoctypeName,
    /// `PUBLIC` keyword without an identifier.
    MissingDoctypePublicIdentifier,
    /// `SYSTEM` keyword without an identifier.
    MissingDoctypeSystemIdentifier,
    /// `</>`.
    MissingEndTagName,
    /// Public identifier not quoted.
    MissingQuoteBeforeDoctypePublicIdentifier,
    /// System identifier not quoted.
    MissingQuoteBeforeDoctypeSystemIdentifier,
    /// Character reference without the terminating `;`.
    MissingSemicolonAfterCharacterReference,
    /// `PUBLIC"` without whitespace.
    MissingWhitespaceAfterDoctypePublicKeyword,
    /// `SYSTEM"` without whitespace.
    MissingWhitespaceAfterDoctypeSystemKeyword,
    /// `<!DOCTYPEhtml>`.
    MissingWhitespaceBeforeDoctypeName,
    /// `a="1"b="2"`.
    MissingWhitespaceBetweenAttributes,
    /// Public and system identifiers not separated by whitespace.
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
    /// `<!--` inside a comment.
    NestedComment,
    /// Numeric reference to a noncharacter.
    NoncharacterCharacterReference,
    /// Self-closing syntax on an HTML element that is not void.
    NonVoidHtmlElementStartTagWithTrailingSolidus,
    /// `&#0;`.
    NullCharacterReference,
    /// Numeric reference to a surrogate.
    SurrogateCharacterReference,
    /// Garbage after the DOCTYPE system identifier.
    UnexpectedCharacterAfterDoctypeSystemIdentifier,
    /// `"`, `'` or `<` in an attribute name.
    UnexpectedCharacterInAttributeName,
    /// `"`, `'`, `<`, `=` or `` ` `` in an unquoted attribute value.
    UnexpectedCharacterInUnquotedAttributeValue,
    /// `=` where an attribute name should start.
    UnexpectedEqualsSignBeforeAttributeName,
    /// U+0000 in the input.
    UnexpectedNullCharacter,
    /// `<?`.
    UnexpectedQuestionMarkInsteadOfTagName,
    /// `/` inside a tag not followed by `>`.
    UnexpectedSolidusInTag,
    /// `&name;` that matches nothing.
    UnknownNamedCharacterReference,

    // ----- tree construction -----
    /// Text before any DOCTYPE.
    ExpectedDoctypeButGotChars,
    /// Start tag before any DOCTYPE.
    ExpectedDoctypeButGotStartTag,
    /// End tag before any DOCTYPE.
    ExpectedDoctypeButGotEndTag,
    /// End of input before any DOCTYPE.
    ExpectedDoctypeButGotEof,
    /// A DOCTYPE that is not `<!DOCTYPE html>`.
    UnknownDoctype,
    /// A DOCTYPE after the initial phase.
    UnexpectedDoctype,
    /// A start tag not allowed in the current phase.
    UnexpectedStartTag,
    /// A start tag that is ignored in the current phase.
    UnexpectedStartTagIgnored,
    /// An end tag not allowed in the current phase.
    UnexpectedEndTag,
    /// An end tag before the `<html>` element.
    UnexpectedEndTagBeforeHtml,
    /// A start tag that implicitly closes an open element.
    UnexpectedStartTagImpliesEndTag,
    /// An end tag closing an element while others are still open.
    EndTagTooEarly,
    /// An end tag closing an element while another element is current.
    EndTagTooEarlyNamed,
    /// An end tag ignored because its element is not in scope.
    EndTagTooEarlyIgnored,
    /// Adoption agency: the formatting element is not open.
    #[strum(serialize = "adoption-agency-1.1")]
    #[serde(rename = "adoption-agency-1.1")]
    AdoptionAgencyNotOpen,
    /// Adoption agency: the formatting element is not in scope.
    #[strum(serialize = "adoption-agency-1.2")]
    #[serde(rename = "adoption-agency-1.2")]
    AdoptionAgencyNotInScope,
    /// Adoption agency: the formatting element is not the current node.
    #[strum(serialize = "adoption-agency-1.3")]
    #[serde(rename = "adoption-agency-1.3")]
    AdoptionAgencyNotCurrent,
    /// A tag handled as a different tag (`</br>`, `<image>`).
    UnexpectedEndTagTreatedAs,
    /// `<image>` handled as `<img>`.
    UnexpectedStartTagTreatedAs,
    /// End of input with elements still open.
    ExpectedClosingTagButGotEof,
    /// End of input inside a raw text or RCDATA element.
    ExpectedNamedClosingTagButGotEof,
    /// Head content after `</head>`.
    UnexpectedStartTagOutOfMyHead,
    /// A second `<head>`.
    TwoHeadsAreNotBetterThanOne,
    /// Content inside a head `<noscript>` that belongs in the body.
    UnexpectedCharInNoscript,
    /// U+0000 in a text token where it is dropped.
    InvalidCodepoint,
    /// Text in a table that is foster-parented.
    UnexpectedCharImpliesTableVoodoo,
    /// A start tag in a table that is foster-parented.
    UnexpectedStartTagImpliesTableVoodoo,
    /// An end tag in a table handled by the in-body rules.
    UnexpectedEndTagImpliesTableVoodoo,
    /// A table context was cleared by popping elements.
    UnexpectedImpliedEndTagInTable,
    /// `<input type=hidden>` directly inside a table.
    UnexpectedHiddenInputInTable,
    /// `<form>` directly inside a table.
    UnexpectedFormInTable,
    /// End of input inside a table.
    EofInTable,
    /// A cell start tag directly inside a table body.
    UnexpectedCellInTableBody,
    /// A cell end tag for a cell that is not open.
    UnexpectedCellEndTag,
    /// An end tag not allowed in a table body.
    UnexpectedEndTagInTableBody,
    /// An end tag not allowed in a table row.
    UnexpectedEndTagInTableRow,
    /// `<select>` inside `<select>`.
    UnexpectedSelectInSelect,
    /// `<input>`, `<keygen>` or `<textarea>` inside `<select>`.
    UnexpectedInputInSelect,
    /// A start tag not allowed in a select.
    UnexpectedStartTagInSelect,
    /// An end tag not allowed in a select.
    UnexpectedEndTagInSelect,
    /// A table start tag inside a select inside a table.
    UnexpectedTableElementStartTagInSelectInTable,
    /// A table end tag inside a select inside a table.
    UnexpectedTableElementEndTagInSelectInTable,
    /// End of input inside a select.
    EofInSelect,
    /// Non-space text after `</body>`.
    UnexpectedCharAfterBody,
    /// A start tag after `</body>`.
    UnexpectedStartTagAfterBody,
    /// An end tag after `</body>`.
    UnexpectedEndTagAfterBody,
    /// Non-space text inside a frameset.
    UnexpectedCharInFrameset,
    /// A start tag not allowed inside a frameset.
    UnexpectedStartTagInFrameset,
    /// An end tag not allowed inside a frameset.
    UnexpectedEndTagInFrameset,
    /// `</frameset>` closing the fragment root.
    UnexpectedFramesetInFramesetInnerhtml,
    /// End of input inside a frameset.
    EofInFrameset,
    /// Non-space text after `</frameset>`.
    UnexpectedCharAfterFrameset,
    /// A start tag after `</frameset>`.
    UnexpectedStartTagAfterFrameset,
    /// An end tag after `</frameset>`.
    UnexpectedEndTagAfterFrameset,
    /// Text after `</html>`.
    ExpectedEofButGotChar,
    /// A start tag after `</html>`.
    ExpectedEofButGotStartTag,
    /// An end tag after `</html>`.
    ExpectedEofButGotEndTag,
    /// An HTML breakout tag inside SVG or MathML.
    HtmlInForeignContent,
}

/// [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
///
/// A location in the (newline-normalised) input. `line` is 1-based, `col`
/// counts characters consumed on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// Column, 0-based.
    pub col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A single reported parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// Stable error code.
    pub code: ParseErrorCode,
    /// Where in the input the error was detected.
    pub position: Position,
    /// Named variables for message formatting.
    pub vars: ErrorVars,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.code)?;
        for (key, value) in &self.vars {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Receives every parse error detected by the tokenizer and tree constructor.
pub trait ErrorSink {
    /// "reportError(code, position, vars)"
    fn report_error(&mut self, code: ParseErrorCode, position: Position, vars: ErrorVars);
}

impl ErrorSink for Vec<ParseError> {
    fn report_error(&mut self, code: ParseErrorCode, position: Position, vars: ErrorVars) {
        self.push(ParseError {
            code,
            position,
            vars,
        });
    }
}

/// An [`ErrorSink`] that keeps at most `limit` errors and counts the rest.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    errors: Vec<ParseError>,
    limit: Option<usize>,
    dropped: usize,
}

impl ErrorCollector {
    /// Create a collector that keeps at most `limit` errors (`None` keeps all).
    #[must_use]
    pub const fn new(limit: Option<usize>) -> Self {
        Self {
            errors: Vec::new(),
            limit,
            dropped: 0,
        }
    }

    /// Number of errors that were reported but not retained.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// The retained errors, in report order.
    #[must_use]
    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}

impl ErrorSink for ErrorCollector {
    fn report_error(&mut self, code: ParseErrorCode, position: Position, vars: ErrorVars) {
        if self.limit.is_some_and(|limit| self.errors.len() >= limit) {
            self.dropped += 1;
            return;
        }
        self.errors.report_error(code, position, vars);
    }
}

/// Build an [`ErrorVars`] map from string pairs.
#[must_use]
pub fn vars(pairs: &[(&str, &str)]) -> ErrorVars {
    pairs
        .iter()
        .map(|&(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Failures surfaced to a host. The parser itself always completes; these
/// only arise from host-requested policies or invalid arguments.
#[derive(Debug, Error)]
pub enum Error {
    /// Strict parsing was requested and the input produced a parse error.
    #[error("strict parsing failed at {}: {}", .0.position, .0.code)]
    Strict(ParseError),

    /// `parse_fragment` was given an empty context element name.
    #[error("fragment context element name is empty")]
    EmptyContext,
}

/// Result alias for host-facing operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_codes_are_unique_kebab_case() {
        let mut seen = HashSet::new();
        for code in ParseErrorCode::iter() {
            let name: &'static str = code.into();
            assert!(seen.insert(name), "duplicate code {name}");
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "{name} is not kebab-case"
            );
        }
    }

    #[test]
    fn test_collector_drops_past_limit() {
        let mut collector = ErrorCollector::new(Some(2));
        for _ in 0..5 {
            collector.report_error(ParseErrorCode::EofInTag, Position::default(), vars(&[]));
        }
        assert_eq!(collector.dropped(), 3);
        assert_eq!(collector.into_errors().len(), 2);
    }

    #[test]
    fn test_display_includes_vars() {
        let error = ParseError {
            code: ParseErrorCode::UnexpectedEndTag,
            position: Position { line: 3, col: 7 },
            vars: vars(&[("name", "div")]),
        };
        assert_eq!(error.to_string(), "3:7: unexpected-end-tag name=div");
        assert_eq!(
            Error::Strict(error).to_string(),
            "strict parsing failed at 3:7: unexpected-end-tag"
        );
    }
}
