//! WHATWG HTML tokenizer and tree constructor.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Every tokenizer state, including script data escapes and CDATA sections
//!   - Named and numeric character references
//!   - Input stream preprocessing and positions for errors
//!
//! - **Tree Construction** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - All insertion modes except "in template"
//!   - Foster parenting, the adoption agency algorithm and reconstruction of
//!     active formatting elements
//!   - SVG and MathML foreign content
//!   - Quirks mode selection from the DOCTYPE
//!   - Fragment parsing ([§ 13.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments))
//!
//! The parser never fails. Malformed input produces a tree plus an ordered
//! list of [`ParseError`]s. Any backend implementing [`TreeBuilder`] can
//! receive the tree; [`DomTree`] is the default.
//!
//! # Not Yet Implemented
//!
//! - `<template>` contents
//! - Script execution and `document.write()`
//! - Encoding sniffing (input is already decoded)

/// Parse errors, error sinks and the host-facing error type.
pub mod error;
/// HTML tree construction.
pub mod parser;
/// Tree dumps for fixtures and HTML serialization.
pub mod serializer;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;
/// The backend interface the tree constructor builds through.
pub mod tree_builder;

pub use error::{Error, ErrorCollector, ErrorSink, ParseError, ParseErrorCode, Position, Result};
pub use parser::{Phase, TreeConstructor};
pub use serializer::{test_serializer, to_html};
pub use tokenizer::{Attribute, Token, Tokenizer, TokenizerState};
pub use tree_builder::TreeBuilder;

use quill_dom::{DomTree, Namespace, NodeId};

/// Parser configuration.
///
/// ```
/// use quill_html::ParserOptions;
///
/// let options = ParserOptions::new().with_scripting(true).with_max_errors(Some(10));
/// assert!(options.scripting);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    /// Make the `*_strict` entry points fail on the first parse error.
    pub strict: bool,
    /// Keep at most this many errors. Parsing is unaffected.
    pub max_errors: Option<usize>,
    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#other-parsing-state-flags)
    /// "The scripting flag is set to "enabled" if scripting was enabled for the
    /// Document with which the parser is associated when the parser was
    /// created, and "disabled" otherwise."
    pub scripting: bool,
}

impl ParserOptions {
    /// Default options: lenient, unlimited errors, scripting disabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strict: false,
            max_errors: None,
            scripting: false,
        }
    }

    /// Set strict mode.
    #[must_use]
    pub const fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Cap the number of retained errors.
    #[must_use]
    pub const fn with_max_errors(mut self, max_errors: Option<usize>) -> Self {
        self.max_errors = max_errors;
        self
    }

    /// Set the scripting flag.
    #[must_use]
    pub const fn with_scripting(mut self, scripting: bool) -> Self {
        self.scripting = scripting;
        self
    }
}

/// Parses documents and fragments into a [`DomTree`] with a fixed set of
/// [`ParserOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    /// Create a parser with the given options.
    #[must_use]
    pub const fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// The options this parser was created with.
    #[must_use]
    pub const fn options(&self) -> ParserOptions {
        self.options
    }

    /// [§ 13.2 Parsing HTML documents](https://html.spec.whatwg.org/multipage/parsing.html#parsing)
    ///
    /// Parse a whole document. Always produces a tree.
    #[must_use]
    pub fn parse_document(&self, input: &str) -> (DomTree, Vec<ParseError>) {
        log::debug!("parsing document ({} bytes)", input.len());
        let sink = ErrorCollector::new(self.options.max_errors);
        let constructor = TreeConstructor::new(input, DomTree::new(), sink)
            .with_scripting(self.options.scripting);
        let (tree, sink) = constructor.finish();
        (tree, sink.into_errors())
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Parse `input` as the contents of a `context` element. The context is an
    /// HTML tag name, or `"svg name"` / `"math name"` for a foreign element.
    /// Returns the fragment tree, the top-level nodes of the fragment and the
    /// errors.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContext`] if `context` names no element.
    pub fn parse_fragment(
        &self,
        input: &str,
        context: &str,
    ) -> Result<(DomTree, Vec<NodeId>, Vec<ParseError>)> {
        let (namespace, name) = split_context(context)?;
        log::debug!("parsing fragment in <{name}> ({} bytes)", input.len());
        let sink = ErrorCollector::new(self.options.max_errors);
        let constructor = TreeConstructor::new_fragment(
            input,
            name,
            namespace,
            DomTree::new_fragment(),
            sink,
            self.options.scripting,
        );
        let (tree, sink) = constructor.finish();
        let nodes = tree.children(tree.root()).to_vec();
        Ok((tree, nodes, sink.into_errors()))
    }

    /// Like [`Parser::parse_document`], but in strict mode the first parse
    /// error becomes an [`Error::Strict`].
    ///
    /// # Errors
    ///
    /// [`Error::Strict`] if strict mode is on and the input had a parse error.
    pub fn parse_document_strict(&self, input: &str) -> Result<DomTree> {
        let (tree, errors) = self.parse_document(input);
        self.check_strict(errors)?;
        Ok(tree)
    }

    /// Like [`Parser::parse_fragment`], but in strict mode the first parse
    /// error becomes an [`Error::Strict`].
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContext`] for an empty context, [`Error::Strict`] if strict
    /// mode is on and the input had a parse error.
    pub fn parse_fragment_strict(
        &self,
        input: &str,
        context: &str,
    ) -> Result<(DomTree, Vec<NodeId>)> {
        let (tree, nodes, errors) = self.parse_fragment(input, context)?;
        self.check_strict(errors)?;
        Ok((tree, nodes))
    }

    fn check_strict(&self, errors: Vec<ParseError>) -> Result<()> {
        if !self.options.strict {
            return Ok(());
        }
        match errors.into_iter().next() {
            Some(first) => Err(Error::Strict(first)),
            None => Ok(()),
        }
    }
}

/// Splits `"svg foreignObject"` into its namespace and local name. A bare
/// name is an HTML element.
fn split_context(context: &str) -> Result<(Namespace, &str)> {
    let context = context.trim();
    let (namespace, name) = match context.split_once(' ') {
        Some(("svg", name)) => (Namespace::Svg, name.trim()),
        Some(("math", name)) => (Namespace::MathMl, name.trim()),
        _ => (Namespace::Html, context),
    };
    if name.is_empty() {
        return Err(Error::EmptyContext);
    }
    Ok((namespace, name))
}

/// Parse a whole document with default options.
///
/// ```
/// let (tree, errors) = quill_html::parse_document("<!DOCTYPE html><p>Hello");
/// assert!(errors.is_empty());
/// assert!(tree.body().is_some());
/// ```
#[must_use]
pub fn parse_document(input: &str) -> (DomTree, Vec<ParseError>) {
    Parser::default().parse_document(input)
}

/// Parse a fragment in the given context element with default options.
///
/// ```
/// let (tree, nodes, _) = quill_html::parse_fragment("hello", "td").unwrap();
/// assert_eq!(nodes.len(), 1);
/// assert_eq!(tree.as_text(nodes[0]), Some("hello"));
/// ```
///
/// # Errors
///
/// [`Error::EmptyContext`] if `context` is empty.
pub fn parse_fragment(input: &str, context: &str) -> Result<(DomTree, Vec<NodeId>, Vec<ParseError>)> {
    Parser::default().parse_fragment(input, context)
}
