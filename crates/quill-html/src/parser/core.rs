use quill_dom::{Namespace, QuirksMode};
use strum_macros::Display;

use super::foreign_content::{mathml, svg};
use crate::error::{ErrorSink, ParseErrorCode, vars};
use crate::tokenizer::{Token, Tokenizer, TokenizerState};
use crate::tree_builder::TreeBuilder;

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
///
/// [`Phase::InForeignContent`] is entered when an `<svg>` or `<math>` element
/// is opened. While it is active the HTML rules are applied through the
/// secondary phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    InForeignContent,
}

impl Phase {
    /// Phases where a text token that starts with whitespace is handled as
    /// whitespace first, then as text.
    const fn splits_leading_whitespace(self) -> bool {
        matches!(
            self,
            Self::Initial
                | Self::BeforeHtml
                | Self::BeforeHead
                | Self::InHead
                | Self::InHeadNoscript
                | Self::AfterHead
                | Self::InTable
                | Self::InTableBody
                | Self::InRow
                | Self::InColumnGroup
                | Self::InFrameset
                | Self::AfterFrameset
                | Self::AfterBody
                | Self::AfterAfterBody
                | Self::AfterAfterFrameset
        )
    }
}

/// What the driver does with a token after a phase handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Step {
    /// The token has been consumed.
    Done,
    /// "Reprocess the token" in whatever phase is now current.
    Reprocess,
}

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
///
/// "The list contains elements in the formatting category, and markers."
#[derive(Debug, Clone)]
pub(super) enum FormattingEntry<H> {
    /// A formatting element and the start tag that created it. The token is
    /// compared by the Noah's Ark clause.
    Element {
        /// The element in the tree.
        handle: H,
        /// The original start tag.
        token: Token,
    },
    /// "A marker is an entry in the list of active formatting elements that is
    /// distinct from any element." Pushed for applet, object, marquee, td, th
    /// and caption.
    Marker,
}

impl<H: Copy + Eq> FormattingEntry<H> {
    pub(super) const fn handle(&self) -> Option<H> {
        match self {
            Self::Element { handle, .. } => Some(*handle),
            Self::Marker => None,
        }
    }
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Pulls tokens from its [`Tokenizer`] one at a time and applies the rules of
/// the current [`Phase`], issuing structural commands against a
/// [`TreeBuilder`]. Every parse error goes to the [`ErrorSink`].
pub struct TreeConstructor<B: TreeBuilder, S: ErrorSink> {
    pub(super) tokenizer: Tokenizer,
    pub(super) builder: B,
    pub(super) sink: S,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) phase: Phase,

    /// The HTML insertion mode in force while `phase` is
    /// [`Phase::InForeignContent`].
    pub(super) secondary_phase: Phase,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    ///
    /// "When the insertion mode is switched to "text" or "in table text", the
    /// original insertion mode is also set. This is the insertion mode to which
    /// the tree construction stage will return."
    pub(super) original_phase: Phase,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// "Initially, the stack of open elements is empty. The stack grows
    /// downwards; the topmost node on the stack is the first one added to the
    /// stack, and the bottommost node of the stack is the most recently added
    /// node in the stack."
    pub(super) open_elements: Vec<B::Handle>,

    /// How many HTML `p` elements are on the stack of open elements. Lets the
    /// button-scope check for `p`, made on most start tags, skip the scan.
    pub(super) open_p_elements: usize,

    /// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    pub(super) active_formatting_elements: Vec<FormattingEntry<B::Handle>>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    ///
    /// "Initially, the head element pointer and the form element pointer are
    /// both null."
    pub(super) head_element: Option<B::Handle>,
    pub(super) form_element: Option<B::Handle>,

    /// [§ 13.2.4.5 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    ///
    /// "The frameset-ok flag is set to "ok" when the parser is created. It is
    /// set to "not ok" after certain tokens are seen."
    pub(super) frameset_ok: bool,

    /// Redirects insertions out of a table into its foster parent.
    pub(super) insert_from_table: bool,

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// The context element. It is never inserted into the tree.
    pub(super) context_element: Option<B::Handle>,

    /// MathML `annotation-xml` elements whose encoding makes them HTML
    /// integration points.
    pub(super) html_integration_points: Vec<B::Handle>,

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    ///
    /// "The scripting flag is set to "enabled" if scripting was enabled for the
    /// Document with which the parser is associated when the parser was created,
    /// and "disabled" otherwise."
    pub(super) scripting: bool,

    /// Set after `<pre>`, `<listing>` and `<textarea>`: "If the next token is a
    /// U+000A LINE FEED (LF) character token, then ignore that token".
    pub(super) ignore_linefeed: bool,

    /// The document's mode as decided by the DOCTYPE.
    pub(super) quirks_mode: QuirksMode,

    /// Whether the start tag being processed had its self-closing flag
    /// acknowledged.
    self_closing_acknowledged: bool,

    stopped: bool,
}

impl<B: TreeBuilder, S: ErrorSink> TreeConstructor<B, S> {
    /// Create a tree constructor for a whole document.
    pub fn new(input: &str, builder: B, sink: S) -> Self {
        Self {
            tokenizer: Tokenizer::new(input),
            builder,
            sink,
            phase: Phase::Initial,
            secondary_phase: Phase::InBody,
            original_phase: Phase::InBody,
            open_elements: Vec::new(),
            open_p_elements: 0,
            active_formatting_elements: Vec::new(),
            head_element: None,
            form_element: None,
            frameset_ok: true,
            insert_from_table: false,
            context_element: None,
            html_integration_points: Vec::new(),
            scripting: false,
            ignore_linefeed: false,
            quirks_mode: QuirksMode::NoQuirks,
            self_closing_acknowledged: false,
            stopped: false,
        }
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Create a tree constructor for a fragment parsed as the contents of a
    /// `context` element in `namespace`. The builder's document node becomes
    /// the parent of the parsed nodes.
    pub fn new_fragment(
        input: &str,
        context: &str,
        namespace: Namespace,
        builder: B,
        sink: S,
        scripting: bool,
    ) -> Self {
        let mut parser = Self::new(input, builder, sink).with_scripting(scripting);
        let mut context_name = context.to_ascii_lowercase();
        if namespace == Namespace::Svg
            && let Some(adjusted) = svg::adjust_svg_tag_name(&context_name)
        {
            context_name = adjusted.to_string();
        }

        // "Create a new HTML parser, and associate it with the just created
        // Document node." The context element stands in for the element the
        // fragment will be inserted into.
        let context_element = parser
            .builder
            .create_element(&context_name, namespace, &[]);
        parser.context_element = Some(context_element);

        // "Set the state of the HTML parser's tokenization stage as follows,
        // switching on the context element"
        if namespace == Namespace::Html {
            let state = match context_name.as_str() {
                "title" | "textarea" => TokenizerState::Rcdata,
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => TokenizerState::Rawtext,
                "script" => TokenizerState::ScriptData,
                "noscript" if scripting => TokenizerState::Rawtext,
                "plaintext" => TokenizerState::Plaintext,
                _ => TokenizerState::Data,
            };
            parser.tokenizer.set_state(state);
            parser.tokenizer.set_last_start_tag_name(&context_name);
        }

        // "Let root be the result of creating an html element. Append the
        // element root to the Document node created above. Set up the parser's
        // stack of open elements so that it contains just the single element
        // root."
        let document = parser.builder.document();
        let root = parser.builder.create_element("html", Namespace::Html, &[]);
        parser.builder.append_child(document, root);
        parser.push_open_element(root);

        // "Reset the parser's insertion mode appropriately."
        parser.reset_insertion_mode_appropriately();
        if namespace.is_foreign() {
            parser.enter_foreign_content();
        }
        parser.tokenizer.set_cdata_allowed(namespace.is_foreign());
        parser
    }

    /// Parse `<noscript>` as raw text.
    #[must_use]
    pub const fn with_scripting(mut self, scripting: bool) -> Self {
        self.scripting = scripting;
        self
    }

    /// The phase the next token will be dispatched to.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The stack of open elements, outermost first.
    #[must_use]
    pub fn open_elements(&self) -> &[B::Handle] {
        &self.open_elements
    }

    /// The tree built so far.
    #[must_use]
    pub const fn builder(&self) -> &B {
        &self.builder
    }

    /// [§ 13.2.4.3 Has an element in scope](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
    #[must_use]
    pub fn element_in_scope(&self, name: &str) -> bool {
        self.has_element_in_scope(name)
    }

    /// Run the tokenizer and tree construction to completion.
    pub fn run(&mut self) {
        while self.step() {}
    }

    /// Pull one token and process it. Returns `false` once the end-of-file
    /// token has been processed.
    pub fn step(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        let token = self.tokenizer.next_token();
        for error in self.tokenizer.take_errors() {
            self.sink.report_error(error.code, error.position, error.vars);
        }
        let eof = token.is_eof();
        self.process_token(token);

        // [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
        // "If there is an adjusted current node and it is not an element in the
        // HTML namespace, then switch to the CDATA section start state."
        let foreign = self
            .adjusted_current_node()
            .and_then(|node| self.builder.element_name(node))
            .is_some_and(|(_, namespace)| namespace.is_foreign());
        self.tokenizer.set_cdata_allowed(foreign);

        if eof {
            self.stopped = true;
        }
        !self.stopped
    }

    /// Finish parsing and hand back the tree and the error sink.
    ///
    /// For fragments, the children of the synthetic `<html>` root are moved
    /// to the document fragment node and the root is removed.
    pub fn finish(mut self) -> (B, S) {
        self.run();
        if self.context_element.is_some()
            && let Some(&root) = self.open_elements.first()
        {
            let document = self.builder.document();
            self.builder.reparent_children(root, document);
            self.builder.remove_child(document, root);
        }
        (self.builder, self.sink)
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
    ///
    /// Handles one token, re-dispatching it for as long as the phase handlers
    /// ask for it to be reprocessed.
    pub(super) fn process_token(&mut self, token: Token) {
        log::trace!("{} <- {token}", self.phase);
        self.self_closing_acknowledged = false;
        let self_closing = matches!(
            token,
            Token::StartTag {
                self_closing: true,
                ..
            }
        );

        let mut pending = vec![token];
        while let Some(mut token) = pending.pop() {
            if std::mem::take(&mut self.ignore_linefeed) && !self.drop_leading_linefeed(&mut token) {
                continue;
            }
            if let Some(rest) = self.split_leading_whitespace(&mut token) {
                pending.push(rest);
            }
            match self.dispatch(&mut token) {
                Step::Done => {}
                Step::Reprocess => pending.push(token),
            }
        }

        // [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
        // "When a start tag token is emitted with its self-closing flag set, if
        // the flag is not acknowledged when it is processed by the tree
        // construction stage, that is a
        // non-void-html-element-start-tag-with-trailing-solidus parse error."
        if self_closing && !self.self_closing_acknowledged {
            self.parse_error(ParseErrorCode::NonVoidHtmlElementStartTagWithTrailingSolidus);
        }
    }

    /// Drops a U+000A at the start of a text token. Returns `false` when
    /// nothing is left of the token.
    fn drop_leading_linefeed(&mut self, token: &mut Token) -> bool {
        if let Token::Character { data } | Token::SpaceCharacters { data } = token
            && data.starts_with('\n')
        {
            let _ = data.remove(0);
            return !data.is_empty();
        }
        true
    }

    /// Splits `Character` data that starts with whitespace (which happens for
    /// character references and RCDATA) so the whitespace is handled by the
    /// phase's whitespace rules. Returns the remainder to process next.
    fn split_leading_whitespace(&self, token: &mut Token) -> Option<Token> {
        if !self.phase.splits_leading_whitespace() {
            return None;
        }
        let Token::Character { data } = token else {
            return None;
        };
        let split = data
            .find(|c: char| !matches!(c, ' ' | '\t' | '\n' | '\x0C'))
            .unwrap_or(data.len());
        if split == 0 {
            return None;
        }
        let rest = data.split_off(split);
        *token = Token::SpaceCharacters {
            data: std::mem::take(data),
        };
        (!rest.is_empty()).then_some(Token::Character { data: rest })
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    fn dispatch(&mut self, token: &mut Token) -> Step {
        match self.phase {
            Phase::InForeignContent => self.handle_in_foreign_content(token),
            phase => self.dispatch_html(phase, token),
        }
    }

    /// Applies the HTML rules of `phase` to a token.
    pub(super) fn dispatch_html(&mut self, phase: Phase, token: &mut Token) -> Step {
        match phase {
            Phase::Initial => self.handle_initial(token),
            Phase::BeforeHtml => self.handle_before_html(token),
            Phase::BeforeHead => self.handle_before_head(token),
            Phase::InHead => self.handle_in_head(token),
            Phase::InHeadNoscript => self.handle_in_head_noscript(token),
            Phase::AfterHead => self.handle_after_head(token),
            Phase::InBody | Phase::InForeignContent => self.handle_in_body(token),
            Phase::Text => self.handle_text(token),
            Phase::InTable => self.handle_in_table(token),
            Phase::InCaption => self.handle_in_caption(token),
            Phase::InColumnGroup => self.handle_in_column_group(token),
            Phase::InTableBody => self.handle_in_table_body(token),
            Phase::InRow => self.handle_in_row(token),
            Phase::InCell => self.handle_in_cell(token),
            Phase::InSelect => self.handle_in_select(token),
            Phase::InSelectInTable => self.handle_in_select_in_table(token),
            Phase::AfterBody => self.handle_after_body(token),
            Phase::InFrameset => self.handle_in_frameset(token),
            Phase::AfterFrameset => self.handle_after_frameset(token),
            Phase::AfterAfterBody => self.handle_after_after_body(token),
            Phase::AfterAfterFrameset => self.handle_after_after_frameset(token),
        }
    }

    /// "the current insertion mode": the HTML phase even while foreign
    /// content is being parsed.
    pub(super) const fn current_mode(&self) -> Phase {
        match self.phase {
            Phase::InForeignContent => self.secondary_phase,
            phase => phase,
        }
    }

    /// "Switch the insertion mode to ..."
    ///
    /// While in foreign content the secondary phase is switched instead.
    pub(super) fn switch_to(&mut self, phase: Phase) {
        log::trace!("phase {} -> {phase}", self.current_mode());
        if self.phase == Phase::InForeignContent {
            self.secondary_phase = phase;
        } else {
            self.phase = phase;
        }
    }

    /// Starts parsing foreign content on top of the current HTML phase.
    pub(super) fn enter_foreign_content(&mut self) {
        if self.phase != Phase::InForeignContent {
            log::trace!("phase {} -> {}", self.phase, Phase::InForeignContent);
            self.secondary_phase = self.phase;
            self.phase = Phase::InForeignContent;
        }
    }

    /// Returns to the secondary phase once no SVG or MathML element is open.
    pub(super) fn leave_foreign_content_if_done(&mut self) {
        if self.phase != Phase::InForeignContent {
            return;
        }
        let context_is_foreign = self
            .context_element
            .and_then(|context| self.builder.element_name(context))
            .is_some_and(|(_, namespace)| namespace.is_foreign());
        let foreign_open = self.open_elements.iter().any(|&node| {
            self.builder
                .element_name(node)
                .is_some_and(|(_, namespace)| namespace.is_foreign())
        });
        if !context_is_foreign && !foreign_open {
            log::trace!("phase {} -> {}", self.phase, self.secondary_phase);
            self.phase = self.secondary_phase;
        }
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// "As each token is emitted from the tokenizer, the user agent must follow
    /// the appropriate steps from the following list":
    /// whether the token is processed by the HTML rules of the current
    /// insertion mode rather than the rules for foreign content.
    pub(super) fn uses_html_rules(&self, token: &Token) -> bool {
        // "If the stack of open elements is empty"
        let Some(node) = self.adjusted_current_node() else {
            return true;
        };
        let Some((name, namespace)) = self.builder.element_name(node) else {
            return true;
        };
        let start_tag = match token {
            Token::StartTag { name, .. } => Some(name.as_str()),
            _ => None,
        };
        match namespace {
            // "If the adjusted current node is an element in the HTML namespace"
            Namespace::Html => true,
            Namespace::MathMl => {
                // "If the adjusted current node is a MathML text integration
                // point and the token is a start tag whose tag name is neither
                // "mglyph" nor "malignmark"" / "...and the token is a character
                // token"
                if mathml::is_text_integration_point(name)
                    && (token.is_text()
                        || start_tag.is_some_and(|tag| !matches!(tag, "mglyph" | "malignmark")))
                {
                    return true;
                }
                // "If the adjusted current node is a MathML annotation-xml
                // element and the token is a start tag whose tag name is "svg""
                if name == "annotation-xml" && start_tag == Some("svg") {
                    return true;
                }
                (self.html_integration_points.contains(&node)
                    && (start_tag.is_some() || token.is_text()))
                    || token.is_eof()
            }
            // "If the adjusted current node is an HTML integration point and the
            // token is a start tag" / "...and the token is a character token"
            Namespace::Svg => {
                (svg::is_html_integration_point(name) && (start_tag.is_some() || token.is_text()))
                    || token.is_eof()
            }
        }
    }

    /// "acknowledge the token's self-closing flag"
    pub(super) const fn acknowledge_self_closing(&mut self) {
        self.self_closing_acknowledged = true;
    }

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    pub(super) fn parse_error(&mut self, code: ParseErrorCode) {
        self.parse_error_with(code, &[]);
    }

    /// Reports a parse error carrying named variables such as `name`.
    pub(super) fn parse_error_with(&mut self, code: ParseErrorCode, pairs: &[(&str, &str)]) {
        let position = self.tokenizer.position();
        log::debug!("parse error {code} at {position} in {}", self.phase);
        self.sink.report_error(code, position, vars(pairs));
    }

    /// Stops the parser after the current token.
    pub(super) const fn stop_parsing(&mut self) {
        self.stopped = true;
    }
}
