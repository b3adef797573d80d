//! Integration tests for the HTML tokenizer.

use quill_html::{ParseError, ParseErrorCode, Token, Tokenizer, TokenizerState};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).collect()
}

/// Helper to tokenize a string and return the tokens and the errors
fn tokenize_with_errors(input: &str) -> (Vec<Token>, Vec<ParseError>) {
    let mut tokenizer = Tokenizer::new(input);
    let tokens = tokenizer.by_ref().collect();
    (tokens, tokenizer.take_errors())
}

fn codes(errors: &[ParseError]) -> Vec<ParseErrorCode> {
    errors.iter().map(|error| error.code).collect()
}

fn text(data: &str) -> Token {
    Token::Character {
        data: data.to_string(),
    }
}

fn space(data: &str) -> Token {
    Token::SpaceCharacters {
        data: data.to_string(),
    }
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens, vec![text("Hello"), Token::EndOfFile]);
}

#[test]
fn test_whitespace_runs_are_separate_tokens() {
    let tokens = tokenize("Hi  there\n");
    assert_eq!(
        tokens,
        vec![
            text("Hi"),
            space("  "),
            text("there"),
            space("\n"),
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_iterator_yields_one_eof() {
    let mut tokenizer = Tokenizer::new("");
    assert_eq!(tokenizer.next(), Some(Token::EndOfFile));
    assert_eq!(tokenizer.next(), None);
    assert_eq!(tokenizer.next_token(), Token::EndOfFile);
}

#[test]
fn test_doctype() {
    let (tokens, errors) = tokenize_with_errors("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2); // DOCTYPE + EOF
    match &tokens[0] {
        Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert!(public_identifier.is_none());
            assert!(system_identifier.is_none());
            assert!(!force_quirks);
        }
        _ => panic!("Expected DOCTYPE token"),
    }
    assert!(errors.is_empty());
}

#[test]
fn test_doctype_with_identifiers() {
    let tokens = tokenize(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
    );
    match &tokens[0] {
        Token::Doctype {
            public_identifier,
            system_identifier,
            force_quirks,
            ..
        } => {
            assert_eq!(public_identifier.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
            assert_eq!(
                system_identifier.as_deref(),
                Some("http://www.w3.org/TR/html4/strict.dtd")
            );
            assert!(!force_quirks);
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_without_name_forces_quirks() {
    let (tokens, errors) = tokenize_with_errors("<!DOCTYPE>");
    assert!(matches!(
        &tokens[0],
        Token::Doctype {
            name: None,
            force_quirks: true,
            ..
        }
    ));
    assert_eq!(codes(&errors), vec![ParseErrorCode::MissingDoctypeName]);
}

#[test]
fn test_start_tag() {
    let tokens = tokenize("<DIV>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::StartTag {
            name,
            self_closing,
            attributes,
        } => {
            assert_eq!(name, "div");
            assert!(!self_closing);
            assert!(attributes.is_empty());
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_end_tag() {
    let tokens = tokenize("</div>");
    assert_eq!(tokens.len(), 2);
    assert!(matches!(&tokens[0], Token::EndTag { name } if name == "div"));
}

#[test]
fn test_self_closing_tag() {
    let (tokens, errors) = tokenize_with_errors("<br/>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::StartTag {
            name, self_closing, ..
        } => {
            assert_eq!(name, "br");
            assert!(self_closing);
        }
        _ => panic!("Expected self-closing StartTag token"),
    }
    assert!(errors.is_empty());
}

#[test]
fn test_end_tag_with_attributes_and_solidus() {
    let (tokens, errors) = tokenize_with_errors("</div class=x></p/>");
    assert!(matches!(&tokens[0], Token::EndTag { name } if name == "div"));
    assert!(matches!(&tokens[1], Token::EndTag { name } if name == "p"));
    assert_eq!(
        codes(&errors),
        vec![
            ParseErrorCode::EndTagWithAttributes,
            ParseErrorCode::EndTagWithTrailingSolidus
        ]
    );
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hello -->");
    assert_eq!(tokens.len(), 2);
    assert!(matches!(&tokens[0], Token::Comment { data } if data == " hello "));
}

#[test]
fn test_bogus_comment() {
    let (tokens, errors) = tokenize_with_errors("<?xml version?>");
    assert!(matches!(&tokens[0], Token::Comment { data } if data == "?xml version?"));
    assert_eq!(
        codes(&errors),
        vec![ParseErrorCode::UnexpectedQuestionMarkInsteadOfTagName]
    );
}

#[test]
fn test_attribute_quoting_styles() {
    let tokens = tokenize(r#"<div a="1" b='2' c=3 d>"#);
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            let pairs: Vec<(&str, &str)> = attributes
                .iter()
                .map(|attr| (attr.name.as_str(), attr.value.as_str()))
                .collect();
            assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("c", "3"), ("d", "")]);
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let (tokens, errors) = tokenize_with_errors(r#"<p id="a" ID="b">"#);
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes.len(), 1);
            assert_eq!(attributes[0].value, "a");
        }
        _ => panic!("Expected StartTag token"),
    }
    assert_eq!(codes(&errors), vec![ParseErrorCode::DuplicateAttribute]);
}

#[test]
fn test_named_character_reference_in_text() {
    let (tokens, errors) = tokenize_with_errors("a&amp;b&lt;");
    assert_eq!(tokens, vec![text("a&b<"), Token::EndOfFile]);
    assert!(errors.is_empty());
}

#[test]
fn test_html5_named_references_in_text() {
    let (tokens, errors) = tokenize_with_errors("&rightarrow;&bigstar;&NotEqualTilde;");
    assert_eq!(
        tokens,
        vec![text("\u{2192}\u{2605}\u{2242}\u{338}"), Token::EndOfFile]
    );
    assert!(errors.is_empty());
}

#[test]
fn test_legacy_reference_without_semicolon() {
    let (tokens, errors) = tokenize_with_errors("&copy 2024");
    assert_eq!(tokens[0], text("\u{A9}"));
    assert_eq!(
        codes(&errors),
        vec![ParseErrorCode::MissingSemicolonAfterCharacterReference]
    );
}

#[test]
fn test_reference_in_attribute_followed_by_equals_is_literal() {
    let (tokens, errors) = tokenize_with_errors(r#"<a href="?x=1&amp=2&lt;">"#);
    assert_eq!(tokens[0].attribute("href"), Some("?x=1&amp=2<"));
    assert!(errors.is_empty());
}

#[test]
fn test_numeric_character_references() {
    let (tokens, errors) = tokenize_with_errors("&#65;&#x42;&#x80;&#0;&#x110000;");
    assert_eq!(tokens[0], text("AB\u{20AC}\u{FFFD}\u{FFFD}"));
    assert_eq!(
        codes(&errors),
        vec![
            ParseErrorCode::ControlCharacterReference,
            ParseErrorCode::NullCharacterReference,
            ParseErrorCode::CharacterReferenceOutsideUnicodeRange,
        ]
    );
}

#[test]
fn test_numeric_reference_without_digits() {
    let (tokens, errors) = tokenize_with_errors("&#;");
    assert_eq!(tokens[0], text("&#;"));
    assert_eq!(
        codes(&errors),
        vec![ParseErrorCode::AbsenceOfDigitsInNumericCharacterReference]
    );
}

#[test]
fn test_newlines_are_normalized() {
    let tokens = tokenize("a\r\nb\rc");
    assert_eq!(
        tokens,
        vec![
            text("a"),
            space("\n"),
            text("b"),
            space("\n"),
            text("c"),
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_error_position_tracks_lines() {
    let (_, errors) = tokenize_with_errors("one\ntwo &#0;");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].position.line, 2);
}

#[test]
fn test_rcdata_state_set_by_consumer() {
    let mut tokenizer = Tokenizer::new("a<b>&amp;</title>");
    tokenizer.set_state(TokenizerState::Rcdata);
    tokenizer.set_last_start_tag_name("title");
    let tokens: Vec<Token> = tokenizer.collect();
    assert_eq!(
        tokens,
        vec![
            text("a<b>&"),
            Token::EndTag {
                name: "title".to_string()
            },
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_script_data_ignores_other_end_tags() {
    let mut tokenizer = Tokenizer::new("if (a</b) {}</script>");
    tokenizer.set_state(TokenizerState::ScriptData);
    tokenizer.set_last_start_tag_name("script");
    let tokens: Vec<Token> = tokenizer.collect();
    assert_eq!(tokens[0], text("if (a</b) {}"));
    assert!(matches!(&tokens[1], Token::EndTag { name } if name == "script"));
}

#[test]
fn test_cdata_only_in_foreign_content() {
    let (tokens, errors) = tokenize_with_errors("<![CDATA[x]]>");
    assert!(matches!(&tokens[0], Token::Comment { data } if data == "[CDATA[x]]"));
    assert_eq!(codes(&errors), vec![ParseErrorCode::CdataInHtmlContent]);

    let mut tokenizer = Tokenizer::new("<![CDATA[x<y]]>");
    tokenizer.set_cdata_allowed(true);
    let tokens: Vec<Token> = tokenizer.collect();
    assert_eq!(tokens[0], text("x<y"));
}

#[test]
fn test_eof_in_tag_drops_tag() {
    let (tokens, errors) = tokenize_with_errors("<div class=");
    assert_eq!(tokens, vec![Token::EndOfFile]);
    assert_eq!(codes(&errors), vec![ParseErrorCode::EofInTag]);
}

#[test]
fn test_simple_html_document() {
    let html = r"<!DOCTYPE html>
<html>
<head><title>Test</title></head>
<body>Hello</body>
</html>";
    let tokens = tokenize(html);

    assert!(matches!(&tokens[0], Token::Doctype { name: Some(n), .. } if n == "html"));
    assert!(matches!(tokens.last(), Some(Token::EndOfFile)));
    assert!(tokens.contains(&text("Hello")));
}
