//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Token emission ("Emit the current token")
//! - Parse error reporting

use std::collections::HashSet;

use htpy_common::DiagnosticKind;

use super::core::{HtmlTokenizer, TokenizerState};
use super::token::Token;

/// Diagnostic component name for tokenizer messages.
pub(crate) const COMPONENT: &str = "HTML Tokenizer";

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HtmlTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Switch to the X state"
    ///
    /// Transitions to a new state. The next character will be consumed on the
    /// next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Reconsume in the X state"
    ///
    /// Transitions to a new state without consuming the current character.
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HtmlTokenizer {
    /// "Consume the next input character"
    ///
    /// Returns the character at the current position and advances the position.
    /// Returns None if we've reached the end of input.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    /// Peek at a codepoint at the given offset from the current position without
    /// consuming it. Used for lookahead operations like "the next few characters are".
    #[must_use]
    pub fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.input[self.current_pos..].chars().nth(offset)
    }

    /// "If the next few characters are..."
    ///
    /// Check if the next few characters match the target string exactly.
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.input[self.current_pos..].starts_with(target)
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.input[self.current_pos..]
            .get(..target.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(target))
    }

    /// Consume the given string from the input.
    /// Caller must have already verified the characters are present.
    pub(super) const fn consume_string(&mut self, target: &str) {
        // Only ever called with ASCII targets ("DOCTYPE", "--", "[CDATA[").
        self.current_pos += target.len();
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// NOTE: excludes CR, which is normalized away before tokenization.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    ///
    /// Called on `<` inside RCDATA/RAWTEXT: true when the input continues with
    /// `/name` followed by whitespace, `/`, `>` or the end of input.
    pub(super) fn appropriate_end_tag_follows(&self) -> bool {
        let Some(name) = self.last_start_tag_name.as_deref() else {
            return false;
        };
        let Some(after_solidus) = self.input[self.current_pos..].strip_prefix('/') else {
            return false;
        };
        let matches_name = after_solidus
            .get(..name.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name));
        matches_name
            && after_solidus[name.len()..]
                .chars()
                .next()
                .is_none_or(|c| Self::is_whitespace_char(c) || c == '/' || c == '>')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HtmlTokenizer {
    /// "Emit the current token" - adds the token to the output stream.
    ///
    /// Start tags are finalized here: duplicate attributes are removed and
    /// the tokenizer switches to RCDATA or RAWTEXT for elements whose content
    /// is not markup.
    pub(super) fn emit_token(&mut self) {
        let Some(mut token) = self.current_token.take() else {
            return;
        };
        self.flush_text();

        if let Token::StartTag {
            ref name,
            self_closing,
            ref mut attributes,
        } = token
        {
            // [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
            // "If there is already an attribute on the token with the exact same
            // name, then this is a duplicate-attribute parse error and the new
            // attribute must be removed from the token."
            let mut seen = HashSet::new();
            let before = attributes.len();
            attributes.retain(|attr| seen.insert(attr.name.clone()));
            if attributes.len() != before {
                self.log_parse_error(&format!("duplicate attribute on <{name}>"));
            }

            self.last_start_tag_name = Some(name.clone());

            // [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
            // NOTE: the tree builder would switch the tokenizer state. Since we
            // run the tokenizer before the parser, special elements are detected here.
            if !self_closing {
                match name.as_str() {
                    // "Follow the generic RCDATA element parsing algorithm."
                    "title" | "textarea" => self.switch_to(TokenizerState::RCDATA),
                    // "Follow the generic raw text element parsing algorithm."
                    // Script data escapes are not modelled; script is raw text.
                    // Scripting is off, so `noscript` holds ordinary markup.
                    "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                        self.switch_to(TokenizerState::RAWTEXT);
                    }
                    _ => {}
                }
            }
        }

        self.token_stream.push(token);
    }

    /// "Emit the current input character as a character token."
    ///
    /// Characters are buffered and emitted as a single `Text` token when the
    /// next non-character token is emitted.
    pub(super) fn emit_character(&mut self, c: char) {
        self.pending_text.push(c);
    }

    /// Emit several characters as character tokens.
    pub(super) fn emit_characters(&mut self, s: &str) {
        self.pending_text.push_str(s);
    }

    fn flush_text(&mut self) {
        if !self.pending_text.is_empty() {
            let data = std::mem::take(&mut self.pending_text);
            self.token_stream.push(Token::Text { data });
        }
    }

    /// "Emit an end-of-file token."
    ///
    /// A token still under construction at this point is dropped, which is
    /// what the eof-in-tag rules ask for.
    pub(super) fn emit_eof_token(&mut self) {
        self.flush_text();
        self.current_token = None;
        self.token_stream.push(Token::EndOfFile);
        self.at_eof = true;
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HtmlTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Records a parse error in this run's diagnostics.
    /// Parse errors in HTML are not fatal - the tokenizer recovers and continues.
    pub(super) fn log_parse_error(&mut self, message: &str) {
        let consumed = &self.input[..self.current_pos];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count());
        self.diagnostics.warn(
            COMPONENT,
            DiagnosticKind::ParseIssue,
            format!("{message} at {line}:{column} ({} state)", self.state),
        );
    }
}
