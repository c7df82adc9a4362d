// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The highlighting front end: grammar resolution, scope parsing, and styled
// fragment emission.

use syntect::parsing::{ParseState, ScopeStack, ScopeStackOp, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::{debug, instrument, warn};

use codesnap_core::config::DetectionConfig;
use codesnap_core::{Result, SnapError, StyledDocument, StyledFragment, TokenClass};

use crate::classify::{ClassRule, classify, default_rules};
use crate::detect::detect;

/// Converts raw snippet text into a [`StyledDocument`].
///
/// Holds the loaded grammar set and the class-selector table; build one per
/// pipeline and reuse it across invocations.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    rules: Vec<ClassRule>,
    detection: DetectionConfig,
}

impl Highlighter {
    pub fn new(detection: DetectionConfig) -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            rules: default_rules(),
            detection,
        }
    }

    /// Highlight `code`, optionally against the hinted grammar only.
    ///
    /// The input is HTML-entity-decoded first: content sources that
    /// pre-encode their text would otherwise detect and render as entity
    /// soup. A hint naming an unknown grammar degrades to plain text rather
    /// than failing; internal parser errors are terminal for the invocation.
    #[instrument(skip(self, code), fields(code_len = code.len()))]
    pub fn highlight(&self, code: &str, language_hint: Option<&str>) -> Result<StyledDocument> {
        let decoded = html_escape::decode_html_entities(code);

        let syntax = match language_hint.map(str::trim).filter(|hint| !hint.is_empty()) {
            Some(hint) => match self.syntaxes.find_syntax_by_token(hint) {
                Some(syntax) => syntax,
                None => {
                    warn!(hint, "unknown language hint; rendering as plain text");
                    self.syntaxes.find_syntax_plain_text()
                }
            },
            None => detect(&self.syntaxes, &self.rules, &decoded, &self.detection),
        };
        debug!(language = syntax.name.as_str(), "grammar resolved");

        let fragments = self.parse(&decoded, syntax)?;
        Ok(StyledDocument {
            detected_language: syntax.name.clone(),
            fragments,
        })
    }

    /// Parse the full text and emit styled fragments. Adjacent runs with the
    /// same class merge, but never across a line terminator — every original
    /// line break stays a fragment boundary.
    fn parse(&self, code: &str, syntax: &SyntaxReference) -> Result<Vec<StyledFragment>> {
        let mut parse_state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut fragments: Vec<StyledFragment> = Vec::new();

        for line in LinesWithEndings::from(code) {
            let ops = parse_state
                .parse_line(line, &self.syntaxes)
                .map_err(|err| SnapError::Highlight(format!("parse error: {err}")))?;

            let rules = &self.rules;
            walk_regions(line, &ops, &mut stack, |text, scopes| {
                push_fragment(&mut fragments, text, classify(rules, scopes));
            })
            .map_err(|err| SnapError::Highlight(format!("scope error: {err}")))?;
        }

        Ok(fragments)
    }
}

/// Walk the text regions of one parsed line, calling `visit` with each
/// non-empty region and the scope stack active over it. Ops positioned at a
/// region's end apply after the region is visited.
pub(crate) fn walk_regions(
    line: &str,
    ops: &[(usize, ScopeStackOp)],
    stack: &mut ScopeStack,
    mut visit: impl FnMut(&str, &ScopeStack),
) -> std::result::Result<(), syntect::parsing::ScopeError> {
    let mut cursor = 0usize;
    for (position, op) in ops {
        if *position > cursor {
            visit(&line[cursor..*position], stack);
            cursor = *position;
        }
        stack.apply(op)?;
    }
    if cursor < line.len() {
        visit(&line[cursor..], stack);
    }
    Ok(())
}

fn push_fragment(fragments: &mut Vec<StyledFragment>, text: &str, class: TokenClass) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = fragments.last_mut() {
        if last.class == class && !last.text.ends_with('\n') {
            last.text.push_str(text);
            return;
        }
    }
    fragments.push(StyledFragment {
        text: text.to_string(),
        class,
    });
}
