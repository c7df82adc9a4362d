// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded language autodetection. Only the allow-listed grammars are ever
// tried, and each candidate reads a bounded prefix of the input, which keeps
// detection cost flat and avoids false positives from exotic grammars.

use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::debug;

use codesnap_core::TokenClass;
use codesnap_core::config::DetectionConfig;

use crate::classify::{ClassRule, classify};
use crate::highlighter::walk_regions;

/// Pick the best grammar for unhinted input.
///
/// Each candidate is scored by highlight coverage: the fraction of
/// non-whitespace bytes the grammar assigns a non-plain token class, over the
/// first `max_lines` lines. A candidate that fails to parse scores zero.
/// Strictly-greater comparison keeps ties on the earliest allow-list entry;
/// an all-zero field falls back to plain text.
pub(crate) fn detect<'a>(
    syntaxes: &'a SyntaxSet,
    rules: &[ClassRule],
    code: &str,
    config: &DetectionConfig,
) -> &'a SyntaxReference {
    let mut best: Option<(&SyntaxReference, f64)> = None;

    for token in &config.languages {
        let Some(syntax) = syntaxes.find_syntax_by_token(token) else {
            continue;
        };
        let score = coverage_score(syntaxes, rules, syntax, code, config.max_lines);
        debug!(candidate = token.as_str(), score, "autodetect candidate scored");

        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((syntax, score)),
        }
    }

    match best {
        Some((syntax, score)) if score > 0.0 => syntax,
        _ => syntaxes.find_syntax_plain_text(),
    }
}

fn coverage_score(
    syntaxes: &SyntaxSet,
    rules: &[ClassRule],
    syntax: &SyntaxReference,
    code: &str,
    max_lines: usize,
) -> f64 {
    let mut parse_state = ParseState::new(syntax);
    let mut stack = ScopeStack::new();
    let mut styled = 0usize;
    let mut total = 0usize;

    for (index, line) in LinesWithEndings::from(code).enumerate() {
        if index >= max_lines {
            break;
        }
        let Ok(ops) = parse_state.parse_line(line, syntaxes) else {
            return 0.0;
        };
        let walked = walk_regions(line, &ops, &mut stack, |text, scopes| {
            let weight = text.bytes().filter(|byte| !byte.is_ascii_whitespace()).count();
            total += weight;
            if classify(rules, scopes) != TokenClass::Plain {
                styled += weight;
            }
        });
        if walked.is_err() {
            return 0.0;
        }
    }

    if total == 0 {
        0.0
    } else {
        styled as f64 / total as f64
    }
}
