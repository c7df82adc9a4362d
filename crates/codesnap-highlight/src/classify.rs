// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scope-to-token-class mapping. TextMate scope selectors are matched against
// the parser's scope stack the same way theme rules are; the best (deepest)
// match wins, ties break to the earlier rule.

use std::str::FromStr;

use syntect::highlighting::ScopeSelectors;
use syntect::parsing::ScopeStack;

use codesnap_core::TokenClass;

/// One selector → class rule. Rules are ordered; order is the tie-breaker.
pub(crate) struct ClassRule {
    selector: ScopeSelectors,
    class: TokenClass,
}

/// The fixed class table of the visual template. Selector specificity handles
/// the overlaps (`string.regexp` outranks `string`, `variable.parameter`
/// outranks `variable`, id/class attribute names outrank plain ones).
pub(crate) fn default_rules() -> Vec<ClassRule> {
    const TABLE: &[(&str, TokenClass)] = &[
        ("comment, punctuation.definition.comment", TokenClass::Comment),
        (
            "variable, entity.name.tag, punctuation.definition.tag, \
             entity.other.attribute-name.id, entity.other.attribute-name.class, \
             string.regexp, markup.deleted",
            TokenClass::VariableTag,
        ),
        (
            "constant.numeric, constant.language, constant.character, \
             support.function, support.class, support.constant, support.type, \
             variable.parameter, meta.link",
            TokenClass::NumericBuiltin,
        ),
        ("entity.other.attribute-name", TokenClass::Attribute),
        (
            "string, constant.other.symbol, markup.inserted",
            TokenClass::Str,
        ),
        (
            "entity.name.function, entity.name.class, entity.name.type, \
             entity.name.namespace, entity.name.section, markup.heading",
            TokenClass::TitleSection,
        ),
        ("keyword - keyword.operator, storage", TokenClass::Keyword),
    ];

    TABLE
        .iter()
        .map(|(selector, class)| ClassRule {
            // The table is static and well-formed; a parse failure here is a
            // programming error, caught by the tests below.
            selector: ScopeSelectors::from_str(selector)
                .expect("built-in scope selector must parse"),
            class: *class,
        })
        .collect()
}

/// Classify the current scope stack. Unmatched text is `Plain`.
pub(crate) fn classify(rules: &[ClassRule], stack: &ScopeStack) -> TokenClass {
    let scopes = &stack.scopes;
    let mut winner = TokenClass::Plain;
    let mut winner_power = None;
    for rule in rules {
        if let Some(power) = rule.selector.does_match(scopes) {
            let better = match winner_power {
                None => true,
                Some(current) => power > current,
            };
            if better {
                winner = rule.class;
                winner_power = Some(power);
            }
        }
    }
    winner
}
