//! Turning the rules section of a specification into a scanner automaton.
//!
//! A rule is a pattern at the start of a line followed by its action. The
//! patterns are compiled together with `regex-automata` and the resulting DFA
//! is walked from its anchored start state into an [`Automaton`] table.

use std::collections::VecDeque;

use regex_automata::dfa::dense::DFA;
use regex_automata::dfa::{Automaton as _, StartKind};
use regex_automata::util::primitives::StateID as AutomataStateId;
use regex_automata::{Anchored, MatchKind};
use rustc_hash::FxHashMap as HashMap;
use tracing::debug;

use crate::automaton::{Accept, AnchorKind, Automaton, StateId, MAX_CHARS};
use crate::copier::SourceLine;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Pattern with its `^`/`$` anchors removed.
    pub pattern: String,
    pub action: String,
    /// Line where the action begins.
    pub line: usize,
    pub anchor: AnchorKind,
}

fn malformed(line: usize, message: &str) -> Error {
    Error::MalformedRule {
        line,
        message: message.to_string(),
    }
}

/// Split a rule line at the first blank outside a character class.
fn split_rule(text: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut in_class = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => in_class = true,
            ']' => in_class = false,
            c if c.is_whitespace() && !in_class => return (&text[..i], text[i..].trim()),
            _ => {}
        }
    }
    (text, "")
}

fn ends_escaped(text: &str) -> bool {
    text.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

fn strip_anchors(pattern: &str) -> (&str, AnchorKind) {
    let (body, start) = match pattern.strip_prefix('^') {
        Some(rest) => (rest, true),
        None => (pattern, false),
    };
    let end = match body.strip_suffix('$') {
        Some(rest) if !ends_escaped(rest) => Some(rest),
        _ => None,
    };
    (end.unwrap_or(body), AnchorKind::from_flags(start, end.is_some()))
}

/// Parse the lines of the rules section.
///
/// Indented lines continue the action of the rule above them.
pub fn parse_rules(lines: &[SourceLine]) -> Result<Vec<Rule>> {
    let mut rules: Vec<Rule> = Vec::new();
    // Blank lines seen since the last non-blank one; kept only inside an action.
    let mut blanks = 0;
    for line in lines {
        let text = line.text.trim_end();
        if text.is_empty() {
            blanks += 1;
            continue;
        }
        let gap = std::mem::take(&mut blanks);
        if text.starts_with(char::is_whitespace) {
            let rule = rules
                .last_mut()
                .ok_or_else(|| malformed(line.number, "action continues no rule"))?;
            if rule.action.is_empty() {
                rule.action = text.trim_start().to_string();
                rule.line = line.number;
            } else {
                for _ in 0..=gap {
                    rule.action.push('\n');
                }
                rule.action.push_str(text);
            }
            continue;
        }
        let (pattern, action) = split_rule(text);
        let (pattern, anchor) = strip_anchors(pattern);
        if pattern.is_empty() {
            return Err(malformed(line.number, "empty pattern"));
        }
        rules.push(Rule {
            pattern: pattern.to_string(),
            action: action.to_string(),
            line: line.number,
            anchor,
        });
    }
    if let Some(rule) = rules.iter().find(|rule| rule.action.is_empty()) {
        return Err(malformed(rule.line, "rule has no action"));
    }
    Ok(rules)
}

/// Compile `rules` into a scanner DFA whose state 0 is the start state.
///
/// A state accepts when the text read so far matches some rule; the first
/// such rule wins.
pub fn build_automaton(rules: &[Rule]) -> Result<Automaton> {
    let patterns: Vec<&str> = rules.iter().map(|rule| rule.pattern.as_str()).collect();
    let dfa = DFA::builder()
        .configure(
            DFA::config()
                .minimize(false)
                .match_kind(MatchKind::All)
                .start_kind(StartKind::Anchored),
        )
        .build_many(&patterns)
        .map_err(Box::new)?;
    let start_state = match dfa.universal_start_state(Anchored::Yes) {
        Some(s) => s,
        None => return Err(Error::DfaHasNoStartState),
    };

    let mut ids: HashMap<AutomataStateId, StateId> = HashMap::default();
    ids.insert(start_state, 0);
    let mut next_states: VecDeque<AutomataStateId> = VecDeque::from([start_state]);
    let mut transitions = Vec::new();
    let mut accept = Vec::new();
    // states are numbered in discovery order, so rows line up with ids
    while let Some(current_state) = next_states.pop_front() {
        let mut row = Automaton::empty_row();
        for input in 0..MAX_CHARS as u8 {
            let next_state = dfa.next_state(current_state, input);
            if dfa.is_dead_state(next_state) || dfa.is_quit_state(next_state) {
                continue;
            }
            let id = match ids.get(&next_state) {
                Some(&id) => id,
                None => {
                    let id = ids.len() as StateId;
                    ids.insert(next_state, id);
                    next_states.push_back(next_state);
                    id
                }
            };
            row[input as usize] = id;
        }
        transitions.push(row);
        accept.push(accepted_rule(&dfa, current_state).map(|index| {
            let rule = &rules[index];
            Accept::new(rule.action.clone(), rule.line, rule.anchor)
        }));
    }
    debug!(rules = rules.len(), states = transitions.len(), "compiled rules");
    Automaton::new(transitions, accept)
}

/// Index of the first rule matching everything read up to `state`.
fn accepted_rule(dfa: &DFA<Vec<u32>>, state: AutomataStateId) -> Option<usize> {
    let eoi = dfa.next_eoi_state(state);
    if !dfa.is_match_state(eoi) {
        return None;
    }
    (0..dfa.match_len(eoi))
        .map(|i| dfa.match_pattern(eoi, i).as_usize())
        .min()
}
