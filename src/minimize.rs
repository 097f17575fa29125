//! Partition-refinement minimization of a scanner DFA.
//!
//! States start out grouped by what they accept, then every group is split by
//! the groups its members move to on each input symbol until a pass splits
//! nothing. All bookkeeping lives in a [`Partition`] owned by one call.

use rustc_hash::FxHashMap as HashMap;
use tracing::debug;

use crate::automaton::{Accept, AnchorKind, Automaton, Row, StateId, NO_TRANSITION};
use crate::state_set::StateSet;
use crate::{Error, Result};

/// Group index standing in for "no transition" inside a signature.
const NO_GROUP: usize = usize::MAX;

/// Result of [`minimize`].
#[derive(Debug, Clone)]
pub struct Minimized {
    pub automaton: Automaton,
    /// New state of every original state.
    pub state_map: Vec<StateId>,
    /// Refinement passes run, including the final one that split nothing.
    pub passes: usize,
}

struct Partition {
    groups: Vec<StateSet>,
    inverse_group: Vec<usize>,
}

impl Partition {
    /// Non-accepting states form one group, accepting states are grouped by
    /// identical action text and anchor.
    fn by_accept_signature(dfa: &Automaton) -> Self {
        let n = dfa.num_states();
        let mut index: HashMap<Option<(&str, AnchorKind)>, usize> = HashMap::default();
        let mut groups: Vec<StateSet> = Vec::new();
        let mut inverse_group = vec![0; n];
        for state in 0..n {
            let key = dfa
                .accept(state as StateId)
                .map(|accept| (accept.action.as_str(), accept.anchor));
            let group = *index.entry(key).or_insert_with(|| {
                groups.push(StateSet::new(n));
                groups.len() - 1
            });
            groups[group].add(state);
            inverse_group[state] = group;
        }
        Self {
            groups,
            inverse_group,
        }
    }

    fn signature(&self, row: &Row) -> Vec<usize> {
        row.iter()
            .map(|&next| {
                if next == NO_TRANSITION {
                    NO_GROUP
                } else {
                    self.inverse_group[next as usize]
                }
            })
            .collect()
    }

    /// Split every group by transition signature. Returns whether anything split.
    fn refine(&mut self, dfa: &Automaton) -> bool {
        let n = dfa.num_states();
        let mut groups: Vec<StateSet> = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let mut split: HashMap<Vec<usize>, usize> = HashMap::default();
            for state in group.iter() {
                let sig = self.signature(&dfa.transitions()[state]);
                let sub = *split.entry(sig).or_insert_with(|| {
                    groups.push(StateSet::new(n));
                    groups.len() - 1
                });
                groups[sub].add(state);
            }
        }
        let changed = groups.len() != self.groups.len();
        for (index, group) in groups.iter().enumerate() {
            for state in group.iter() {
                self.inverse_group[state] = index;
            }
        }
        self.groups = groups;
        changed
    }

    /// Move the group holding the start state to index 0.
    fn pin_start(&mut self) {
        let start = self.inverse_group[0];
        if start != 0 {
            self.groups.swap(0, start);
            for (index, group) in self.groups.iter().enumerate() {
                for state in group.iter() {
                    self.inverse_group[state] = index;
                }
            }
        }
    }

    fn accept_of(&self, dfa: &Automaton, group: &StateSet) -> Result<Option<Accept>> {
        let mut members = group.iter();
        let Some(first) = members.next() else {
            return Ok(None);
        };
        let accept = dfa.accept(first as StateId);
        for other in members {
            let same = match (accept, dfa.accept(other as StateId)) {
                (None, None) => true,
                (Some(a), Some(b)) => a.action == b.action && a.anchor == b.anchor,
                _ => false,
            };
            if !same {
                return Err(Error::InconsistentAccept {
                    first,
                    second: other,
                });
            }
        }
        Ok(accept.cloned())
    }
}

/// Compute the minimal automaton equivalent to `dfa`.
///
/// Original state 0 always ends up in new state 0.
pub fn minimize(dfa: &Automaton) -> Result<Minimized> {
    dfa.validate()?;
    let n = dfa.num_states();
    let mut partition = Partition::by_accept_signature(dfa);
    debug!(states = n, groups = partition.groups.len(), "initial partition");

    let mut passes = 0;
    loop {
        passes += 1;
        let changed = partition.refine(dfa);
        debug!(pass = passes, groups = partition.groups.len(), "refinement pass");
        if !changed {
            break;
        }
    }
    debug_assert!(passes <= n + 1);
    partition.pin_start();

    let mut transitions = Vec::with_capacity(partition.groups.len());
    let mut accept = Vec::with_capacity(partition.groups.len());
    for group in &partition.groups {
        let Some(rep) = group.first() else {
            continue;
        };
        let mut row = Automaton::empty_row();
        for (symbol, &next) in dfa.transitions()[rep].iter().enumerate() {
            if next != NO_TRANSITION {
                row[symbol] = partition.inverse_group[next as usize] as StateId;
            }
        }
        transitions.push(row);
        accept.push(partition.accept_of(dfa, group)?);
    }
    debug_assert_eq!(transitions.len(), partition.groups.len());

    let state_map = partition
        .inverse_group
        .iter()
        .map(|&group| group as StateId)
        .collect();
    Ok(Minimized {
        automaton: Automaton::new(transitions, accept)?,
        state_map,
        passes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::MAX_CHARS;

    fn accept(action: &str, line: usize) -> Option<Accept> {
        Some(Accept::new(action, line, AnchorKind::None))
    }

    fn build(edges: &[(usize, u8, StateId)], accepts: Vec<Option<Accept>>) -> Automaton {
        let mut rows = vec![Automaton::empty_row(); accepts.len()];
        for &(from, symbol, to) in edges {
            rows[from][symbol as usize] = to;
        }
        Automaton::new(rows, accepts).unwrap()
    }

    /// Every pair of distinct states differs in acceptance or in some successor.
    fn assert_minimal(dfa: &Automaton) {
        let n = dfa.num_states();
        let mut distinct = vec![vec![false; n]; n];
        for a in 0..n {
            for b in 0..n {
                let (x, y) = (dfa.accept(a as StateId), dfa.accept(b as StateId));
                distinct[a][b] = match (x, y) {
                    (None, None) => false,
                    (Some(x), Some(y)) => x.action != y.action || x.anchor != y.anchor,
                    _ => true,
                };
            }
        }
        let mut changed = true;
        while changed {
            changed = false;
            for a in 0..n {
                for b in 0..n {
                    if distinct[a][b] {
                        continue;
                    }
                    let split = (0..MAX_CHARS).any(|c| {
                        let (p, q) = (dfa.transitions()[a][c], dfa.transitions()[b][c]);
                        match (p == NO_TRANSITION, q == NO_TRANSITION) {
                            (true, true) => false,
                            (false, false) => distinct[p as usize][q as usize],
                            _ => true,
                        }
                    });
                    if split {
                        distinct[a][b] = true;
                        changed = true;
                    }
                }
            }
        }
        for a in 0..n {
            for b in (a + 1)..n {
                assert!(distinct[a][b], "states {a} and {b} are equivalent");
            }
        }
    }

    /// Outcome of running `input` from the start state.
    fn outcome(dfa: &Automaton, input: &[u8]) -> Option<Option<String>> {
        let seq = dfa.get_state_sequence(input)?;
        let last = *seq.last()?;
        Some(dfa.accept(last).map(|a| a.action.clone()))
    }

    // (a|b)*abb with redundant states, the textbook example
    fn abb() -> Automaton {
        build(
            &[
                (0, b'a', 1),
                (0, b'b', 2),
                (1, b'a', 1),
                (1, b'b', 3),
                (2, b'a', 1),
                (2, b'b', 2),
                (3, b'a', 1),
                (3, b'b', 4),
                (4, b'a', 1),
                (4, b'b', 2),
            ],
            vec![None, None, None, None, accept("return ABB;", 7)],
        )
    }

    #[test]
    fn merges_textbook_states() {
        let dfa = abb();
        let min = minimize(&dfa).unwrap();
        assert_eq!(min.automaton.num_states(), 4);
        assert_eq!(min.state_map[0], 0);
        assert_eq!(min.state_map[0], min.state_map[2]);
        assert_minimal(&min.automaton);
        for input in [&b"abb"[..], b"aabb", b"babb", b"ab", b"abba", b""] {
            assert_eq!(outcome(&dfa, input), outcome(&min.automaton, input));
        }
    }

    #[test]
    fn distinct_actions_stay_apart() {
        // "if" and "id" end in states with different actions
        let dfa = build(
            &[(0, b'i', 1), (1, b'f', 2), (1, b'd', 3)],
            vec![None, None, accept("return IF;", 3), accept("return ID;", 4)],
        );
        let min = minimize(&dfa).unwrap();
        assert_eq!(min.automaton.num_states(), 4);
        assert_minimal(&min.automaton);
    }

    #[test]
    fn identical_actions_merge() {
        let dfa = build(
            &[(0, b'a', 1), (0, b'b', 2)],
            vec![None, accept("return X;", 3), accept("return X;", 9)],
        );
        let min = minimize(&dfa).unwrap();
        assert_eq!(min.automaton.num_states(), 2);
        let kept = min.automaton.accept(1).unwrap();
        assert_eq!(kept.line, 3);
        assert_eq!(min.automaton.next_state(0, b'a'), Some(1));
        assert_eq!(min.automaton.next_state(0, b'b'), Some(1));
    }

    #[test]
    fn anchors_split_groups() {
        let mut anchored = accept("return X;", 3);
        if let Some(a) = anchored.as_mut() {
            a.anchor = AnchorKind::Start;
        }
        let dfa = build(
            &[(0, b'a', 1), (0, b'b', 2)],
            vec![None, accept("return X;", 3), anchored],
        );
        assert_eq!(minimize(&dfa).unwrap().automaton.num_states(), 3);
    }

    #[test]
    fn start_state_stays_at_zero() {
        let dfa = build(
            &[(0, b'a', 1), (1, b'a', 2), (2, b'a', 1)],
            vec![accept("return E;", 2), None, None],
        );
        let min = minimize(&dfa).unwrap();
        assert_eq!(min.state_map[0], 0);
        assert!(min.automaton.is_accepting(0));
        assert_eq!(min.automaton.num_states(), 2);
        assert_eq!(min.state_map[1], min.state_map[2]);
    }

    #[test]
    fn pin_start_moves_start_group_first() {
        let mut partition = Partition {
            groups: vec![StateSet::with_members(3, [1, 2]), StateSet::with_members(3, [0])],
            inverse_group: vec![1, 0, 0],
        };
        partition.pin_start();
        assert!(partition.groups[0].contains(0));
        assert_eq!(partition.inverse_group, vec![0, 1, 1]);
    }

    #[test]
    fn minimizing_twice_changes_nothing() {
        let once = minimize(&abb()).unwrap().automaton;
        let twice = minimize(&once).unwrap();
        assert_eq!(twice.automaton.num_states(), once.num_states());
        // already minimal and numbered in first-occurrence order
        assert_eq!(twice.automaton, once);
    }

    #[test]
    fn single_state() {
        let dfa = build(&[(0, b'a', 0)], vec![accept("x++;", 1)]);
        let min = minimize(&dfa).unwrap();
        assert_eq!(min.automaton, dfa);
        assert_eq!(min.passes, 1);
    }

    #[test]
    fn mixed_accepts_in_one_group_are_reported() {
        let dfa = build(&[], vec![None, accept("a();", 1), accept("b();", 2)]);
        let partition = Partition {
            groups: vec![StateSet::with_members(3, [0]), StateSet::with_members(3, [1, 2])],
            inverse_group: vec![0, 1, 1],
        };
        let err = partition.accept_of(&dfa, &partition.groups[1]).unwrap_err();
        assert!(matches!(err, Error::InconsistentAccept { first: 1, second: 2 }));
    }
}
