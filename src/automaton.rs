//! The scanner automaton handed from the front end to the minimizer and emitter.

use std::fmt;
use std::fs;
use std::path::Path;

use bincode::{Decode, Encode};

use crate::{Error, Result};

// define type alias for state-id and transition rows
pub type StateId = u32;
pub type Row = [StateId; MAX_CHARS];

/// Size of the input alphabet (one column per ASCII byte).
pub const MAX_CHARS: usize = 128;
/// Table cell meaning "no transition"; emitted as `-1`.
pub const NO_TRANSITION: StateId = StateId::MAX;
/// Accept-table value for a state that accepts without an anchor.
pub const ACCEPT_UNANCHORED: u8 = 4;

/// Line anchors of the rule a state accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Encode, Decode)]
pub enum AnchorKind {
    #[default]
    None,
    Start,
    End,
    StartAndEnd,
}

impl AnchorKind {
    pub fn from_flags(start: bool, end: bool) -> Self {
        match (start, end) {
            (false, false) => AnchorKind::None,
            (true, false) => AnchorKind::Start,
            (false, true) => AnchorKind::End,
            (true, true) => AnchorKind::StartAndEnd,
        }
    }

    /// Bit 1 for `^`, bit 2 for `$`.
    pub fn bits(self) -> u8 {
        match self {
            AnchorKind::None => 0,
            AnchorKind::Start => 1,
            AnchorKind::End => 2,
            AnchorKind::StartAndEnd => 3,
        }
    }
}

impl fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorKind::None => Ok(()),
            AnchorKind::Start => write!(f, "start"),
            AnchorKind::End => write!(f, "end"),
            AnchorKind::StartAndEnd => write!(f, "start end"),
        }
    }
}

/// The action attached to an accepting state.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Accept {
    pub action: String,
    /// 1-based line of the specification file where the action begins.
    pub line: usize,
    pub anchor: AnchorKind,
}

impl Accept {
    pub fn new(action: impl Into<String>, line: usize, anchor: AnchorKind) -> Self {
        Self {
            action: action.into(),
            line,
            anchor,
        }
    }

    /// Value written to the generated accept table.
    pub fn table_value(&self) -> u8 {
        match self.anchor {
            AnchorKind::None => ACCEPT_UNANCHORED,
            anchor => anchor.bits(),
        }
    }
}

/// A DFA over [`MAX_CHARS`] symbols whose start state is 0.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Automaton {
    transitions: Vec<Row>,
    accept: Vec<Option<Accept>>,
}

impl Automaton {
    pub fn new(transitions: Vec<Row>, accept: Vec<Option<Accept>>) -> Result<Self> {
        let dfa = Self {
            transitions,
            accept,
        };
        dfa.validate()?;
        Ok(dfa)
    }

    /// A row with every cell set to [`NO_TRANSITION`].
    pub fn empty_row() -> Row {
        [NO_TRANSITION; MAX_CHARS]
    }

    /// Check the table shape and that every successor names an existing state.
    pub fn validate(&self) -> Result<()> {
        let states = self.transitions.len();
        if states == 0 {
            return Err(Error::EmptyAutomaton);
        }
        if self.accept.len() != states {
            return Err(Error::AcceptTableLength {
                states,
                found: self.accept.len(),
            });
        }
        for (state, row) in self.transitions.iter().enumerate() {
            for (symbol, &target) in row.iter().enumerate() {
                if target != NO_TRANSITION && target as usize >= states {
                    return Err(Error::MalformedTable {
                        state,
                        symbol,
                        target: target as usize,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    pub fn transitions(&self) -> &[Row] {
        &self.transitions
    }

    pub fn next_state(&self, state: StateId, input: u8) -> Option<StateId> {
        let row = self.transitions.get(state as usize)?;
        match row.get(input as usize) {
            Some(&next) if next != NO_TRANSITION => Some(next),
            _ => None,
        }
    }

    /// The accept record of `state`, or `None` for a non-accepting state.
    pub fn accept(&self, state: StateId) -> Option<&Accept> {
        self.accept
            .get(state as usize)?
            .as_ref()
            .filter(|accept| !accept.action.is_empty())
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accept(state).is_some()
    }

    /// States visited from the start state while reading `input`.
    pub fn get_state_sequence(&self, input: &[u8]) -> Option<Vec<StateId>> {
        let mut state = 0;
        let mut seq = vec![state];
        for &byte in input {
            state = self.next_state(state, byte)?;
            seq.push(state);
        }
        Some(seq)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::encode_to_vec(self, bincode::config::standard())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (dfa, _): (Self, usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())?;
        dfa.validate()?;
        Ok(dfa)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes()?).map_err(|e| Error::io(path, e))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Automaton with {} states:", self.num_states())?;
        for (state, row) in self.transitions.iter().enumerate() {
            let edges: Vec<(usize, StateId)> = row
                .iter()
                .enumerate()
                .filter(|(_, &next)| next != NO_TRANSITION)
                .map(|(symbol, &next)| (symbol, next))
                .collect();
            writeln!(f, "{:?} -> {:?}", state, edges)?;
        }
        Ok(())
    }
}
