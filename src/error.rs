//! The Errors that may occur within the crate.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = crate::Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    // Front-end Errors
    #[error("Failed to build DFA {0}")]
    DfaBuild(#[from] Box<regex_automata::dfa::dense::BuildError>),
    #[error("Rules cannot be compiled since anchored universal start state doesn't exist")]
    DfaHasNoStartState,
    #[error("Malformed rule on line {line}: {message}")]
    MalformedRule { line: usize, message: String },
    #[error("{}: missing {} section", path.display(), section)]
    MissingSection {
        path: PathBuf,
        section: &'static str,
    },

    // Table Errors
    #[error("Automaton has no states")]
    EmptyAutomaton,
    #[error("Accept table has {found} entries but the transition table has {states} rows")]
    AcceptTableLength { states: usize, found: usize },
    #[error("State {state} goes to nonexistent state {target} on symbol {symbol}")]
    MalformedTable {
        state: usize,
        symbol: usize,
        target: usize,
    },
    #[error("States {first} and {second} share a group but accept differently")]
    InconsistentAccept { first: usize, second: usize },

    // I/O Errors
    #[error("{}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write generated scanner: {0}")]
    Output(#[from] std::io::Error),
    #[error("Failed to encode automaton: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("Failed to decode automaton: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
