//! # Zircon
//!
//! `zircon` is a lexical-analyzer generator. It minimizes a scanner DFA and
//! writes C source that drives the minimized tables, with `#line` markers
//! tying every action back to the specification it came from.

pub mod automaton;
pub mod cli;
pub mod copier;
pub mod emit;
pub mod error;
pub mod escape;
pub mod generate;
pub mod minimize;
pub mod rules;
pub mod state_set;

pub use automaton::{Accept, AnchorKind, Automaton, StateId, MAX_CHARS, NO_TRANSITION};
pub use error::{Error, Result};
pub use generate::{generate, Options, Summary};
pub use minimize::{minimize, Minimized};
