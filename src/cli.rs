//! Command line handling for the `zircon` binary.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::generate::Options;

/// Output file used unless `-t` is given.
pub const DEFAULT_OUTPUT: &str = "zirconyy.c";

/// zircon - minimize a scanner DFA and emit its C driver
#[derive(Parser, Debug, Clone)]
#[command(name = "zircon", disable_help_flag = true)]
#[command(about = "Minimize a scanner DFA and emit its C driver", long_about = None)]
pub struct Invocation {
    /// Lexical specification to compile
    #[arg(value_name = "SPEC-FILE")]
    pub spec: PathBuf,

    /// Use a pre-built automaton instead of the rules section
    #[arg(short = 'a', value_name = "AUTOMATON")]
    pub automaton: Option<PathBuf>,

    /// Don't emit the debug dump of the DFA
    #[arg(short = 'h')]
    pub no_debug_header: bool,

    /// Suppress #line markers
    #[arg(short = 'l')]
    pub no_line_directives: bool,

    /// Driver template to use instead of the built-in one
    #[arg(short = 'm', value_name = "TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Make the tables public (no static)
    #[arg(short = 'p')]
    pub public_tables: bool,

    /// Write to standard output instead of zirconyy.c
    #[arg(short = 't')]
    pub to_stdout: bool,

    /// Verbose logging
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Print help
    #[arg(long = "help", action = ArgAction::Help)]
    help: Option<bool>,
}

impl Invocation {
    pub fn options(&self) -> Options {
        Options {
            template: self.template.clone(),
            automaton: self.automaton.clone(),
            line_directives: !self.no_line_directives,
            debug_header: !self.no_debug_header,
            public_tables: self.public_tables,
        }
    }
}
