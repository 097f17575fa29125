//! One generator run: specification in, scanner source out.

use std::io::{BufRead, Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::automaton::Automaton;
use crate::copier::SourceCopier;
use crate::emit::ScannerEmitter;
use crate::minimize::minimize;
use crate::rules::{build_automaton, parse_rules};
use crate::{Error, Result};

/// The driver template used when no `-m` template is given.
pub const DEFAULT_TEMPLATE: &str = include_str!("../zircon.par");
pub const DEFAULT_TEMPLATE_NAME: &str = "zircon.par";

#[derive(Debug, Clone)]
pub struct Options {
    /// Driver template; the built-in one when `None`.
    pub template: Option<PathBuf>,
    /// Pre-built automaton to use instead of compiling the rules section.
    pub automaton: Option<PathBuf>,
    pub line_directives: bool,
    pub debug_header: bool,
    pub public_tables: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            template: None,
            automaton: None,
            line_directives: true,
            debug_header: true,
            public_tables: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Rules compiled from the rules section; 0 when a pre-built automaton was loaded.
    pub rules: usize,
    pub states: usize,
    pub minimized_states: usize,
    pub accepting_states: usize,
}

/// Generate a scanner for the specification at `spec_path` into `out`.
pub fn generate<W: Write>(spec_path: &Path, options: &Options, out: &mut W) -> Result<Summary> {
    let spec = SourceCopier::open(spec_path)?;
    match &options.template {
        Some(path) => generate_from(spec, SourceCopier::open(path)?, options, out),
        None => {
            let template = SourceCopier::new(
                Cursor::new(DEFAULT_TEMPLATE.as_bytes()),
                DEFAULT_TEMPLATE_NAME,
            );
            generate_from(spec, template, options, out)
        }
    }
}

/// [`generate`] over already opened specification and template text.
pub fn generate_from<S: BufRead, T: BufRead, W: Write>(
    mut spec: SourceCopier<S>,
    mut template: SourceCopier<T>,
    options: &Options,
    out: &mut W,
) -> Result<Summary> {
    let spec_path = PathBuf::from(spec.file_name());
    let missing = |section| Error::MissingSection {
        path: spec_path.clone(),
        section,
    };

    if spec.copy_segment(out, options.line_directives)? {
        return Err(missing("rules"));
    }
    let rules_section = spec.read_segment()?;
    let (dfa, rule_count) = match &options.automaton {
        Some(path) => (Automaton::load(path)?, 0),
        None => {
            let rules = parse_rules(&rules_section.lines)?;
            if rules.is_empty() {
                return Err(missing("rules"));
            }
            (build_automaton(&rules)?, rules.len())
        }
    };

    let minimized = minimize(&dfa)?.automaton;
    debug!("{}", minimized);
    let summary = Summary {
        rules: rule_count,
        states: dfa.num_states(),
        minimized_states: minimized.num_states(),
        accepting_states: (0..minimized.num_states())
            .filter(|&state| minimized.is_accepting(state as u32))
            .count(),
    };
    info!(
        rules = summary.rules,
        states = summary.states,
        minimized = summary.minimized_states,
        accepting = summary.accepting_states,
        "minimized scanner"
    );

    let emitter = ScannerEmitter::new(spec.file_name())
        .line_directives(options.line_directives)
        .public_tables(options.public_tables);
    template.copy_segment(out, options.line_directives)?;
    if options.debug_header {
        emitter.emit_debug_header(out, &minimized)?;
    }
    emitter.emit_transition_table(out, &minimized)?;
    emitter.emit_driver_and_actions(out, &minimized, &mut template)?;

    if !rules_section.at_eof {
        spec.copy_segment(out, options.line_directives)?;
    }
    Ok(summary)
}
