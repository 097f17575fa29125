//! C source emission for the minimized scanner.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::automaton::{Automaton, StateId, MAX_CHARS, NO_TRANSITION};
use crate::copier::{write_line_directive, SourceCopier};
use crate::escape::{escape_byte, escape_str};
use crate::Result;

/// Action text shown in the debug dump is cut to this many characters.
const ACTION_PREVIEW: usize = 20;
/// A `goto` line of the debug dump wraps once it passes this many characters.
const WRAP_COLUMN: usize = 56;
/// Cells per line in the transition table.
const CELLS_PER_LINE: usize = 16;

/// Writes the tables and dispatch code of a generated scanner.
#[derive(Debug, Clone)]
pub struct ScannerEmitter {
    spec_name: String,
    line_directives: bool,
    public: bool,
}

impl ScannerEmitter {
    /// `spec_name` is the file the actions came from, as named in `#line` markers.
    pub fn new(spec_name: impl Into<String>) -> Self {
        Self {
            spec_name: spec_name.into(),
            line_directives: true,
            public: false,
        }
    }

    pub fn line_directives(mut self, enabled: bool) -> Self {
        self.line_directives = enabled;
        self
    }

    /// Give the tables external linkage instead of `static`.
    pub fn public_tables(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    fn storage_class(&self) -> &'static str {
        if self.public {
            ""
        } else {
            "static "
        }
    }

    /// Human readable dump of `dfa`, compiled out with `#ifdef __NEVER__`.
    pub fn emit_debug_header<W: Write>(&self, out: &mut W, dfa: &Automaton) -> Result<()> {
        writeln!(out, "#ifdef __NEVER__")?;
        writeln!(out, "/*{}", "-".repeat(66))?;
        writeln!(out, " * DFA (start state is 0) is:")?;
        writeln!(out, " *")?;
        for (state, row) in dfa.transitions().iter().enumerate() {
            match dfa.accept(state as StateId) {
                None => write!(out, " * State {} [nonaccepting]", state)?,
                Some(accept) => {
                    write!(
                        out,
                        " * State {} [accepting, line {} <{}>]",
                        state,
                        accept.line,
                        escape_str(&accept.action, ACTION_PREVIEW)
                    )?;
                    if accept.anchor.bits() != 0 {
                        write!(out, " Anchor: {}", accept.anchor)?;
                    }
                }
            }

            // runs of symbols going to the same state share one line
            let mut last = None;
            let mut printed = 0;
            for (symbol, &next) in row.iter().enumerate() {
                if next == NO_TRANSITION {
                    continue;
                }
                if last != Some(next) {
                    write!(out, "\n *    goto {:2} on ", next)?;
                    printed = 0;
                }
                let text = escape_byte(symbol as u8, true);
                out.write_all(text.as_bytes())?;
                printed += text.len();
                if printed > WRAP_COLUMN {
                    write!(out, "\n *               ")?;
                    printed = 0;
                }
                last = Some(next);
            }
            writeln!(out)?;
            writeln!(out, " *")?;
        }
        writeln!(out, " */")?;
        writeln!(out, "#endif")?;
        writeln!(out)?;
        Ok(())
    }

    /// The `Yy_nxt` table: one row per state, `-1` where there is no transition.
    pub fn emit_transition_table<W: Write>(&self, out: &mut W, dfa: &Automaton) -> Result<()> {
        let rows = dfa.transitions();
        writeln!(
            out,
            "{}int Yy_nxt[ {} ][ {} ] =",
            self.storage_class(),
            rows.len(),
            MAX_CHARS
        )?;
        writeln!(out, "{{")?;
        for (state, row) in rows.iter().enumerate() {
            write!(out, "/* {:02} */ {{", state)?;
            for (symbol, &next) in row.iter().enumerate() {
                if symbol % CELLS_PER_LINE == 0 {
                    write!(out, "\n    ")?;
                }
                let cell = if next == NO_TRANSITION {
                    -1
                } else {
                    i64::from(next)
                };
                let sep = if symbol + 1 == MAX_CHARS { "" } else { "," };
                write!(out, "{:3}{}", cell, sep)?;
            }
            let sep = if state + 1 == rows.len() { "" } else { "," };
            writeln!(out, "\n    }}{}", sep)?;
        }
        writeln!(out, "}};")?;
        writeln!(out)?;
        Ok(())
    }

    /// The `Yyaccept` table: 0 for non-accepting states, else the anchor bits,
    /// or 4 for an accepting state without anchors.
    pub fn emit_accept_table<W: Write>(&self, out: &mut W, dfa: &Automaton) -> Result<()> {
        let states = dfa.num_states();
        writeln!(out, "{}short Yyaccept[] =", self.storage_class())?;
        writeln!(out, "{{")?;
        for state in 0..states {
            let value = dfa
                .accept(state as StateId)
                .map_or(0, |accept| accept.table_value());
            let sep = if state + 1 == states { ' ' } else { ',' };
            writeln!(out, "\t{:<3}{} /* State {:<3} */", value, sep, state)?;
        }
        writeln!(out, "}};")?;
        writeln!(out)?;
        Ok(())
    }

    /// Accept table, the driver loop from `template`, one `case` per accepting
    /// state and the rest of the driver.
    pub fn emit_driver_and_actions<W: Write, R: BufRead>(
        &self,
        out: &mut W,
        dfa: &Automaton,
        template: &mut SourceCopier<R>,
    ) -> Result<()> {
        self.emit_accept_table(out, dfa)?;
        if template.copy_segment(out, self.line_directives)? {
            warn!(template = template.file_name(), "template ended before the action switch");
        }

        let mut cases = 0;
        for state in 0..dfa.num_states() {
            let Some(accept) = dfa.accept(state as StateId) else {
                continue;
            };
            writeln!(out, "case {}: /* State {:<3} */", state, state)?;
            if self.line_directives {
                write_line_directive(out, accept.line, &self.spec_name)?;
            }
            writeln!(out, "\t\t{}", accept.action)?;
            writeln!(out, "\t\tbreak;")?;
            writeln!(out)?;
            cases += 1;
        }
        debug!(cases, "emitted action cases");

        if !template.copy_segment(out, self.line_directives)? {
            warn!(template = template.file_name(), "ignoring extra template sections");
        }
        Ok(())
    }
}
