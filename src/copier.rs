//! Copying verbatim specification and template text into the generated file.
//!
//! Input files are split into segments by lines whose first character is a
//! form feed. Inside a segment, a line whose first non-blank character is `^`
//! is a comment: it is never copied, and the next copied line is preceded by
//! a fresh `#line` marker so the line numbers after the gap stay exact.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Result};

const SECTION_BREAK: u8 = 0x0c;
const COMMENT: u8 = b'^';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyState {
    Normal,
    AfterSkip,
}

/// A line read by [`SourceCopier::read_segment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the source file.
    pub number: usize,
    /// Line text without its line terminator.
    pub text: String,
}

/// Lines of one segment plus whether the input ended with it.
#[derive(Debug, Clone, Default)]
pub struct Segment {
    pub lines: Vec<SourceLine>,
    pub at_eof: bool,
}

/// Write a `#line` marker.
pub fn write_line_directive<W: Write>(out: &mut W, line: usize, file_name: &str) -> Result<()> {
    writeln!(out, "#line {} \"{}\"", line, file_name)?;
    Ok(())
}

pub struct SourceCopier<R> {
    reader: R,
    path: PathBuf,
    file_name: String,
    /// Lines read so far.
    line: usize,
    buffer: Vec<u8>,
}

impl SourceCopier<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> SourceCopier<R> {
    /// Copier over `reader`; `path` is reported in errors and `#line` markers.
    pub fn new(reader: R, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            reader,
            file_name: path.display().to_string(),
            path,
            line: 0,
            buffer: Vec::with_capacity(256),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Copy lines up to the next section break or the end of input.
    ///
    /// Returns `true` when the input is exhausted.
    pub fn copy_segment<W: Write>(&mut self, out: &mut W, line_directives: bool) -> Result<bool> {
        let first = self.line + 1;
        if line_directives {
            write_line_directive(out, first, &self.file_name)?;
        }
        let mut state = CopyState::Normal;
        while self.next_line()? {
            if self.buffer.first() == Some(&SECTION_BREAK) {
                debug!(file = %self.file_name, first, last = self.line, "copied segment");
                return self.at_eof();
            }
            let lead = self.buffer.iter().find(|b| !b.is_ascii_whitespace());
            if lead == Some(&COMMENT) {
                state = CopyState::AfterSkip;
                continue;
            }
            if state == CopyState::AfterSkip {
                state = CopyState::Normal;
                if line_directives {
                    write_line_directive(out, self.line, &self.file_name)?;
                }
            }
            out.write_all(&self.buffer)?;
        }
        debug!(file = %self.file_name, first, last = self.line, "copied final segment");
        Ok(true)
    }

    /// Read the lines of the next segment without copying them anywhere.
    ///
    /// Comment lines are returned like any other line.
    pub fn read_segment(&mut self) -> Result<Segment> {
        let mut lines = Vec::new();
        while self.next_line()? {
            if self.buffer.first() == Some(&SECTION_BREAK) {
                let at_eof = self.at_eof()?;
                return Ok(Segment { lines, at_eof });
            }
            let text = String::from_utf8_lossy(&self.buffer);
            lines.push(SourceLine {
                number: self.line,
                text: text.trim_end_matches(['\n', '\r']).to_string(),
            });
        }
        Ok(Segment {
            lines,
            at_eof: true,
        })
    }

    fn next_line(&mut self) -> Result<bool> {
        self.buffer.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .map_err(|e| Error::io(&self.path, e))?;
        if read == 0 {
            return Ok(false);
        }
        self.line += 1;
        Ok(true)
    }

    fn at_eof(&mut self) -> Result<bool> {
        let rest = self.reader.fill_buf().map_err(|e| Error::io(&self.path, e))?;
        Ok(rest.is_empty())
    }
}
