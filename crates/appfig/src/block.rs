//! Locating array blocks inside the configuration text.

use regex::Regex;

use crate::document::Document;
use crate::error::InstallerError;
use crate::Result;

/// A delimited array region within a document.
///
/// `start` is the index of the marker line (the one containing
/// `'providers' => [`), `end` the index of the first following line whose
/// trimmed content equals the close literal. A block carries no identity
/// beyond these indices and is recomputed by scanning before every
/// operation, so indices never go stale across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub start: usize,
    pub end: usize,
}

impl Block {
    /// Line indices between the markers, exclusive on both sides.
    pub fn interior(&self) -> std::ops::Range<usize> {
        (self.start + 1)..self.end
    }
}

/// Find the block opened by the first line matching `start_pattern` and
/// closed by the first later line equal to `close_literal` after trimming.
///
/// A missing start marker and an unterminated block both fail with
/// `BlockNotFound`: an array that never closes means the file is malformed
/// or of an unsupported layout, and no insertion point can be trusted.
pub fn find_block(doc: &Document, start_pattern: &Regex, close_literal: &str) -> Result<Block> {
    let start = doc
        .first_match(start_pattern)
        .ok_or_else(|| InstallerError::BlockNotFound {
            marker: start_pattern.as_str().to_string(),
        })?;

    for idx in (start + 1)..doc.len() {
        if doc.line(idx).trim() == close_literal {
            return Ok(Block { start, end: idx });
        }
    }

    Err(InstallerError::BlockNotFound {
        marker: format!("{} (unterminated)", start_pattern.as_str()),
    })
}
