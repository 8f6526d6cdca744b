//! Line-oriented document model.
//!
//! The installer never parses PHP. `config/app.php` is held as an ordered
//! sequence of lines, and every query or edit is a scan over those lines
//! followed by a splice and a full-file rewrite.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::Result;

/// A text file as an ordered sequence of lines.
///
/// Lines are stored without their terminators and rejoined with `\n` on
/// serialization; the final empty segment produced by a trailing newline is
/// kept, so round-trips preserve it.
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    /// Load a document from disk.
    pub fn load(path: &Path) -> Result<Document> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_content(&content))
    }

    /// Build a document from in-memory content.
    pub fn from_content(content: &str) -> Document {
        Document {
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> &str {
        &self.lines[index]
    }

    /// Indices of every line matching `pattern`, in ascending order.
    pub fn find_lines(&self, pattern: &Regex) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| pattern.is_match(line))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Index of the first line matching `pattern`.
    pub fn first_match(&self, pattern: &Regex) -> Option<usize> {
        self.lines.iter().position(|line| pattern.is_match(line))
    }

    /// Insert `new_lines` immediately before the line at `index`, shifting
    /// subsequent lines down. `index == len()` appends at the end.
    pub fn insert(&mut self, index: usize, new_lines: &[String]) {
        let tail = self.lines.split_off(index);
        self.lines.extend(new_lines.iter().cloned());
        self.lines.extend(tail);
    }

    /// Concatenate all lines back into file content.
    pub fn serialize(&self) -> String {
        self.lines.join("\n")
    }

    /// Overwrite `path` with the serialized document.
    pub fn save(&self, path: &Path) -> Result<()> {
        log::debug!("Writing {} lines to {}", self.lines.len(), path.display());
        fs::write(path, self.serialize())?;
        Ok(())
    }
}
