//! Domain wrapper over the raw document: the two known array blocks of a
//! Laravel `config/app.php` and the entry shapes that live inside them.
//!
//! Providers block: `<indent>Fully\Qualified\Provider::class,` lines inside
//! `'providers' => [` ... `],`. Aliases block: `<indent>'Name' =>
//! Fully\Qualified\Facade::class,` lines inside `'aliases' => [` ... `],`.

use std::path::Path;

use regex::Regex;

use crate::block::{find_block, Block};
use crate::document::Document;
use crate::ordering::{insert_sorted, key_from_class, SortKey};
use crate::Result;

const CLOSE_LITERAL: &str = "],";
const DEFAULT_INDENT: &str = "        ";

/// A loaded `config/app.php` with provider/alias queries and sorted inserts.
pub struct AppConfig {
    doc: Document,
    providers_start: Regex,
    aliases_start: Regex,
    provider_entry: Regex,
    alias_entry: Regex,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<AppConfig> {
        Ok(Self::from_document(Document::load(path)?))
    }

    pub fn from_content(content: &str) -> AppConfig {
        Self::from_document(Document::from_content(content))
    }

    fn from_document(doc: Document) -> AppConfig {
        AppConfig {
            doc,
            providers_start: Regex::new(r"'providers'\s*=>\s*\[").unwrap(),
            aliases_start: Regex::new(r"'aliases'\s*=>\s*\[").unwrap(),
            // Match `Fully\Qualified\Name::class,` with optional leading slash
            provider_entry: Regex::new(
                r"^\s*\\?([A-Za-z_][A-Za-z0-9_]*(?:\\[A-Za-z_][A-Za-z0-9_]*)*)::class,",
            )
            .unwrap(),
            // Match `'Name' => Fully\Qualified\Name::class,`
            alias_entry: Regex::new(r"^\s*'([^']+)'\s*=>\s*\\?([A-Za-z0-9_\\]+)::class,").unwrap(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn serialize(&self) -> String {
        self.doc.serialize()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.doc.save(path)
    }

    fn providers_block(&self) -> Result<Block> {
        find_block(&self.doc, &self.providers_start, CLOSE_LITERAL)
    }

    fn aliases_block(&self) -> Result<Block> {
        find_block(&self.doc, &self.aliases_start, CLOSE_LITERAL)
    }

    /// Whether the file has a recognizable aliases block at all. Older or
    /// heavily customized config files may not; facade installation treats
    /// that as unsupported rather than an error.
    pub fn has_aliases_block(&self) -> bool {
        self.aliases_block().is_ok()
    }

    /// Is `class` registered in the providers block?
    pub fn has_provider(&self, class: &str) -> Result<bool> {
        let block = self.providers_block()?;
        let wanted = class.trim_start_matches('\\');
        for idx in block.interior() {
            if let Some(caps) = self.provider_entry.captures(self.doc.line(idx)) {
                if &caps[1] == wanted {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Is the short alias `name` registered in the aliases block?
    pub fn has_alias(&self, name: &str) -> Result<bool> {
        let block = self.aliases_block()?;
        for idx in block.interior() {
            if let Some(caps) = self.alias_entry.captures(self.doc.line(idx)) {
                if &caps[1] == name {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Insert `class` into the providers block at its sorted position,
    /// with optional heading lines (a comment) spliced in directly above
    /// it at the same indentation.
    pub fn insert_provider(&mut self, class: &str, heading: &[String]) -> Result<()> {
        let block = self.providers_block()?;
        let indent = self.entry_indent(&block, &self.provider_entry);
        let class = class.trim_start_matches('\\');

        let mut lines: Vec<String> = heading.iter().map(|h| format!("{indent}{h}")).collect();
        lines.push(format!("{indent}{class}::class,"));

        let key = key_from_class(class);
        let entry = self.provider_entry.clone();
        let extract = move |line: &str| -> Option<SortKey> {
            entry.captures(line).map(|c| key_from_class(&c[1]))
        };

        log::debug!("Registering provider {class} in providers block");
        insert_sorted(&mut self.doc, &block, &key, &lines, extract);
        Ok(())
    }

    /// Insert `'name' => class::class,` into the aliases block at its
    /// sorted position. Alias entries sort by their quoted short key.
    pub fn insert_alias(&mut self, name: &str, class: &str) -> Result<()> {
        let block = self.aliases_block()?;
        let indent = self.entry_indent(&block, &self.alias_entry);
        let class = class.trim_start_matches('\\');

        let lines = vec![format!("{indent}'{name}' => {class}::class,")];
        let key = vec![name.to_string()];
        let entry = self.alias_entry.clone();
        let extract = move |line: &str| -> Option<SortKey> {
            entry.captures(line).map(|c| vec![c[1].to_string()])
        };

        log::debug!("Registering alias {name} => {class} in aliases block");
        insert_sorted(&mut self.doc, &block, &key, &lines, extract);
        Ok(())
    }

    // Indentation of inserted lines follows the first existing entry in
    // the block; an empty block falls back to the conventional depth.
    fn entry_indent(&self, block: &Block, entry: &Regex) -> String {
        for idx in block.interior() {
            let line = self.doc.line(idx);
            if entry.is_match(line) {
                let trimmed = line.trim_start();
                return line[..line.len() - trimmed.len()].to_string();
            }
        }
        DEFAULT_INDENT.to_string()
    }
}
