//! Symbol -> display text table loaded from the framework's translations header

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};

use crate::error::Result;
use crate::utils::{file_utils, markup};

/// Default symbol prefix of documented configuration keys
pub const DEFAULT_PREFIX: &str = "PARAM";

/// Read-only mapping from symbolic constant name to display string
///
/// Display strings are stored already escaped for the manual's markup.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    prefix: String,
    entries: HashMap<String, String>,
}

impl TranslationTable {
    /// Load the table from a declarations file
    ///
    /// An unreadable file is fatal: every later stage resolves names through
    /// this table.
    pub fn load(path: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading translations from {}", path.display());
        let content = file_utils::read_file_to_string(path)?;
        let table = Self::parse(&content, prefix);
        info!("Loaded {} translations", table.len());
        Ok(table)
    }

    /// Build the table from the text of a declarations file
    pub fn parse(content: &str, prefix: &str) -> Self {
        let mut entries = HashMap::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            let mut tokens = line.split_whitespace();
            if tokens.next() != Some("#define") {
                continue;
            }
            let Some(symbol) = tokens.next() else { continue };
            if !symbol.starts_with(prefix) {
                continue;
            }

            match quoted_text(line) {
                Some(text) => {
                    debug!("Translation {} -> {}", symbol, text);
                    entries.insert(symbol.to_string(), markup::escape(text));
                }
                None => warn!("Skipping translation line {}: {}", index + 1, line),
            }
        }

        Self {
            prefix: prefix.to_string(),
            entries,
        }
    }

    /// Look up a symbol's display text
    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.entries.get(symbol).map(String::as_str)
    }

    /// Whether `token` names a translatable symbol (it carries the prefix)
    pub fn is_symbol(&self, token: &str) -> bool {
        !self.prefix.is_empty()
            && token.starts_with(&self.prefix)
            && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry directly; the text is escaped like loaded entries
    pub fn insert(&mut self, symbol: impl Into<String>, text: &str) {
        self.entries.insert(symbol.into(), markup::escape(text));
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            entries: HashMap::new(),
        }
    }
}

/// Text between the first and the last double quote of a line
fn quoted_text(line: &str) -> Option<&str> {
    let start = line.find('"')?;
    let end = line.rfind('"')?;
    (end > start).then(|| &line[start + 1..end])
}
