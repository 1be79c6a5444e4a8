//! Local markdown working copies.
//!
//! A working copy carries a small front-matter block correlating it with the
//! server note, followed directly by the body:
//!
//! ```text
//! ---
//! note_id: 0123...
//! parent_id: 4567...
//! title: Shopping list
//! ---
//! milk
//! eggs
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

const DELIMITER: &str = "---";

/// Key/value pairs from a front-matter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: BTreeMap<String, String>,
}

impl FrontMatter {
    /// Raw value for `key`, possibly empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value for `key`, treating an empty value as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    pub fn note_id(&self) -> Option<&str> {
        self.non_empty("note_id")
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.non_empty("parent_id")
    }

    pub fn title(&self) -> Option<&str> {
        self.non_empty("title")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split markdown text into front matter and body.
///
/// Front matter is only recognised when the text starts with `---\n` and a
/// later line is exactly `---`. Otherwise the whole text is the body.
pub fn parse_markdown(text: &str) -> (FrontMatter, String) {
    let Some(rest) = text.strip_prefix("---\n") else {
        return (FrontMatter::default(), text.to_string());
    };

    let mut fields = BTreeMap::new();
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        offset += line.len();

        if content == DELIMITER {
            return (FrontMatter { fields }, rest[offset..].to_string());
        }

        let trimmed = content.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once(':') {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    // No closing delimiter
    (FrontMatter::default(), text.to_string())
}

pub fn parse_markdown_file(path: &Path) -> Result<(FrontMatter, String)> {
    let text = fs::read_to_string(path)?;
    Ok(parse_markdown(&text))
}

/// Render a working copy. The output always ends with exactly one newline.
pub fn render_markdown(title: &str, body: &str, note_id: &str, parent_id: &str) -> String {
    let mut out = format!(
        "{d}\nnote_id: {}\nparent_id: {}\ntitle: {}\n{d}\n",
        note_id,
        parent_id,
        title,
        d = DELIMITER
    );
    out.push_str(body.trim_end_matches('\n'));
    out.push('\n');
    out
}

/// Write a working copy to `path`, creating parent directories if needed.
pub fn write_markdown_file(
    path: &Path,
    title: &str,
    body: &str,
    note_id: &str,
    parent_id: &str,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, render_markdown(title, body, note_id, parent_id))?;
    Ok(())
}
