//! Settings file persistence.
//!
//! One file per provider, `scraper_<id>.conf`, holding `key=value` lines.
//! Loading is tolerant: missing files, comments, malformed lines, unknown
//! keys and undecodable secrets are all skipped, and every surviving value
//! goes through normal validation. Saving replaces the file atomically via a
//! temporary file in the same directory.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::store::ConfigStore;
use crate::error::{Error, Result};

/// Path of the settings file for `provider_id` inside `dir`.
pub fn settings_path(dir: &Path, provider_id: &str) -> PathBuf {
    dir.join(format!("scraper_{provider_id}.conf"))
}

/// Read `store`'s settings file from `dir` and apply its values.
pub fn load_from_dir(store: &ConfigStore, dir: &Path) -> Result<()> {
    let path = settings_path(dir, store.owner());
    let _guard = store.io_guard();

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(provider = store.owner(), path = %path.display(), "No settings file; keeping defaults");
            return Ok(());
        }
        Err(e) => return Err(Error::io(&path, e)),
    };

    let content = String::from_utf8_lossy(&bytes);
    let pairs = parse_lines(&content);
    let total = pairs.len();

    let codec = store.codec();
    let applied = store.apply_persisted(pairs, |entry, raw| {
        if !entry.is_encrypted() {
            return Some(raw.to_string());
        }
        match codec.decode(raw) {
            Ok(plain) => Some(plain),
            Err(e) => {
                warn!(provider = store.owner(), key = %entry.key, "Ignoring stored secret: {e}");
                None
            }
        }
    });

    info!(
        provider = store.owner(),
        path = %path.display(),
        applied,
        skipped = total - applied,
        "Loaded provider settings"
    );
    Ok(())
}

/// Write every explicitly set value of `store` to its settings file in
/// `dir`.
pub fn save_to_dir(store: &ConfigStore, dir: &Path) -> Result<()> {
    let path = settings_path(dir, store.owner());
    let _guard = store.io_guard();

    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let codec = store.codec();
    let values = store.explicit_values();
    let mut content = format!(
        "# settings for provider '{}'\n# {}\n",
        store.owner(),
        chrono::Utc::now().to_rfc3339()
    );
    for (entry, value) in &values {
        let stored = if entry.is_encrypted() {
            codec.encode(value)
        } else {
            value.clone()
        };
        content.push_str(&escape(&entry.key, true));
        content.push('=');
        content.push_str(&escape(&stored, false));
        content.push('\n');
    }

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::io(tmp.path(), e))?;
    // Dropping the returned temp file removes it from disk.
    tmp.persist(&path).map_err(|e| Error::Persist {
        path: path.clone(),
        source: e.error,
    })?;

    info!(
        provider = store.owner(),
        path = %path.display(),
        count = values.len(),
        "Saved provider settings"
    );
    Ok(())
}

/// Split file content into unescaped `(key, value)` pairs.
fn parse_lines(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let Some(sep) = find_separator(trimmed) else {
            debug!(line = lineno + 1, "Skipping settings line without '='");
            continue;
        };

        let key = unescape(trim_key_end(&trimmed[..sep]));
        let value = unescape(&trimmed[sep + 1..]);
        pairs.push((key, value));
    }

    pairs
}

/// Trim trailing whitespace before the separator, keeping a whitespace
/// character that is escaped.
fn trim_key_end(raw: &str) -> &str {
    let trimmed = raw.trim_end();
    let backslashes = trimmed.chars().rev().take_while(|c| *c == '\\').count();
    if backslashes % 2 == 0 || trimmed.len() == raw.len() {
        return trimmed;
    }
    let escaped_len = raw[trimmed.len()..]
        .chars()
        .next()
        .map_or(0, char::len_utf8);
    &raw[..trimmed.len() + escaped_len]
}

/// Byte offset of the first unescaped `=`.
fn find_separator(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Escape a key or value for a single settings line.
///
/// Keys additionally escape `=`, a leading `#` or `!` (which would read as a
/// comment), and leading or trailing whitespace (which the parser trims).
fn escape(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    let last = raw.chars().count().saturating_sub(1);
    for (pos, ch) in raw.chars().enumerate() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '=' if is_key => out.push_str("\\="),
            '#' | '!' if is_key && pos == 0 => {
                out.push('\\');
                out.push(ch);
            }
            _ if is_key && ch.is_whitespace() && (pos == 0 || pos == last) => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
