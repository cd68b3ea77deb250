//! Encoding-preserving text writer
//!
//! A rewrite keeps the byte-order mark and line-ending style the file had on
//! disk. Content is handled internally with `\n` line endings only.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

/// BOM presence and line-ending style of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodingProfile {
    pub bom: bool,
    pub line_ending: LineEnding,
}

impl EncodingProfile {
    /// Sample the profile from raw file bytes
    ///
    /// The line ending is taken from the first line break in the file.
    pub fn detect(bytes: &[u8]) -> Self {
        let bom = bytes.starts_with(UTF8_BOM);
        let line_ending = match bytes.iter().position(|&b| b == b'\n') {
            Some(pos) if pos > 0 && bytes[pos - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        };

        Self { bom, line_ending }
    }

    /// Apply the profile to `\n`-normalized text
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let normalized = normalize_newlines(text);
        let body = match self.line_ending {
            LineEnding::Lf => normalized,
            LineEnding::CrLf => normalized.replace('\n', "\r\n"),
        };

        let mut bytes = Vec::with_capacity(body.len() + UTF8_BOM.len());
        if self.bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(body.as_bytes());
        bytes
    }
}

/// Whether the bytes contain both `\r\n` and bare `\n` line breaks
pub fn has_mixed_line_endings(bytes: &[u8]) -> bool {
    let mut crlf = false;
    let mut lf = false;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            if i > 0 && bytes[i - 1] == b'\r' {
                crlf = true;
            } else {
                lf = true;
            }
        }
    }
    crlf && lf
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// A text file decoded together with its encoding profile
#[derive(Debug, Clone)]
pub struct TextFile {
    pub profile: EncodingProfile,
    /// Content without BOM, line endings normalized to `\n`
    pub text: String,
}

impl TextFile {
    /// Read `path`, returning `None` when it does not exist
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let profile = EncodingProfile::detect(&bytes);
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
        let text = normalize_newlines(&String::from_utf8_lossy(body));

        Ok(Some(Self { profile, text }))
    }
}

/// Result of writing one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
    Unchanged,
}

impl std::fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WriteOutcome::Created => "created",
            WriteOutcome::Updated => "updated",
            WriteOutcome::Unchanged => "unchanged",
        };
        f.write_str(label)
    }
}

/// Write `text` to `path` using the profile of the bytes currently on disk
///
/// New files use `default_profile`. Nothing is written when the encoded bytes
/// already match, or when `dry_run` is set.
pub fn write_preserving(
    path: &Path,
    text: &str,
    default_profile: EncodingProfile,
    dry_run: bool,
) -> Result<WriteOutcome> {
    let existing = match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    let (profile, outcome) = match &existing {
        Some(bytes) => {
            if has_mixed_line_endings(bytes) {
                tracing::warn!(
                    "{} has mixed line endings; rewriting with the style of its first line break",
                    path.display()
                );
            }
            (EncodingProfile::detect(bytes), WriteOutcome::Updated)
        }
        None => (default_profile, WriteOutcome::Created),
    };

    let encoded = profile.encode(text);
    if existing.as_deref() == Some(encoded.as_slice()) {
        return Ok(WriteOutcome::Unchanged);
    }

    if !dry_run {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, &encoded).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(outcome)
}
