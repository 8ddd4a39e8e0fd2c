use crate::types::{PackageName, SectionLabel, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

pub const COMMENT_MARKER: char = '#';
pub const PIN_SEPARATOR: &str = "==";
pub const INCLUDE_SHORT: &str = "-r";
pub const INCLUDE_LONG: &str = "--requirement";
pub const BYTE_ORDER_MARK: char = '\u{feff}';

/// What is wrong with a line that is not blank, a comment, an inclusion, or a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect {
    MissingSeparator,
    RepeatedSeparator,
    EmptyName,
    EmptyVersion,
    InvalidName,
    InvalidVersion,
    MissingIncludePath,
    UnsupportedOption,
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Defect::MissingSeparator => "expected '<name>==<version>'",
            Defect::RepeatedSeparator => "more than one '==' separator",
            Defect::EmptyName => "package name is empty",
            Defect::EmptyVersion => "version is empty",
            Defect::InvalidName => "package name contains whitespace, '=' or invisible characters",
            Defect::InvalidVersion => "version contains whitespace, '=' or invisible characters",
            Defect::MissingIncludePath => "inclusion directive has no path",
            Defect::UnsupportedOption => "unsupported option line",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}:{}: malformed entry '{}': {}", .path.display(), .line, .content, .defect)]
pub struct ManifestError {
    pub path: PathBuf,
    pub line: usize,
    pub content: String,
    pub defect: Defect,
}

/// A single `name==version` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pin {
    pub name: PackageName,
    pub version: Version,
}

impl Pin {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: PackageName::new(name),
            version: Version::new(version),
        }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{PIN_SEPARATOR}{}", self.name, self.version)
    }
}

impl FromStr for Pin {
    type Err = Defect;

    fn from_str(s: &str) -> Result<Self, Defect> {
        let text = s.trim();
        match text.matches(PIN_SEPARATOR).count() {
            0 => return Err(Defect::MissingSeparator),
            1 => {}
            _ => return Err(Defect::RepeatedSeparator),
        }
        let Some((name_raw, version_raw)) = text.split_once(PIN_SEPARATOR) else {
            return Err(Defect::MissingSeparator);
        };

        let name = name_raw.trim();
        let version = version_raw.trim();
        if name.is_empty() {
            return Err(Defect::EmptyName);
        }
        if version.is_empty() {
            return Err(Defect::EmptyVersion);
        }
        if !is_token(name) {
            return Err(Defect::InvalidName);
        }
        if !is_token(version) {
            return Err(Defect::InvalidVersion);
        }

        Ok(Pin::new(name, version))
    }
}

/// One classified line of a manifest file. Blank lines produce no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Section { line: usize, label: SectionLabel },
    Pin { line: usize, pin: Pin },
    Include { line: usize, path: PathBuf },
}

impl Entry {
    pub fn line(&self) -> usize {
        match self {
            Entry::Section { line, .. } | Entry::Pin { line, .. } | Entry::Include { line, .. } => {
                *line
            }
        }
    }
}

/// The entries of one manifest file, in file order, before inclusions are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub path: PathBuf,
    pub entries: Vec<Entry>,
}

impl Manifest {
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Pin { pin, .. } => Some(pin),
            _ => None,
        })
    }

    pub fn includes(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Include { path, .. } => Some(path.as_path()),
            _ => None,
        })
    }
}

/// Scan manifest text. `path` is recorded for error reporting only.
pub fn parse_manifest_str(
    input: &str,
    path: impl AsRef<Path>,
) -> Result<Manifest, ManifestError> {
    let path = path.as_ref();
    let input = input.strip_prefix(BYTE_ORDER_MARK).unwrap_or(input);
    let mut entries = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let malformed = |defect| ManifestError {
            path: path.to_path_buf(),
            line,
            content: raw.trim().to_owned(),
            defect,
        };

        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        if let Some(comment) = text.strip_prefix(COMMENT_MARKER) {
            let label = comment.trim();
            if !label.is_empty() {
                trace!("{}:{line}: section '{label}'", path.display());
                entries.push(Entry::Section {
                    line,
                    label: SectionLabel::new(label),
                });
            }
            continue;
        }

        let text = strip_inline_comment(text);

        if text.starts_with('-') {
            let target = parse_include(text).map_err(malformed)?;
            trace!("{}:{line}: include '{}'", path.display(), target.display());
            entries.push(Entry::Include { line, path: target });
            continue;
        }

        let pin: Pin = text.parse().map_err(malformed)?;
        trace!("{}:{line}: pin {pin}", path.display());
        entries.push(Entry::Pin { line, pin });
    }

    Ok(Manifest {
        path: path.to_path_buf(),
        entries,
    })
}

fn parse_include(text: &str) -> Result<PathBuf, Defect> {
    let target = if let Some(rest) = text.strip_prefix(INCLUDE_LONG) {
        if let Some(value) = rest.strip_prefix('=') {
            value
        } else if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            rest
        } else {
            return Err(Defect::UnsupportedOption);
        }
    } else if let Some(rest) = text.strip_prefix(INCLUDE_SHORT) {
        rest
    } else {
        return Err(Defect::UnsupportedOption);
    };

    let target = target.trim();
    if target.is_empty() {
        return Err(Defect::MissingIncludePath);
    }
    Ok(PathBuf::from(target))
}

/// Drop a trailing `# ...` comment that is separated from the content by whitespace.
fn strip_inline_comment(text: &str) -> &str {
    let mut prev_ws = false;
    for (i, c) in text.char_indices() {
        if c == COMMENT_MARKER && prev_ws {
            return text[..i].trim_end();
        }
        prev_ws = c.is_whitespace();
    }
    text
}

fn is_token(s: &str) -> bool {
    !s.chars()
        .any(|c| c.is_whitespace() || c == '=' || c.is_control() || is_format_char(c))
}

/// Zero-width and bidi formatting characters that render as nothing.
fn is_format_char(c: char) -> bool {
    matches!(
        c,
        '\u{00ad}'
            | '\u{061c}'
            | '\u{180e}'
            | '\u{200b}'..='\u{200f}'
            | '\u{202a}'..='\u{202e}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206f}'
            | BYTE_ORDER_MARK
    )
}
