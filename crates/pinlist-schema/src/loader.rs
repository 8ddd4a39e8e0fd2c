//! Recursive manifest loading.
//!
//! A load walks the root manifest line by line, splicing every `-r` target in
//! place. Files on the current resolution stack are in the `Loading` state; a
//! directive that points back at one of them is a cycle.

use crate::config::{ConfigError, LoadOptions};
use crate::flattened::{FlattenedManifest, Origin, PinRecord};
use crate::manifest::{parse_manifest_str, Entry, Manifest, ManifestError};
use crate::types::SectionLabel;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("manifest not found: {}{}", .path.display(), included_from_suffix(.included_from.as_ref()))]
    FileNotFound {
        path: PathBuf,
        included_from: Option<Origin>,
    },
    #[error("failed to read manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    MalformedEntry(#[from] ManifestError),
    #[error("cyclic inclusion of {}: {}", .path.display(), format_chain(.chain))]
    CyclicInclusion { path: PathBuf, chain: Vec<PathBuf> },
    #[error("invalid load options: {0}")]
    InvalidOptions(#[from] ConfigError),
}

/// Per-file resolution state during one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
}

/// Loads manifests with a fixed set of options. Holds no state between loads.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    options: LoadOptions,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<FlattenedManifest, LoadError> {
        let root = path.as_ref();
        self.options.validate()?;
        info!("loading manifest {}", root.display());

        let mut resolution = Resolution::default();
        let section = SectionLabel::new(self.options.default_section.trim());
        resolution.load_file(root, None, section)?;

        info!(
            "flattened {} into {} pin records from {} file(s)",
            root.display(),
            resolution.records.len(),
            resolution.files_read
        );
        Ok(FlattenedManifest {
            root: root.to_path_buf(),
            records: resolution.records,
        })
    }
}

/// Load `path` with default options.
pub fn load(path: impl AsRef<Path>) -> Result<FlattenedManifest, LoadError> {
    Loader::new().load(path)
}

#[derive(Debug, Default)]
struct Resolution {
    stack: Vec<PathBuf>,
    states: HashMap<PathBuf, LoadState>,
    records: Vec<PinRecord>,
    /// Parsed files by canonical path, so a file reached by several routes is read once.
    parsed: HashMap<PathBuf, Rc<Manifest>>,
    files_read: usize,
}

impl Resolution {
    fn state(&self, key: &Path) -> LoadState {
        self.states
            .get(key)
            .copied()
            .unwrap_or(LoadState::NotLoaded)
    }

    fn load_file(
        &mut self,
        path: &Path,
        included_from: Option<Origin>,
        mut section: SectionLabel,
    ) -> Result<(), LoadError> {
        let key = match fs::canonicalize(path) {
            Ok(key) => key,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LoadError::FileNotFound {
                    path: path.to_path_buf(),
                    included_from,
                });
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if self.state(&key) == LoadState::Loading {
            let mut chain = self.stack.clone();
            chain.push(key.clone());
            return Err(LoadError::CyclicInclusion { path: key, chain });
        }

        let manifest = match self.parsed.get(&key) {
            Some(manifest) => {
                debug!("reusing {} (section '{section}')", path.display());
                Rc::clone(manifest)
            }
            None => {
                let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                let manifest = Rc::new(parse_manifest_str(&content, path)?);
                self.files_read += 1;
                debug!(
                    "scanned {} ({} entries, section '{section}')",
                    path.display(),
                    manifest.entries.len()
                );
                self.parsed.insert(key.clone(), Rc::clone(&manifest));
                manifest
            }
        };

        self.states.insert(key.clone(), LoadState::Loading);
        self.stack.push(key.clone());

        for entry in &manifest.entries {
            match entry {
                Entry::Section { label, .. } => section = label.clone(),
                Entry::Pin { line, pin } => self.records.push(PinRecord {
                    name: pin.name.clone(),
                    version: pin.version.clone(),
                    section: section.clone(),
                    origin: Origin {
                        path: path.to_path_buf(),
                        line: *line,
                    },
                }),
                Entry::Include { line, path: target } => {
                    let line = *line;
                    let resolved = resolve_include(path, target);
                    debug!(
                        "{}:{line}: including {}",
                        path.display(),
                        resolved.display()
                    );
                    let origin = Origin {
                        path: path.to_path_buf(),
                        line,
                    };
                    self.load_file(&resolved, Some(origin), section.clone())?;
                }
            }
        }

        self.stack.pop();
        self.states.insert(key, LoadState::Loaded);
        Ok(())
    }
}

/// Resolve an inclusion target against the directory of the including file.
pub fn resolve_include(including: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        return target.to_path_buf();
    }
    match including.parent() {
        Some(dir) => dir.join(target),
        None => target.to_path_buf(),
    }
}

fn included_from_suffix(origin: Option<&Origin>) -> String {
    origin.map_or_else(String::new, |o| format!(" (included from {o})"))
}

fn format_chain(chain: &[PathBuf]) -> String {
    let mut out = String::new();
    for (i, p) in chain.iter().enumerate() {
        if i > 0 {
            out.push_str(" -> ");
        }
        let _ = write!(out, "{}", p.display());
    }
    out
}
