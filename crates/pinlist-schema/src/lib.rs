//! Pinned dependency manifests: scanning, recursive inclusion, and validation.
//!
//! This crate defines the schema layer: the line scanner for
//! `requirements.txt`-style manifests (`parse_manifest_str`), the recursive
//! loader that splices `-r` inclusions into one ordered list of pin records
//! with section provenance (`Loader`, `load`), the version-conflict check
//! (`validate`), canonical rendering, and content digests.

pub mod config;
pub mod flattened;
pub mod identity;
pub mod loader;
pub mod manifest;
pub mod types;
pub mod validate;

pub use config::{ConfigError, LoadOptions, DEFAULT_SECTION};
pub use flattened::{FlattenedManifest, Origin, PinRecord, RenderOptions, SectionGroup};
pub use identity::ManifestDigest;
pub use loader::{load, resolve_include, LoadError, LoadState, Loader};
pub use manifest::{parse_manifest_str, Defect, Entry, Manifest, ManifestError, Pin};
pub use types::{Digest, PackageName, SectionLabel, ShortDigest, Version};
pub use validate::{validate, Conflict, ConflictError};
