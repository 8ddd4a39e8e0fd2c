use crate::flattened::FlattenedManifest;
use crate::types::{Digest, ShortDigest};
use serde::Serialize;

/// Content digest of a flattened manifest.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ManifestDigest {
    pub digest: Digest,
    pub short_digest: ShortDigest,
}

impl FlattenedManifest {
    /// Hash the ordered (section, name, version) triples.
    ///
    /// Origins are left out, so the same pins reached through differently
    /// named files hash the same. Order and section labels are significant.
    pub fn compute_digest(&self) -> ManifestDigest {
        let mut hasher = blake3::Hasher::new();
        for record in &self.records {
            hasher.update(format!("section:{}\n", record.section).as_bytes());
            hasher.update(format!("pin:{}=={}\n", record.name, record.version).as_bytes());
        }

        let hex = hasher.finalize().to_hex().to_string();
        let short = hex[..12].to_owned();

        ManifestDigest {
            digest: Digest::new(hex),
            short_digest: ShortDigest::new(short),
        }
    }
}
