use crate::flattened::{FlattenedManifest, Origin};
use crate::types::{PackageName, Version};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// One package pinned to more than one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    /// Name as spelled at its first occurrence.
    pub package: PackageName,
    pub versions: BTreeSet<Version>,
    pub origins: Vec<Origin>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.package)?;
        for (i, v) in self.versions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("conflicting pins for {} package(s): {}", .conflicts.len(), format_conflicts(.conflicts))]
pub struct ConflictError {
    pub conflicts: Vec<Conflict>,
}

impl FlattenedManifest {
    pub fn validate(&self) -> Result<(), ConflictError> {
        validate(self)
    }
}

/// Check that no package is pinned to two different versions.
///
/// Names are compared in canonical form. Every offending package is reported,
/// ordered by canonical name.
pub fn validate(manifest: &FlattenedManifest) -> Result<(), ConflictError> {
    let mut by_name: BTreeMap<String, Conflict> = BTreeMap::new();
    for record in &manifest.records {
        let entry = by_name
            .entry(record.name.canonical())
            .or_insert_with(|| Conflict {
                package: record.name.clone(),
                versions: BTreeSet::new(),
                origins: Vec::new(),
            });
        entry.versions.insert(record.version.clone());
        entry.origins.push(record.origin.clone());
    }

    let conflicts: Vec<Conflict> = by_name
        .into_values()
        .filter(|c| c.versions.len() > 1)
        .collect();

    debug!(
        "validated {} pin records: {} conflict(s)",
        manifest.records.len(),
        conflicts.len()
    );

    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(ConflictError { conflicts })
    }
}

fn format_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flattened::PinRecord;
    use crate::types::SectionLabel;
    use std::path::PathBuf;

    fn flat(pins: &[(&str, &str, &str)]) -> FlattenedManifest {
        FlattenedManifest {
            root: PathBuf::from("requirements-dev.txt"),
            records: pins
                .iter()
                .enumerate()
                .map(|(i, (name, version, section))| PinRecord {
                    name: PackageName::new(*name),
                    version: Version::new(*version),
                    section: SectionLabel::new(*section),
                    origin: Origin {
                        path: PathBuf::from("requirements-dev.txt"),
                        line: i + 1,
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn distinct_packages_are_valid() {
        let m = flat(&[("pytest", "3.5.1", "test"), ("mock", "2.0.0", "test")]);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn identical_duplicates_are_not_conflicts() {
        let m = flat(&[
            ("mock", "2.0.0", "test"),
            ("mock", "2.0.0", "test"),
            ("mock", "2.0.0", "other"),
        ]);
        assert!(validate(&m).is_ok());
    }

    #[test]
    fn different_versions_conflict_and_name_both() {
        let m = flat(&[("pytest", "3.5.1", "test"), ("pytest", "3.6.0", "other")]);
        let err = m.validate().unwrap_err();
        assert_eq!(err.conflicts.len(), 1);
        let c = &err.conflicts[0];
        assert_eq!(c.package, "pytest");
        let versions: Vec<&str> = c.versions.iter().map(Version::as_str).collect();
        assert_eq!(versions, vec!["3.5.1", "3.6.0"]);
        assert_eq!(c.origins.len(), 2);
        let msg = err.to_string();
        assert!(msg.contains("3.5.1") && msg.contains("3.6.0"), "{msg}");
    }

    #[test]
    fn reports_every_conflicting_package() {
        let m = flat(&[
            ("numpy", "1.16.0", "install requirements"),
            ("scipy", "1.2.0", "install requirements"),
            ("numpy", "1.16.2", "test"),
            ("scipy", "1.2.1", "docs"),
            ("scipy", "1.2.0", "docs"),
            ("mock", "2.0.0", "test"),
        ]);
        let err = validate(&m).unwrap_err();
        let names: Vec<&str> = err.conflicts.iter().map(|c| c.package.as_str()).collect();
        assert_eq!(names, vec!["numpy", "scipy"]);
        assert_eq!(err.conflicts[1].versions.len(), 2);
        assert_eq!(err.conflicts[1].origins.len(), 3);
        assert!(err.to_string().starts_with("conflicting pins for 2 package(s)"));
    }

    #[test]
    fn spelling_variants_of_one_package_conflict() {
        let m = flat(&[
            ("ruamel.yaml", "0.15.0", "install requirements"),
            ("Ruamel-YAML", "0.15.1", "test"),
        ]);
        let err = validate(&m).unwrap_err();
        assert_eq!(err.conflicts[0].package, "ruamel.yaml");
    }

    #[test]
    fn versions_are_compared_verbatim() {
        let m = flat(&[("redis", "2.0", "a"), ("redis", "2.0.0", "b")]);
        assert!(validate(&m).is_err());
    }
}
