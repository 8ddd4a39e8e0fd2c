use crate::manifest::{Pin, COMMENT_MARKER};
use crate::types::{PackageName, SectionLabel, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// File and 1-based line a pin record was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin {
    pub path: PathBuf,
    pub line: usize,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

/// A pin with the section it was declared under and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRecord {
    pub name: PackageName,
    pub version: Version,
    pub section: SectionLabel,
    pub origin: Origin,
}

impl PinRecord {
    pub fn pin(&self) -> Pin {
        Pin {
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }
}

impl fmt::Display for PinRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

/// Output of a load: every pin reachable from the root manifest, inclusions
/// spliced in place, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedManifest {
    pub root: PathBuf,
    pub records: Vec<PinRecord>,
}

/// Pin records sharing one section label, in first-appearance order.
#[derive(Debug, Clone, Serialize)]
pub struct SectionGroup<'a> {
    pub label: &'a SectionLabel,
    pub records: Vec<&'a PinRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit a `# <label>` line whenever the section changes.
    pub with_sections: bool,
}

impl FlattenedManifest {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sections(&self) -> Vec<SectionGroup<'_>> {
        let mut groups: Vec<SectionGroup<'_>> = Vec::new();
        for record in &self.records {
            match groups.iter_mut().find(|g| *g.label == record.section) {
                Some(group) => group.records.push(record),
                None => groups.push(SectionGroup {
                    label: &record.section,
                    records: vec![record],
                }),
            }
        }
        groups
    }

    /// Canonical `name==version` lines for an installer.
    pub fn to_requirements_string(&self) -> String {
        self.render(RenderOptions::default())
    }

    pub fn render(&self, options: RenderOptions) -> String {
        let mut out = String::new();
        let mut current: Option<&SectionLabel> = None;
        for record in &self.records {
            if options.with_sections && current != Some(&record.section) {
                if current.is_some() {
                    out.push('\n');
                }
                out.push(COMMENT_MARKER);
                out.push(' ');
                out.push_str(&record.section);
                out.push('\n');
                current = Some(&record.section);
            }
            out.push_str(&record.to_string());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parse_manifest_str;

    fn record(name: &str, version: &str, section: &str, line: usize) -> PinRecord {
        PinRecord {
            name: PackageName::new(name),
            version: Version::new(version),
            section: SectionLabel::new(section),
            origin: Origin {
                path: PathBuf::from("requirements-dev.txt"),
                line,
            },
        }
    }

    fn sample() -> FlattenedManifest {
        FlattenedManifest {
            root: PathBuf::from("requirements-dev.txt"),
            records: vec![
                record("matplotlib", "2.2.2", "install requirements", 1),
                record("pytest", "3.5.1", "test", 4),
                record("sphinx", "1.7.0", "docs", 8),
                record("mock", "2.0.0", "test", 9),
            ],
        }
    }

    #[test]
    fn renders_plain_pin_lines() {
        assert_eq!(
            sample().to_requirements_string(),
            "matplotlib==2.2.2\npytest==3.5.1\nsphinx==1.7.0\nmock==2.0.0\n"
        );
    }

    #[test]
    fn renders_section_headers_on_change() {
        let text = sample().render(RenderOptions {
            with_sections: true,
        });
        assert_eq!(
            text,
            "# install requirements\nmatplotlib==2.2.2\n\n# test\npytest==3.5.1\n\n# docs\nsphinx==1.7.0\n\n# test\nmock==2.0.0\n"
        );
    }

    #[test]
    fn rendered_sections_scan_back_to_same_records() {
        let flat = sample();
        let text = flat.render(RenderOptions {
            with_sections: true,
        });
        let rescanned = parse_manifest_str(&text, "flat.txt").unwrap();
        let pins: Vec<Pin> = rescanned.pins().cloned().collect();
        let expected: Vec<Pin> = flat.records.iter().map(PinRecord::pin).collect();
        assert_eq!(pins, expected);
    }

    #[test]
    fn groups_sections_in_first_appearance_order() {
        let flat = sample();
        let groups = flat.sections();
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["install requirements", "test", "docs"]);
        assert_eq!(groups[1].records.len(), 2);
        assert_eq!(groups[1].records[1].name, "mock");
    }

    #[test]
    fn empty_manifest_renders_nothing() {
        let flat = FlattenedManifest {
            root: PathBuf::from("empty.txt"),
            records: Vec::new(),
        };
        assert!(flat.is_empty());
        assert_eq!(flat.to_requirements_string(), "");
        assert!(flat.sections().is_empty());
    }

    #[test]
    fn origin_displays_as_path_and_line() {
        let r = record("mock", "2.0.0", "test", 5);
        assert_eq!(r.origin.to_string(), "requirements-dev.txt:5");
        assert_eq!(r.to_string(), "mock==2.0.0");
    }
}
