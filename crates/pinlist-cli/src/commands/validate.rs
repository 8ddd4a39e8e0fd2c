use super::{colorize_status, json_pretty, load_manifest, EXIT_CONFLICT, EXIT_SUCCESS};
use pinlist_schema::LoadOptions;
use std::collections::BTreeSet;
use std::path::Path;

pub fn run(manifest_path: &Path, options: &LoadOptions, json: bool) -> Result<u8, String> {
    let flat = load_manifest(manifest_path, options)?;
    let packages: BTreeSet<String> = flat.records.iter().map(|r| r.name.canonical()).collect();

    match flat.validate() {
        Ok(()) => {
            if json {
                let payload = serde_json::json!({
                    "status": "ok",
                    "pins": flat.len(),
                    "packages": packages.len(),
                    "conflicts": [],
                });
                println!("{}", json_pretty(&payload)?);
            } else {
                println!(
                    "{}: {} pins, {} packages, no conflicts",
                    colorize_status(true, "ok"),
                    flat.len(),
                    packages.len()
                );
            }
            Ok(EXIT_SUCCESS)
        }
        Err(err) => {
            if json {
                let payload = serde_json::json!({
                    "status": "conflict",
                    "pins": flat.len(),
                    "packages": packages.len(),
                    "conflicts": err.conflicts,
                });
                println!("{}", json_pretty(&payload)?);
            } else {
                println!(
                    "{}: {} package(s) pinned to more than one version",
                    colorize_status(false, "conflict"),
                    err.conflicts.len()
                );
                for conflict in &err.conflicts {
                    println!("  {conflict}");
                    for origin in &conflict.origins {
                        println!("    at {origin}");
                    }
                }
            }
            Ok(EXIT_CONFLICT)
        }
    }
}
