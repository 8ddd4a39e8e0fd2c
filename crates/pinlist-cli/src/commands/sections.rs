use super::{colorize_section, json_pretty, load_manifest, EXIT_SUCCESS};
use pinlist_schema::LoadOptions;
use std::path::Path;

pub fn run(manifest_path: &Path, options: &LoadOptions, json: bool) -> Result<u8, String> {
    let flat = load_manifest(manifest_path, options)?;
    let groups = flat.sections();

    if json {
        println!("{}", json_pretty(&groups)?);
    } else if groups.is_empty() {
        println!("no pins found in {}", manifest_path.display());
    } else {
        for group in &groups {
            println!("{} ({})", colorize_section(group.label), group.records.len());
            for record in &group.records {
                println!("  {:<32} {}", record.to_string(), record.origin);
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
