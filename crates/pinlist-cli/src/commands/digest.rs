use super::{json_pretty, load_manifest, EXIT_SUCCESS};
use pinlist_schema::LoadOptions;
use std::path::Path;

pub fn run(manifest_path: &Path, options: &LoadOptions, json: bool) -> Result<u8, String> {
    let flat = load_manifest(manifest_path, options)?;
    let digest = flat.compute_digest();
    if json {
        let payload = serde_json::json!({
            "manifest": manifest_path,
            "pins": flat.len(),
            "digest": digest.digest,
            "short_digest": digest.short_digest,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("digest:       {}", digest.digest);
        println!("short_digest: {}", digest.short_digest);
        println!("pins:         {}", flat.len());
    }
    Ok(EXIT_SUCCESS)
}
