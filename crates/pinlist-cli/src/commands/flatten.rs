use super::{json_pretty, load_manifest, EXIT_CONFLICT, EXIT_SUCCESS};
use pinlist_schema::{LoadOptions, RenderOptions};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

pub struct FlattenArgs<'a> {
    pub with_sections: bool,
    pub output: Option<&'a Path>,
    pub validate: bool,
}

fn write_atomic(dest: &Path, content: &str) -> Result<(), String> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| format!("write temp file: {e}"))?;
    use std::io::Write;
    tmp.write_all(content.as_bytes())
        .map_err(|e| format!("write temp file: {e}"))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| format!("fsync temp file: {e}"))?;
    tmp.persist(dest)
        .map_err(|e| format!("persist {}: {}", dest.display(), e.error))?;
    Ok(())
}

pub fn run(
    manifest_path: &Path,
    options: &LoadOptions,
    args: FlattenArgs<'_>,
    json: bool,
) -> Result<u8, String> {
    let flat = load_manifest(manifest_path, options)?;

    if args.validate {
        if let Err(err) = flat.validate() {
            if json {
                println!("{}", json_pretty(&err)?);
            } else {
                eprintln!("error: {err}");
            }
            return Ok(EXIT_CONFLICT);
        }
    }

    let text = flat.render(RenderOptions {
        with_sections: args.with_sections,
    });

    if let Some(dest) = args.output {
        write_atomic(dest, &text)?;
        info!("wrote {} pins to {}", flat.len(), dest.display());
        if json {
            let payload = serde_json::json!({
                "status": "written",
                "manifest": manifest_path,
                "output": dest,
                "pins": flat.len(),
            });
            println!("{}", json_pretty(&payload)?);
        } else {
            println!("wrote {} pins to {}", flat.len(), dest.display());
        }
    } else if json {
        println!("{}", json_pretty(&flat)?);
    } else {
        print!("{text}");
    }

    Ok(EXIT_SUCCESS)
}
