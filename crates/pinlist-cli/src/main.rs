mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_MANIFEST_ERROR};
use pinlist_schema::LoadOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "pinlist",
    version,
    about = "Flatten and validate pinned dependency manifests"
)]
struct Cli {
    /// Loader configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve all inclusions and print the flattened pin list.
    Flatten {
        /// Path to the root manifest.
        #[arg(default_value = "requirements.txt")]
        manifest: PathBuf,
        /// Section label for pins that precede any comment line.
        #[arg(long)]
        default_section: Option<String>,
        /// Emit a `# <section>` line whenever the section changes.
        #[arg(long, default_value_t = false)]
        with_sections: bool,
        /// Write the flattened list to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip the version-conflict check.
        #[arg(long, default_value_t = false)]
        no_validate: bool,
    },
    /// Check that no package is pinned to two different versions.
    Validate {
        /// Path to the root manifest.
        #[arg(default_value = "requirements.txt")]
        manifest: PathBuf,
        /// Section label for pins that precede any comment line.
        #[arg(long)]
        default_section: Option<String>,
    },
    /// List pins grouped by section.
    Sections {
        /// Path to the root manifest.
        #[arg(default_value = "requirements.txt")]
        manifest: PathBuf,
        /// Section label for pins that precede any comment line.
        #[arg(long)]
        default_section: Option<String>,
    },
    /// Print the content digest of the flattened manifest.
    Digest {
        /// Path to the root manifest.
        #[arg(default_value = "requirements.txt")]
        manifest: PathBuf,
        /// Section label for pins that precede any comment line.
        #[arg(long)]
        default_section: Option<String>,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PINLIST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;

    let result = match cli.command {
        Commands::Flatten {
            manifest,
            default_section,
            with_sections,
            output,
            no_validate,
        } => load_options(cli.config.as_deref(), default_section.as_deref()).and_then(|opts| {
            commands::flatten::run(
                &manifest,
                &opts,
                commands::flatten::FlattenArgs {
                    with_sections,
                    output: output.as_deref(),
                    validate: !no_validate,
                },
                json_output,
            )
        }),
        Commands::Validate {
            manifest,
            default_section,
        } => load_options(cli.config.as_deref(), default_section.as_deref())
            .and_then(|opts| commands::validate::run(&manifest, &opts, json_output)),
        Commands::Sections {
            manifest,
            default_section,
        } => load_options(cli.config.as_deref(), default_section.as_deref())
            .and_then(|opts| commands::sections::run(&manifest, &opts, json_output)),
        Commands::Digest {
            manifest,
            default_section,
        } => load_options(cli.config.as_deref(), default_section.as_deref())
            .and_then(|opts| commands::digest::run(&manifest, &opts, json_output)),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("manifest error:") {
                EXIT_MANIFEST_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

/// Config file first, then command-line overrides.
fn load_options(
    config: Option<&Path>,
    default_section: Option<&str>,
) -> Result<LoadOptions, String> {
    let mut options = match config {
        Some(path) => LoadOptions::load(path)
            .map_err(|e| format!("config error in {}: {e}", path.display()))?,
        None => LoadOptions::default(),
    };
    if let Some(label) = default_section {
        options = options.with_default_section(label);
        options
            .validate()
            .map_err(|e| format!("config error: {e}"))?;
    }
    Ok(options)
}
