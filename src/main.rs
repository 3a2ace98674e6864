//! WireMock Stub Builder - CLI Entry Point

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use wiremock_stub::export::{mappings_document, write_mapping_files};
use wiremock_stub::StubFileConfig;

#[derive(Parser, Debug)]
#[command(
    name = "wiremock-stub",
    about = "Turn YAML stub files into WireMock mapping documents",
    version
)]
struct Args {
    /// Path to stub file
    #[arg(short, long, default_value = "stubs.yaml")]
    config: PathBuf,

    /// Write one mapping file per stub into this directory instead of stdout
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Pretty-print the bundle written to stdout
    #[arg(long)]
    pretty: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Validate stub file and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only the mapping document
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if !args.config.exists() {
        anyhow::bail!("Stub file not found: {:?}", args.config);
    }
    let config = StubFileConfig::from_file(&args.config)?;

    if args.validate {
        println!("Stub file is valid ({} stubs defined)", config.stubs.len());
        return Ok(());
    }

    let rules = config.into_rules()?;

    match args.output_dir {
        Some(dir) => {
            let written = write_mapping_files(&dir, &rules)?;
            info!(count = written.len(), dir = %dir.display(), "Mapping files written");
        }
        None => {
            let doc = mappings_document(rules.iter().map(|(_, rule)| rule));
            let json = if args.pretty {
                serde_json::to_string_pretty(&doc)?
            } else {
                serde_json::to_string(&doc)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}
