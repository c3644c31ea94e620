//! Konfig CLI - declarative Kubernetes configuration with OCI bundles

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use konfig_core::UniversalImporter;
use konfig_oci::OciTransport;
use miette::{IntoDiagnostic, Result};
use url::Url;

mod commands;
mod util;

#[derive(Parser)]
#[command(name = "konfig")]
#[command(author = "Konfig Contributors")]
#[command(version)]
#[command(about = "Declarative Kubernetes configuration with lazy imports and OCI bundles", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable alpha features
    #[arg(long, global = true)]
    alpha: bool,

    /// Additional import search directories, tried in order
    #[arg(short = 'J', long = "jpath", global = true)]
    jpath: Vec<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle a program's import closure and push it to an OCI registry
    Pack {
        /// Target OCI reference (e.g. ghcr.io/org/app:v1)
        reference: String,

        /// Root program file (path or URL)
        root: String,

        /// Write the archive to a file instead of pushing
        #[arg(long)]
        output: Option<PathBuf>,

        /// Use HTTP instead of HTTPS to reach the registry
        #[arg(long)]
        insecure_registry: bool,
    },

    /// List every location transitively imported by a program
    Deps {
        /// Root program file (path or URL)
        root: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut importer = build_importer(&cli)?;

    match cli.command {
        Commands::Pack {
            ref reference,
            ref root,
            ref output,
            insecure_registry,
        } => {
            commands::pack::run(
                &mut importer,
                reference,
                root,
                output.as_deref(),
                insecure_registry,
            )
            .await
        }
        Commands::Deps { ref root } => commands::deps::run(&mut importer, root).await,
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "konfig=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// One resolver per invocation: search path from `--jpath` with the
/// embedded stdlib as the final fallback, plus the registry transport.
fn build_importer(cli: &Cli) -> Result<UniversalImporter> {
    let mut search_urls = Vec::with_capacity(cli.jpath.len() + 1);
    for dir in &cli.jpath {
        let abs = std::path::absolute(dir).into_diagnostic()?;
        let url = Url::from_directory_path(&abs)
            .map_err(|_| miette::miette!("invalid search directory: {}", dir.display()))?;
        search_urls.push(url);
    }
    search_urls.push(Url::parse("internal:///").into_diagnostic()?);

    let mut importer = UniversalImporter::new(search_urls, cli.alpha);
    importer.register_transport("oci", Box::new(OciTransport::new()));
    Ok(importer)
}
