//! Pack command - bundle a program's import closure and publish it

use std::path::Path;

use console::style;
use konfig_core::{location, pack, UniversalImporter};
use konfig_oci::{BundleConfig, Publisher};
use miette::{IntoDiagnostic, Result, WrapErr};

use crate::util::format_size;

pub async fn run(
    importer: &mut UniversalImporter,
    reference: &str,
    root: &str,
    output: Option<&Path>,
    insecure_registry: bool,
) -> Result<()> {
    let root_url = location::to_url(root).into_diagnostic()?;

    let bundle = pack::bundle_dependencies(importer, &root_url)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("packing {root:?}"))?;

    println!(
        "{} {} ({}, entrypoint {})",
        style("Packaged").cyan().bold(),
        root,
        format_size(bundle.body.len() as u64),
        bundle.entrypoint,
    );

    if let Some(path) = output {
        std::fs::write(path, &bundle.body).into_diagnostic()?;
        println!("{} {}", style("Written").green().bold(), path.display());
        return Ok(());
    }

    let config = BundleConfig {
        entrypoint: bundle.entrypoint,
        metadata: Some(pack::bundle_metadata(None)),
    };
    let publisher = Publisher::new(insecure_registry);
    let pushed = publisher
        .push_bundle(reference, bundle.body, &config)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("packing {root:?}"))?;

    println!("{} {}", style("Pushed").green().bold(), pushed.manifest_url);
    println!("  {} {}", style("Digest").dim(), pushed.body_digest);
    Ok(())
}
