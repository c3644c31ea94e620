//! Deps command - list a program's transitive import closure

use konfig_core::{find_dependencies, location, UniversalImporter};
use miette::{IntoDiagnostic, Result};

pub async fn run(importer: &mut UniversalImporter, root: &str) -> Result<()> {
    let root_url = location::to_url(root).into_diagnostic()?;
    let deps = find_dependencies(importer, std::slice::from_ref(&root_url))
        .await
        .into_diagnostic()?;
    for dep in deps {
        println!("{dep}");
    }
    Ok(())
}
