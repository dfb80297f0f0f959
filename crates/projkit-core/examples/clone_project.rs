//! Clone a project file to a new location, rewriting its source includes.
//!
//! Usage: clone_project <source.csproj> <target.csproj> [--overwrite]

use anyhow::{bail, Context};
use projkit_core::project::ProjectRegistry;
use std::env;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("Usage: clone_project <source.csproj> <target.csproj> [--overwrite]");
    }
    let overwrite = args.iter().skip(3).any(|arg| arg == "--overwrite");

    let mut registry = ProjectRegistry::new();
    let source = registry
        .load(&args[1])
        .with_context(|| format!("loading {}", args[1]))?;
    let clone = registry
        .clone_project(&source, &args[2], overwrite)
        .with_context(|| format!("cloning to {}", args[2]))?;
    registry.save(&clone)?;

    let project = clone.borrow();
    println!("Cloned {} -> {}", args[1], args[2]);
    if let Some(guid) = project.guid() {
        println!("ProjectGuid: {}", guid.braced());
    }
    println!("\nCompile items:");
    for item in project.document().find_items(|item| item.kind() == "Compile") {
        match item.metadata("Link") {
            Some(link) => println!("  - {} (link: {})", item.include().unwrap_or_default(), link),
            None => println!("  - {}", item.include().unwrap_or_default()),
        }
    }
    Ok(())
}
