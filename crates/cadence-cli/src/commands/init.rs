//! Scenario initialization command

use crate::scenario::EXAMPLE;
use anyhow::Result;
use std::fs;
use std::path::Path;

pub fn run(path: &str) -> Result<()> {
    let target = Path::new(path);

    if target.exists() {
        anyhow::bail!("File '{}' already exists", path);
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(target, EXAMPLE)?;
    println!("Wrote example scenario to {}", path);
    println!("Run it with: cadence simulate {}", path);
    Ok(())
}
