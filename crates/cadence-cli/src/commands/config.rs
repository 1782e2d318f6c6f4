//! Print the default runtime configuration

use anyhow::Result;
use cadence_runtime::RuntimeConfig;

pub fn run() -> Result<()> {
    let text = RuntimeConfig::default().to_toml_string()?;
    println!("[runtime]");
    print!("{}", text);
    Ok(())
}
