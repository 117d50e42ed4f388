//! `solace onboard` — write a default solace.toml.

use solace_config::AppConfig;
use std::path::Path;

pub fn run() -> anyhow::Result<()> {
    let path = Path::new("solace.toml");
    if path.exists() {
        println!("solace.toml already exists; leaving it untouched.");
        return Ok(());
    }

    std::fs::write(path, AppConfig::default_toml())?;
    println!("Wrote default configuration to solace.toml");
    println!("Set SOLACE_API_KEY (or backend.kind = \"scripted\") and you're ready:");
    println!("  solace turn \"I've been feeling stressed lately\"");
    Ok(())
}
