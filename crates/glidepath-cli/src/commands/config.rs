use std::path::Path;

use anyhow::Result;

use glidepath_core::ScrollConfig;

/// `path` is the global `--config` file, if one was given
pub fn run(config: &ScrollConfig, init: bool, path: Option<&Path>) -> Result<()> {
    let target = path
        .map(Path::to_path_buf)
        .unwrap_or_else(ScrollConfig::config_path);

    if init {
        if target.exists() {
            println!("Configuration already exists at {}", target.display());
        } else {
            match path {
                Some(path) => ScrollConfig::default().save_to(path)?,
                None => ScrollConfig::default().save()?,
            }
            println!("Wrote default configuration to {}\n", target.display());
        }
    }

    println!("{}", config.to_toml_string()?);

    let warnings = config.warnings();
    if warnings.is_empty() {
        println!("No compatibility warnings.");
    } else {
        println!("Warnings ({}):", warnings.len());
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}
