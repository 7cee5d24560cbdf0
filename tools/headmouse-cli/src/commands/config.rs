//! Create, validate, and print the config file.

use std::path::Path;

use headmouse_common::config::{load_strict, save_json};

use crate::settings::AppConfig;

pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    save_json(path, &AppConfig::default())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

pub fn validate(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        println!("[OK] No config at {}; defaults apply", path.display());
        return Ok(());
    }
    let config: AppConfig = load_strict(path)?;
    config.controller.validate()?;

    let rules = config.controller.gestures.effective_rules();
    println!("[OK] {} is valid", path.display());
    println!("     Gesture rules: {}", rules.len());
    for rule in &rules {
        println!("       {} -> {:?}", rule.name, rule.action);
    }
    Ok(())
}

pub fn show(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# defaults ({} not found)", path.display());
    }
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
