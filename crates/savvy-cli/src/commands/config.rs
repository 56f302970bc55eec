//! Config commands: show and set

use anyhow::{bail, Result};
use savvy_core::Config;

use crate::output::Output;

pub fn show(output: &Output) -> Result<()> {
    let config = Config::load()?;

    if output.is_json() {
        let view = serde_json::json!({
            "path": Config::config_file_path(),
            "api_url": config.api_url,
            "api_key": mask(&config.api_key),
            "bucket": config.bucket,
            "data_dir": config.data_dir,
        });
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    output.message(&format!("Config file: {:?}", Config::config_file_path()));
    output.message(&format!(
        "api_url:     {}",
        if config.api_url.is_empty() {
            "(not set)"
        } else {
            config.api_url.as_str()
        }
    ));
    output.message(&format!("api_key:     {}", mask(&config.api_key)));
    output.message(&format!("bucket:      {}", config.bucket));
    output.message(&format!("data_dir:    {:?}", config.data_dir));
    Ok(())
}

pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    // Read the file without env overrides baked in, so `set` doesn't
    // persist a value that only came from the environment.
    let path = Config::config_file_path();
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content)?
    } else {
        Config::default()
    };

    match key.as_str() {
        "api_url" => config.api_url = value,
        "api_key" => config.api_key = value,
        "bucket" => config.bucket = value,
        "data_dir" => config.data_dir = value.into(),
        other => bail!(
            "Unknown key '{}'. Valid keys: api_url, api_key, bucket, data_dir",
            other
        ),
    }

    config.save()?;
    output.success(&format!("Set {}", key));
    Ok(())
}

/// Keep only a short prefix of the key so `show` is safe to paste
fn mask(key: &str) -> String {
    if key.is_empty() {
        "(not set)".to_string()
    } else if key.chars().count() <= 8 {
        "********".to_string()
    } else {
        let prefix: String = key.chars().take(8).collect();
        format!("{}...", prefix)
    }
}
