//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success, print_warning};
use jc_core::config::{self, ConfigFile};

fn resolve(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path)
}

/// Get a config value by dotted key, e.g. `engine.url`
pub fn config_get(config_path: Option<&Path>, key: &str) -> Result<()> {
    let path = resolve(config_path);

    if !path.exists() {
        print_error(&format!("Config file not found: {:?}", path));
        print_info("Run 'jcli config init' to create one");
        return Ok(());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let table: toml::Table =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    let Some(value) = lookup(&table, key) else {
        print_error(&format!("Key not found: {}", key));
        return Ok(());
    };

    match value {
        toml::Value::String(s) => println!("{}", s),
        toml::Value::Table(_) => println!("{}", toml::to_string_pretty(value)?),
        other => println!("{}", other),
    }

    Ok(())
}

/// Set a config value by dotted key, creating the file if needed
pub fn config_set(config_path: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let path = resolve(config_path);

    if !path.exists() {
        print_info("Creating default configuration...");
        config_init(Some(&path), false)?;
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let mut table: toml::Table =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    let parts: Vec<&str> = key.split('.').collect();
    let (last_key, parents) = parts
        .split_last()
        .filter(|(last, _)| !last.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Invalid key: {}", key))?;

    // Navigate/create path to the parent
    let mut current = &mut table;
    for part in parents {
        current = current
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("Cannot navigate to key: {}", key))?;
    }
    current.insert(last_key.to_string(), parse_value(value));

    let new_content = toml::to_string_pretty(&table)?;
    // Refuse values the client could not load back
    toml::from_str::<ConfigFile>(&new_content)
        .with_context(|| format!("Invalid value for {}: {}", key, value))?;

    std::fs::write(&path, new_content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    print_success(&format!("Set {} = {}", key, value));
    Ok(())
}

/// Show current configuration
pub fn config_show(config_path: Option<&Path>) -> Result<()> {
    let path = resolve(config_path);

    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Run 'jcli config init' to create one");
        return Ok(());
    }

    print_info(&format!("Configuration file: {:?}", path));
    println!();

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    println!("{}", content);

    Ok(())
}

/// Initialize default configuration
pub fn config_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let config_file = resolve(config_path);

    if let Some(config_dir) = config_file.parent() {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).with_context(|| {
                format!("Failed to create config directory: {:?}", config_dir)
            })?;
            print_success(&format!("Created config directory: {:?}", config_dir));
        }
    }

    if config_file.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", config_file));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    std::fs::write(&config_file, generate_default_config())
        .with_context(|| format!("Failed to write config file: {:?}", config_file))?;

    print_success(&format!("Created configuration file: {:?}", config_file));
    Ok(())
}

/// Print the config file path
pub fn config_path(config_path: Option<&Path>) {
    println!("{}", resolve(config_path).display());
}

fn lookup<'a>(table: &'a toml::Table, key: &str) -> Option<&'a toml::Value> {
    let mut parts = key.split('.');
    let mut current = table.get(parts.next()?)?;
    for part in parts {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}

/// Parse a command-line value as the most specific TOML type it fits
fn parse_value(value: &str) -> toml::Value {
    if value == "true" {
        toml::Value::Boolean(true)
    } else if value == "false" {
        toml::Value::Boolean(false)
    } else if let Ok(i) = value.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = value.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(value.to_string())
    }
}

fn generate_default_config() -> String {
    format!(
        r#"# jcli configuration

[engine]
# Base URL of the jocker engine
url = "{}"

[session]
# How long an interrupted session waits for the engine to acknowledge
# the close frame, in milliseconds
close_timeout_ms = {}
"#,
        config::DEFAULT_ENGINE_URL,
        config::DEFAULT_CLOSE_TIMEOUT.as_millis()
    )
}
