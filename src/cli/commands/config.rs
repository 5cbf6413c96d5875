//! `roster config` command - Inspect the effective configuration

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::Path;

use crate::cli::helpers::load_config;
use crate::cli::GlobalOpts;
use crate::core::config::CONFIG_ENV;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("api_url", "Base URL of the backend"),
    ("token", "Bearer token (prefer token_env)"),
    ("token_env", "Environment variable holding the bearer token"),
    ("page_size", "Rows per page for list output"),
    ("timeout_secs", "Request timeout in seconds"),
    ("default_format", "Default output format (yaml, json, tsv, csv, md, id)"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

/// Effective value of `key`; the token is always masked
fn config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "api_url" => Some(config.api_url().to_string()),
        "token" => config.masked_token(),
        "token_env" => Some(config.token_env().to_string()),
        "page_size" => Some(config.page_size().to_string()),
        "timeout_secs" => Some(config.timeout().as_secs().to_string()),
        "default_format" => config.default_format.clone(),
        _ => None,
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);

    if let Some(key) = &args.key {
        if !VALID_KEYS.iter().any(|(k, _)| k == key) {
            return Err(miette::miette!(
                "Unknown key '{}'. Run 'roster config keys' to list valid keys.",
                key
            ));
        }
        return match config_value(&config, key) {
            Some(value) => {
                println!("{value}");
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        print_config_value(key, config_value(&config, key).as_deref());
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command-line flags (--api-url)");
    println!("  2. Environment variables (ROSTER_API_URL, ROSTER_PAGE_SIZE)");
    println!("  3. File named by {CONFIG_ENV}");
    println!("  4. Global config (~/.config/roster/config.yaml)");
    Ok(())
}

fn print_config_value(key: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {} = {}", style(key).cyan(), style(v).yellow()),
        None => println!("  {} = {}", style(key).cyan(), style("(not set)").dim()),
    }
}

fn print_path(label: &str, path: Option<&Path>) {
    match path {
        Some(p) => {
            let status = if p.exists() {
                style("(exists)").green()
            } else {
                style("(not created)").dim()
            };
            println!("{}: {} {}", label, p.display(), status);
        }
        None => println!("{}: {}", label, style("(not set)").dim()),
    }
}

fn run_path() -> Result<()> {
    print_path("Global config", Config::global_config_path().as_deref());
    let extra = std::env::var_os(CONFIG_ENV).map(std::path::PathBuf::from);
    print_path(CONFIG_ENV, extra.as_deref());
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available Configuration Keys").bold().underlined());
    println!();
    for (key, description) in VALID_KEYS {
        println!("  {:<16} {}", style(key).cyan(), description);
    }
    Ok(())
}
