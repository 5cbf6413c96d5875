//! Shared helper functions for CLI commands
//!
//! Connection setup and small formatting utilities used by several
//! command modules.

use std::num::NonZeroUsize;
use std::sync::Arc;

use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::confirm::{AssumeYes, Confirmation, PromptConfirmation};
use crate::core::notify::ConsoleNotifier;
use crate::core::{Config, Coordinator, HttpTransport};

/// Effective configuration: all config layers plus global CLI flags
pub fn load_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    config.merge(Config {
        api_url: global.api_url.clone(),
        ..Config::default()
    });
    config
}

/// Build a coordinator talking to the configured backend
///
/// `assume_yes` installs an approving confirmation hook; otherwise deletes
/// prompt on the terminal.
pub fn connect(global: &GlobalOpts, config: &Config, assume_yes: bool) -> Result<Coordinator<HttpTransport>> {
    let transport = HttpTransport::new(config.api_url(), config.token_provider(), config.timeout())?;
    let confirmation: Arc<dyn Confirmation> = if assume_yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(PromptConfirmation)
    };
    Ok(Coordinator::new(transport)
        .with_notifier(Arc::new(ConsoleNotifier::new(global.quiet)))
        .with_confirmation(confirmation))
}

/// `--format`, falling back to `default_format` from config
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(OutputFormat::from_config)
        .unwrap_or(OutputFormat::Auto)
}

/// `--page-size` when given, else the configured size
pub fn page_size(flag: Option<usize>, config: &Config) -> NonZeroUsize {
    flag.and_then(NonZeroUsize::new).unwrap_or_else(|| config.page_size())
}

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Print a value as YAML or JSON
pub fn print_serialized<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
        }
        _ => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Düsseldorfer Straße", 8), "Düsse...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_page_size_flag_wins() {
        let config = Config {
            page_size: Some(25),
            ..Config::default()
        };
        assert_eq!(page_size(Some(5), &config).get(), 5);
        assert_eq!(page_size(None, &config).get(), 25);
        assert_eq!(page_size(Some(0), &config).get(), 25);
    }
}
