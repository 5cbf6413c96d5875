//! Confirmation hook for destructive operations
//!
//! The coordinator asks its [`Confirmation`] before every delete. Callers
//! that want to skip the prompt must install [`AssumeYes`] explicitly.

use dialoguer::{theme::ColorfulTheme, Confirm};

pub trait Confirmation: Send + Sync {
    /// Return `true` to let the operation proceed
    fn confirm(&self, prompt: &str) -> bool;
}

/// Interactive yes/no prompt on the terminal, defaulting to "no"
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptConfirmation;

impl Confirmation for PromptConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Approves everything (`--yes`)
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirmation for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Declines everything; useful for non-interactive sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeNo;

impl Confirmation for AssumeNo {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}
