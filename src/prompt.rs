//! User input and interaction handling.

use crate::error::{Error, Result};
use dialoguer::{Confirm, Input, MultiSelect, Select};

/// Source of answers for the question flow.
pub trait Prompter {
    /// Asks for free text, returning `default` when the user just presses enter.
    fn input(&self, prompt: &str, default: &str) -> Result<String>;

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Returns the index of the chosen item.
    fn select(&self, prompt: &str, items: &[&str], default: usize) -> Result<usize>;

    /// Returns the indices of the chosen items, in item order.
    fn multi_select(&self, prompt: &str, items: &[&str], defaults: &[bool]) -> Result<Vec<usize>>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

fn prompt_error(err: dialoguer::Error) -> Error {
    Error::PromptError(err.to_string())
}

impl Prompter for DialoguerPrompter {
    fn input(&self, prompt: &str, default: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .interact_text()
            .map_err(prompt_error)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::new().with_prompt(prompt).default(default).interact().map_err(prompt_error)
    }

    fn select(&self, prompt: &str, items: &[&str], default: usize) -> Result<usize> {
        Select::new()
            .with_prompt(prompt)
            .default(default)
            .items(items)
            .interact()
            .map_err(prompt_error)
    }

    fn multi_select(&self, prompt: &str, items: &[&str], defaults: &[bool]) -> Result<Vec<usize>> {
        MultiSelect::new()
            .with_prompt(prompt)
            .items(items)
            .defaults(defaults)
            .interact()
            .map_err(prompt_error)
    }
}
