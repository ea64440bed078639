//! Command layer: user interaction around the core and the workflow.

pub mod checkout;
pub mod list;
pub mod repo;
pub mod view;

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::git;
use crate::workflow::WorkflowContext;

/// Resolve the repository the command operates on: probe for the working
/// tree first (so "not a repository" is reported before anything else),
/// then load configuration from its root.
pub(crate) fn load_context() -> Result<WorkflowContext> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let repo_root = git::repo_root(&cwd)?;
    let config = Config::load(Some(&repo_root))?;
    WorkflowContext::at(config, &repo_root)
}

/// Ask a yes/no question, defaulting to no.
pub(crate) fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read user input")?;

    Ok(input.trim().to_lowercase() == "y")
}
