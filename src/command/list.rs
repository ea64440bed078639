use std::fmt;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::{github, spinner};

/// Which pull requests to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StateFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl StateFilter {
    fn as_api_param(self) -> &'static str {
        match self {
            StateFilter::Open => "open",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_param())
    }
}

pub fn run(state: StateFilter, limit: u32) -> Result<()> {
    let context = super::load_context()?;
    let identity = &context.resolved.identity;

    let prs = spinner::with_spinner(&format!("Fetching pull requests for {}", identity), || {
        github::list_prs(identity, state.as_api_param(), limit)
    })
    .with_context(|| format!("Failed to list pull requests for {}", identity))?;

    if prs.is_empty() {
        println!("No {} pull requests in {}.", state, identity);
        return Ok(());
    }

    for pr in &prs {
        let marker = if pr.draft { " [draft]" } else { "" };
        println!("#{:<5} {}{} ({})", pr.number, pr.title, marker, pr.author);
    }

    Ok(())
}
