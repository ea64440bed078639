use anyhow::{Context, Result};
use console::style;

use crate::plan::{self, NamingMode};
use crate::workflow::{self, Overwrite};
use crate::{git, github, spinner};

pub fn run(number: u32, naming: Option<NamingMode>, force: bool) -> Result<()> {
    let context = super::load_context()?;
    let mode = naming.unwrap_or(context.config.branch_naming);

    let details = spinner::with_spinner(&format!("Fetching PR #{}", number), || {
        github::get_pr_details(&context.resolved.identity, number)
    })
    .with_context(|| format!("Failed to fetch details for PR #{}", number))?;

    // Display PR information before doing anything to the repository.
    println!("PR #{}: {}", details.number, details.title);
    println!("Author: {}", details.author);
    println!("Branch: {}", details.head_ref);

    if !details.state.eq_ignore_ascii_case("open") {
        eprintln!(
            "⚠️  Warning: PR #{} is {}. Proceeding with checkout...",
            number,
            details.state.to_uppercase()
        );
    }
    if details.draft {
        eprintln!("⚠️  Warning: PR #{} is a DRAFT.", number);
    }

    let plan = plan::plan_checkout(&details.to_pull_request_ref(), &context.resolved, mode)?;

    // The PR branch is upstream-authoritative: updating an existing local
    // branch discards its local commits, which needs an explicit go-ahead.
    let overwrite = if force {
        Overwrite::Allow
    } else if git::branch_exists(&context.repo_root, &plan.local_branch)? {
        let question = format!(
            "Local branch '{}' already exists and will be reset to {}/{}, discarding any local commits. Continue?",
            plan.local_branch, plan.remote_name, plan.fetch_ref
        );
        if !super::confirm(&question)? {
            println!("Aborted.");
            return Ok(());
        }
        Overwrite::Allow
    } else {
        Overwrite::Deny
    };

    let outcome = workflow::execute(&context.repo_root, &plan, number, overwrite)
        .with_context(|| format!("Failed to check out PR #{}", number))?;

    if let Some(upsert) = outcome.remote_registered {
        let verb = match upsert {
            git::RemoteUpsert::Added => "Added",
            git::RemoteUpsert::Updated => "Updated",
        };
        println!("{} {} fork remote '{}'", style("✓").green(), verb, outcome.remote);
    }
    if outcome.reset_existing {
        println!(
            "{} Reset existing branch '{}' to {}/{}",
            style("✓").green(),
            outcome.branch,
            outcome.remote,
            plan.fetch_ref
        );
    }
    println!(
        "{} Checked out PR #{} on branch '{}'",
        style("✓").green(),
        number,
        outcome.branch
    );

    Ok(())
}
