use anyhow::{Context, Result};

use crate::{github, spinner};

pub fn run(number: u32) -> Result<()> {
    let context = super::load_context()?;

    let details = spinner::with_spinner(&format!("Fetching PR #{}", number), || {
        github::get_pr_details(&context.resolved.identity, number)
    })
    .with_context(|| format!("Failed to fetch details for PR #{}", number))?;

    let state = if details.draft {
        format!("{} (draft)", details.state)
    } else {
        details.state.clone()
    };

    println!("PR #{}: {}", details.number, details.title);
    println!("Author: {}", details.author);
    println!("State:  {}", state);
    println!(
        "Head:   {} ({})",
        details.head_ref,
        details.head_repo_full_name.as_deref().unwrap_or("<deleted repository>")
    );
    println!("Base:   {} ({})", details.base_ref, details.base);
    println!("URL:    {}", details.html_url);

    Ok(())
}
