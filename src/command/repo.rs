use anyhow::Result;

pub fn run() -> Result<()> {
    let context = super::load_context()?;

    println!("Repository: {}", context.resolved.identity);
    println!("Remote:     {}", context.resolved.remote);
    println!("Root:       {}", context.repo_root.display());

    Ok(())
}
