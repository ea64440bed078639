use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};

use crate::command;
use crate::command::list::StateFilter;
use crate::plan::NamingMode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "prdock")]
#[command(about = "Bring GitHub pull requests into your local git repository")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a pull request and check it out as a local branch
    #[command(visible_alias = "co")]
    Checkout {
        /// Pull request number
        number: u32,

        /// Branch naming mode (overrides the configured default)
        #[arg(long, value_enum)]
        naming: Option<NamingMode>,

        /// Reset an existing local branch without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Show a pull request's metadata
    View {
        /// Pull request number
        number: u32,
    },

    /// List pull requests for the current repository
    #[command(visible_alias = "ls")]
    List {
        /// Which pull requests to include
        #[arg(long, value_enum, default_value_t = StateFilter::Open)]
        state: StateFilter,

        /// Maximum number of pull requests to fetch
        #[arg(long, default_value_t = 30)]
        limit: u32,
    },

    /// Show the GitHub repository resolved from the configured remotes
    Repo,

    /// Generate an example .prdock.yaml configuration file
    Init,

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// --- Public Entry Point ---
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Checkout {
            number,
            naming,
            force,
        } => command::checkout::run(number, naming, force),
        Commands::View { number } => command::view::run(number),
        Commands::List { state, limit } => command::list::run(state, limit),
        Commands::Repo => command::repo::run(),
        Commands::Init => crate::config::Config::init(),
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &name, &mut io::stdout());
}
