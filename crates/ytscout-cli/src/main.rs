mod discover;
mod enrich;
mod niches;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ytscout")]
#[command(about = "Discover YouTube channels by niche and enrich them with ViewStats analytics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search YouTube for channels in a niche and add new ones to the table
    Discover {
        /// Niche keyword to search for (e.g. "cooking")
        #[arg(long)]
        niche: String,
        /// Minimum subscriber count (inclusive)
        #[arg(long)]
        min_subs: u64,
        /// Maximum subscriber count (inclusive)
        #[arg(long)]
        max_subs: u64,
        /// Two-letter country code to keep (e.g. US)
        #[arg(long)]
        country: Option<String>,
        /// Number of NEW channels to find
        #[arg(long, default_value = "10")]
        target: u32,
        /// Maximum search pages to request (overrides `YTSCOUT_MAX_SEARCH_PAGES`)
        #[arg(long)]
        max_pages: Option<u32>,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
        /// Print the quota estimate and exit without calling the API
        #[arg(long)]
        dry_run: bool,
    },
    /// Fill in ViewStats analytics for rows that have none yet
    Enrich {
        /// Maximum number of channels to process
        #[arg(long)]
        limit: Option<usize>,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// List popular niche keywords
    Niches,
}

impl Commands {
    /// Whether the command reads `AppConfig`. `niches` and the bare binary
    /// work without any environment.
    fn needs_config(&self) -> bool {
        matches!(self, Commands::Discover { .. } | Commands::Enrich { .. })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Some(command) if command.needs_config() => command,
        Some(_) => {
            niches::print_niches();
            return Ok(());
        }
        None => {
            println!("ytscout: run `ytscout --help` for commands");
            niches::print_niches_hint();
            return Ok(());
        }
    };

    // Loads `.env` before reading the environment.
    let config = ytscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(
        env = %config.env,
        database = %config.database_csv.display(),
        "configuration loaded"
    );

    match command {
        Commands::Discover {
            niche,
            min_subs,
            max_subs,
            country,
            target,
            max_pages,
            yes,
            dry_run,
        } => {
            let args = discover::DiscoverArgs {
                niche,
                min_subs,
                max_subs,
                country,
                target,
                max_pages: max_pages.unwrap_or(config.max_search_pages),
                yes,
                dry_run,
            };
            discover::run_discover(&config, &args).await?;
        }
        Commands::Enrich { limit, yes } => enrich::run_enrich(&config, limit, yes).await?,
        Commands::Niches => niches::print_niches(),
    }

    Ok(())
}

/// Ask for a yes/no confirmation on the terminal. Defaults to "no".
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
