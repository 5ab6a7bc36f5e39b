use std::path::{Path, PathBuf};

mod bind;
mod categories;
mod generate;
mod list;
mod release;
mod session;
mod status;
mod terminal;

use bind::Bind;
use categories::Categories;
use clap::ArgAction;
use generate::Generate;
use indicatif::{ProgressBar, ProgressStyle};
use list::List;
use phonepool::{domain::is_valid_number, storage, Config, ResourcePool};
use release::Release;
use session::Session;
use status::Status;
use terminal::Colorize;
use tracing::instrument;

/// The configuration file name within the data root.
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The directory holding the configuration and pool file
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(&self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show pool totals and availability (default)
    Status(Status),

    /// Initialize a data directory with a default configuration and pool
    Init,

    /// Generate numbers from a segment
    Generate(Generate),

    /// Bind a number to an owner
    ///
    /// Without a number, an interactive picker walks through categories and
    /// segments of free numbers.
    Bind(Bind),

    /// Release one or all of an owner's numbers
    Release(Release),

    /// List free numbers, or the numbers bound to an owner
    List(List),

    /// Show categories and segments of free numbers
    Categories(Categories),

    /// Suggest random free numbers
    Pick(Pick),

    /// Check whether a number is available
    Check(Check),
}

impl Command {
    fn run(self, root: &Path) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Init => Init::run(root)?,
            Self::Generate(command) => command.run(root)?,
            Self::Bind(command) => command.run(root)?,
            Self::Release(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Categories(command) => command.run(root)?,
            Self::Pick(command) => command.run(root)?,
            Self::Check(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            anyhow::bail!(
                "Data directory already initialized (found existing {})",
                config_path.display()
            );
        }

        let config = Config::default();
        let pool_path = root.join(config.pool_file());
        if pool_path.exists() {
            anyhow::bail!(
                "A pool file already exists at {}; refusing to replace it",
                pool_path.display()
            );
        }

        std::fs::create_dir_all(root)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;

        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_FILE}: {e}"))?;

        let mut pool =
            ResourcePool::new(config.initial_capacity()).with_owner_limit(config.owner_limit());

        let progress = ProgressBar::new(config.segments.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{bar:30.cyan/blue} {pos}/{len} {msg}")?
                .progress_chars("##-"),
        );
        let mut added = 0;
        for seed in &config.segments {
            progress.set_message(format!("segment {}", seed.segment));
            match pool.generate(&seed.segment, seed.count) {
                Ok(count) => added += count,
                Err(e) => {
                    progress.suspend(|| {
                        eprintln!(
                            "{}",
                            format!("⚠️  Skipped segment {}: {e}", seed.segment).warning()
                        );
                    });
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        storage::save(&pool, &pool_path)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", pool_path.display()))?;

        println!("Initialized phone pool in {}", root.display());
        println!("  Created: {CONFIG_FILE}");
        println!("  Created: {} ({added} numbers)", config.pool_file());
        println!();
        println!("Next steps:");
        println!("  phonepool bind <OWNER>");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Pick {
    /// How many numbers to suggest
    #[arg(long, short, default_value_t = 5)]
    count: usize,
}

impl Pick {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let session = Session::open(root)?;
        let mut numbers = session.pool.pick_random_free_many(self.count);
        if numbers.is_empty() {
            anyhow::bail!("No free numbers are available");
        }
        phonepool::pool::query::sort_numbers(&mut numbers);

        for number in &numbers {
            println!("{number}");
        }
        if numbers.len() < self.count {
            println!(
                "{}",
                format!("Only {} free numbers available", numbers.len()).dim()
            );
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Check {
    /// The number to check
    number: String,
}

impl Check {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        if !is_valid_number(&self.number) {
            anyhow::bail!("'{}' is not an 11 digit phone number", self.number);
        }
        let session = Session::open(root)?;

        if !session.pool.is_unique(&self.number) {
            println!("{} {}", self.number, "is taken".warning());
        } else if session.pool.contains(&self.number) {
            println!("{} {}", self.number, "is available".success());
        } else {
            println!("{} {}", self.number, "is not in the pool".dim());
        }
        Ok(())
    }
}
