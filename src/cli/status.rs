use std::path::Path;

use clap::Parser;
use phonepool::{pool::Availability, Summary};
use tracing::instrument;

use super::{
    session::Session,
    terminal::{bar, is_narrow, Colorize},
};

const BAR_WIDTH: usize = 20;

#[derive(Debug, Parser, Default)]
#[command(about = "Show pool totals and per-category availability")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let session = Session::open(root)?;
        let summary = session.pool.summary();
        let categories = session
            .pool
            .availability(session.config.category_digits());

        if summary.total() == 0 {
            println!("The pool is empty. Generate numbers with 'phonepool generate'.");
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => Self::output_json(&summary, &categories)?,
            OutputFormat::Table if self.quiet => Self::output_quiet(&summary),
            OutputFormat::Table => Self::output_table(&summary, &categories),
        }

        Ok(())
    }

    fn output_json(summary: &Summary, categories: &[Availability]) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "total": summary.total(),
            "free": summary.free,
            "assigned": summary.assigned,
            "inactive": summary.inactive,
            "capacity": summary.capacity,
            "categories": categories,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(summary: &Summary) {
        println!(
            "total={} free={} assigned={} inactive={} capacity={}",
            summary.total(),
            summary.free,
            summary.assigned,
            summary.inactive,
            summary.capacity
        );
    }

    fn output_table(summary: &Summary, categories: &[Availability]) {
        println!("Phone pool");
        println!("{}", "──────────".dim());
        println!("{:<10} {}", "Total", summary.total());
        println!("{:<10} {}", "Free", summary.free.to_string().success());
        println!("{:<10} {}", "Assigned", summary.assigned);
        if summary.inactive > 0 {
            println!("{:<10} {}", "Inactive", summary.inactive.to_string().dim());
        }
        println!(
            "{:<10} {}",
            "Capacity",
            summary.capacity.to_string().dim()
        );
        println!();

        if categories.is_empty() {
            println!("Free numbers: {} ⚠️", "0".warning());
            println!("{}", "Run 'phonepool generate' to add a segment.".dim());
            return;
        }

        println!("Free by category");
        println!("{}", "────────────────".dim());
        let max = categories.iter().map(|c| c.free).max().unwrap_or(0);
        for category in categories {
            if is_narrow() {
                println!("{}x: {}", category.prefix, category.free);
            } else {
                println!(
                    "{:<6} {:>8} {}",
                    format!("{}x", category.prefix),
                    category.free,
                    bar(category.free, max, BAR_WIDTH).dim()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn status_run_succeeds_in_every_format() {
        let tmp = tempdir().unwrap();

        for (output, quiet) in [
            (OutputFormat::Table, false),
            (OutputFormat::Table, true),
            (OutputFormat::Json, false),
        ] {
            Status { output, quiet }
                .run(tmp.path())
                .expect("status command should succeed");
        }
        assert!(!tmp.path().join("phones.dat").exists());
    }
}
