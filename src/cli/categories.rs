use std::path::Path;

use clap::Parser;
use phonepool::pool::Availability;
use tracing::instrument;

use super::{
    session::Session,
    terminal::{bar, is_narrow, Colorize},
};

const BAR_WIDTH: usize = 24;

#[derive(Debug, Parser)]
#[command(about = "Show categories and segments of free numbers")]
pub struct Categories {
    /// Show the segments within this category
    #[arg(long, short)]
    category: Option<String>,
}

impl Categories {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let session = Session::open(root)?;
        let pool = &session.pool;
        let config = &session.config;

        match self.category {
            None => {
                let groups = pool.availability(config.category_digits());
                print_groups("Category", &groups);
            }
            Some(category) => {
                let groups: Vec<Availability> = pool
                    .segments_in_category(&category, config.segment_digits(), usize::MAX)
                    .into_iter()
                    .map(|prefix| Availability {
                        free: pool.count_free_by_prefix(&prefix),
                        prefix,
                    })
                    .collect();
                if groups.is_empty() {
                    println!("No free numbers in category {category}");
                    return Ok(());
                }
                print_groups(&format!("Segments of {category}"), &groups);
            }
        }
        Ok(())
    }
}

fn print_groups(title: &str, groups: &[Availability]) {
    if groups.is_empty() {
        println!("No free numbers are available");
        return;
    }

    println!("{title}");
    println!("{}", "─".repeat(title.chars().count()).dim());
    let max = groups.iter().map(|g| g.free).max().unwrap_or(0);
    for group in groups {
        if is_narrow() {
            println!("{}  {}", group.prefix, group.free);
        } else {
            println!(
                "{:<8} {:>8}  {}",
                group.prefix,
                group.free,
                bar(group.free, max, BAR_WIDTH).dim()
            );
        }
    }
}
