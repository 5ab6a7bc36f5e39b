use std::path::Path;

use clap::Parser;
use tracing::instrument;

use super::{session::Session, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Generate sequential numbers from a segment")]
pub struct Generate {
    /// The leading digits, e.g. 138
    segment: String,

    /// How many numbers to generate
    ///
    /// Clamped to the size of the segment's suffix space. Numbers already in
    /// the pool are skipped.
    count: usize,
}

impl Generate {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut session = Session::open(root)?;
        let before = session.pool.count();

        let added = session.pool.generate(&self.segment, self.count)?;
        session.save()?;

        if added == 0 {
            println!(
                "{}",
                format!("Segment {} is already fully generated", self.segment).warning()
            );
        } else {
            println!(
                "{} Generated {added} numbers from segment {}",
                "✅".success(),
                self.segment
            );
        }
        println!(
            "{}",
            format!(
                "Pool: {before} -> {} records (capacity {})",
                session.pool.count(),
                session.pool.capacity()
            )
            .dim()
        );
        Ok(())
    }
}
