use std::path::Path;

use anyhow::bail;
use clap::Parser;
use dialoguer::{Confirm, Select};
use phonepool::OwnerId;
use tracing::instrument;

use super::{session::Session, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Release one or all of an owner's numbers")]
pub struct Release {
    /// The owner releasing the number
    owner: OwnerId,

    /// The number to release. Omit to choose from the owner's numbers.
    #[arg(conflicts_with = "all")]
    number: Option<String>,

    /// Release every number bound to the owner
    #[arg(long)]
    all: bool,

    /// Do not ask for confirmation
    #[arg(long, short)]
    yes: bool,
}

impl Release {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut session = Session::open(root)?;

        if self.all {
            let held = session.pool.owner_count(self.owner);
            if held == 0 {
                println!("Owner {} holds no numbers", self.owner);
                return Ok(());
            }
            if !self.yes
                && !Confirm::new()
                    .with_prompt(format!("Release all {held} numbers of owner {}?", self.owner))
                    .default(false)
                    .interact()?
            {
                println!("Cancelled");
                return Ok(());
            }

            let released = session.pool.release_all(self.owner);
            session.save()?;
            println!(
                "{} Released {released} numbers from owner {}",
                "✅".success(),
                self.owner
            );
            return Ok(());
        }

        let number = match self.number {
            Some(number) => number,
            None => {
                let held = session.pool.numbers_of(self.owner);
                if held.is_empty() {
                    bail!("Owner {} holds no numbers", self.owner);
                }
                let labels: Vec<&str> = held.iter().map(|n| n.as_str()).collect();
                let Some(choice) = Select::new()
                    .with_prompt("Number to release")
                    .items(&labels)
                    .default(0)
                    .interact_opt()?
                else {
                    println!("Cancelled");
                    return Ok(());
                };
                held[choice].to_string()
            }
        };

        session.pool.release(self.owner, &number)?;
        session.save()?;
        println!(
            "{} Released {number} from owner {}",
            "✅".success(),
            self.owner
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use phonepool::OwnerId;
    use tempfile::tempdir;

    use super::{Release, Session};

    fn owner(id: i32) -> OwnerId {
        OwnerId::new(id).unwrap()
    }

    fn bind_numbers(root: &std::path::Path, id: i32, numbers: &[&str]) {
        let mut session = Session::open(root).unwrap();
        for number in numbers {
            session.pool.bind(owner(id), number).unwrap();
        }
        session.save().unwrap();
    }

    #[test]
    fn release_all_run_frees_every_number_of_the_owner() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        bind_numbers(root, 3, &["13800000000", "13900000004"]);
        bind_numbers(root, 4, &["15000000010"]);

        Release {
            owner: owner(3),
            number: None,
            all: true,
            yes: true,
        }
        .run(root)
        .expect("release command should succeed");

        let session = Session::open(root).unwrap();
        assert_eq!(session.pool.owner_count(owner(3)), 0);
        assert_eq!(session.pool.owner_count(owner(4)), 1);
        assert!(session.pool.is_unique("13900000004"));
    }

    #[test]
    fn release_run_frees_a_single_number() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        bind_numbers(root, 3, &["13800000000", "13800000001"]);

        Release {
            owner: owner(3),
            number: Some("13800000001".to_string()),
            all: false,
            yes: false,
        }
        .run(root)
        .expect("release command should succeed");

        let session = Session::open(root).unwrap();
        let held = session.pool.numbers_of(owner(3));
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].as_str(), "13800000000");
    }

    #[test]
    fn release_run_rejects_number_of_another_owner() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        bind_numbers(root, 3, &["13800000000"]);

        let result = Release {
            owner: owner(9),
            number: Some("13800000000".to_string()),
            all: false,
            yes: false,
        }
        .run(root);

        assert!(result.is_err());
        let session = Session::open(root).unwrap();
        assert_eq!(session.pool.owner_count(owner(3)), 1);
    }
}
