use std::path::Path;

use anyhow::bail;
use clap::Parser;
use dialoguer::{Confirm, Select};
use phonepool::{pool::query::sort_numbers, OwnerId, PhoneNumber, ResourcePool};
use rand::{seq::SliceRandom, Rng};
use tracing::instrument;

use super::{
    session::Session,
    terminal::{tagged, Colorize},
};

/// The most choices offered at each step of the interactive picker.
const MAX_CHOICES: usize = 10;

/// The last entry of the number list, which redraws the suggestions.
const REFRESH: &str = "↻ Show other numbers";

#[derive(Debug, Parser)]
#[command(about = "Bind a number to an owner")]
pub struct Bind {
    /// The owner to bind to
    owner: OwnerId,

    /// The number to bind. Omit to pick interactively.
    #[arg(conflicts_with = "random")]
    number: Option<String>,

    /// Bind a random free number
    #[arg(long)]
    random: bool,

    /// Restrict random picks to numbers starting with these digits
    #[arg(long, requires = "random")]
    prefix: Option<String>,
}

impl Bind {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut session = Session::open(root)?;

        let number = match (self.number, self.random) {
            (Some(number), _) => number,
            (None, true) => random_number(&session.pool, self.prefix.as_deref())?.to_string(),
            (None, false) => match pick_interactively(&session, self.owner)? {
                Some(number) => number.to_string(),
                None => {
                    println!("Cancelled");
                    return Ok(());
                }
            },
        };

        let bound = session.pool.bind(self.owner, &number)?;
        session.save()?;

        let held = session.pool.owner_count(self.owner);
        println!(
            "{} Bound {} to owner {}",
            "✅".success(),
            tagged(&bound),
            self.owner
        );
        println!(
            "{}",
            format!(
                "Owner {} now holds {held} of {} numbers",
                self.owner,
                session.pool.owner_limit()
            )
            .dim()
        );
        Ok(())
    }
}

fn random_number(pool: &ResourcePool, prefix: Option<&str>) -> anyhow::Result<PhoneNumber> {
    let Some(prefix) = prefix else {
        return Ok(pool.pick_random_free()?);
    };

    let candidates = pool.list_free_by_prefix(prefix, usize::MAX);
    match candidates.choose(&mut rand::thread_rng()) {
        Some(number) => Ok(number.clone()),
        None => bail!("No free numbers start with '{prefix}'"),
    }
}

/// Walks the user from category to segment to number.
///
/// Returns `None` if the user backs out.
fn pick_interactively(session: &Session, owner: OwnerId) -> anyhow::Result<Option<PhoneNumber>> {
    let pool = &session.pool;
    let config = &session.config;

    let held = pool.owner_count(owner);
    if held >= pool.owner_limit() {
        bail!(
            "Owner {owner} already holds the maximum of {} numbers",
            pool.owner_limit()
        );
    }

    let categories = pool.categories_or_default(config.category_digits(), MAX_CHOICES);
    let Some(category) = choose_prefix(pool, "Category", &categories)? else {
        return Ok(None);
    };

    let segments =
        pool.segments_in_category(category, config.segment_digits(), MAX_CHOICES);
    if segments.is_empty() {
        bail!("No free numbers in category {category}");
    }
    let Some(segment) = choose_prefix(pool, "Segment", &segments)? else {
        return Ok(None);
    };

    let free = pool.list_free_by_prefix(segment, usize::MAX);
    let mut rng = rand::thread_rng();
    let number = loop {
        let candidates = suggestions(&free, MAX_CHOICES, &mut rng);
        let mut labels: Vec<String> = candidates.iter().map(tagged).collect();
        labels.push(REFRESH.dim());

        let Some(choice) = Select::new()
            .with_prompt(format!("Number in {segment}"))
            .items(&labels)
            .default(0)
            .interact_opt()?
        else {
            return Ok(None);
        };
        if let Some(number) = candidates.get(choice) {
            break number.clone();
        }
    };

    let confirmed = Confirm::new()
        .with_prompt(format!("Bind {number} to owner {owner}?"))
        .default(true)
        .interact()?;

    Ok(confirmed.then_some(number))
}

/// Draws up to `max_count` distinct numbers from `free`, sorted ascending.
fn suggestions<R: Rng + ?Sized>(
    free: &[PhoneNumber],
    max_count: usize,
    rng: &mut R,
) -> Vec<PhoneNumber> {
    let mut picked: Vec<PhoneNumber> = free.choose_multiple(rng, max_count).cloned().collect();
    sort_numbers(&mut picked);
    picked
}

fn choose_prefix<'a>(
    pool: &ResourcePool,
    prompt: &str,
    prefixes: &'a [String],
) -> anyhow::Result<Option<&'a str>> {
    let labels: Vec<String> = prefixes
        .iter()
        .map(|prefix| format!("{prefix}  ({} free)", pool.count_free_by_prefix(prefix)))
        .collect();

    let choice = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact_opt()?;

    Ok(choice.map(|i| prefixes[i].as_str()))
}

#[cfg(test)]
mod tests {
    use phonepool::OwnerId;
    use rand::{rngs::StdRng, SeedableRng};
    use tempfile::tempdir;

    use super::*;

    fn owner(id: i32) -> OwnerId {
        OwnerId::new(id).unwrap()
    }

    #[test]
    fn bind_run_binds_explicit_number() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();

        Bind {
            owner: owner(7),
            number: Some("13800000000".to_string()),
            random: false,
            prefix: None,
        }
        .run(root)
        .expect("bind command should succeed");

        let session = Session::open(root).unwrap();
        let index = session.pool.find("13800000000").unwrap();
        let record = session.pool.get(index).unwrap();
        assert!(record.is_owned_by(owner(7)));
        assert!(record.assigned_at().is_some());
    }

    #[test]
    fn bind_run_random_respects_prefix() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();

        Bind {
            owner: owner(2),
            number: None,
            random: true,
            prefix: Some("150".to_string()),
        }
        .run(root)
        .expect("bind command should succeed");

        let session = Session::open(root).unwrap();
        let held = session.pool.numbers_of(owner(2));
        assert_eq!(held.len(), 1);
        assert!(held[0].starts_with("150"));
        assert_eq!(session.pool.count_free(), 149);
    }

    #[test]
    fn bind_run_random_fails_when_prefix_has_no_free_numbers() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();

        let result = Bind {
            owner: owner(2),
            number: None,
            random: true,
            prefix: Some("186".to_string()),
        }
        .run(root);

        assert!(result.is_err());
        assert!(!root.join("phones.dat").exists());
    }

    #[test]
    fn bind_run_reports_taken_number() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let bind = |id| Bind {
            owner: owner(id),
            number: Some("13900000001".to_string()),
            random: false,
            prefix: None,
        };

        bind(1).run(root).unwrap();
        let err = bind(2).run(root).unwrap_err();

        assert!(err.to_string().contains("13900000001"));
        let session = Session::open(root).unwrap();
        assert_eq!(session.pool.owner_count(owner(2)), 0);
    }

    #[test]
    fn suggestions_are_distinct_sorted_and_capped() {
        let mut pool = ResourcePool::default();
        pool.generate("139", 30).unwrap();
        let free = pool.list_free_by_prefix("139", usize::MAX);
        let mut rng = StdRng::seed_from_u64(11);

        let picked = suggestions(&free, MAX_CHOICES, &mut rng);

        assert_eq!(picked.len(), MAX_CHOICES);
        assert!(picked.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(picked.iter().all(|number| free.contains(number)));

        assert_eq!(suggestions(&free[..3], MAX_CHOICES, &mut rng).len(), 3);
    }
}
