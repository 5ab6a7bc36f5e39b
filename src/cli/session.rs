//! Loading and saving the pool for a single command.

use std::path::{Path, PathBuf};

use anyhow::Context;
use phonepool::{storage, Config, Origin, ResourcePool};

use super::CONFIG_FILE;

/// The configuration and pool of a data directory.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub pool: ResourcePool,
    pool_path: PathBuf,
}

impl Session {
    /// Opens the pool in `root`, generating the configured segments if no
    /// pool file exists yet.
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let config = load_config(root);
        let pool_path = root.join(config.pool_file());

        let (pool, origin) = storage::open(&pool_path, &config)
            .with_context(|| format!("Failed to open pool file {}", pool_path.display()))?;

        if let Origin::Seeded { added } = origin {
            tracing::info!(
                "Generated {added} numbers; run a mutating command to persist them to {}",
                pool_path.display()
            );
        }

        Ok(Self {
            config,
            pool,
            pool_path,
        })
    }

    /// Writes the pool back to its file.
    pub fn save(&self) -> anyhow::Result<()> {
        storage::save(&self.pool, &self.pool_path)
            .with_context(|| format!("Failed to save pool file {}", self.pool_path.display()))
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use phonepool::{domain::SegmentSeed, OwnerId};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn open_seeds_default_segments_without_writing() {
        let tmp = tempdir().unwrap();

        let session = Session::open(tmp.path()).unwrap();

        assert_eq!(session.pool.count(), 150);
        assert_eq!(session.config, Config::default());
        assert!(!tmp.path().join("phones.dat").exists());
    }

    #[test]
    fn open_loads_saved_pool_and_honours_config() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let mut config = Config::default();
        config.set_owner_limit(1);
        config.segments = vec![SegmentSeed {
            segment: "177".to_string(),
            count: 4,
        }];
        config.save(&root.join(CONFIG_FILE)).unwrap();

        let mut session = Session::open(root).unwrap();
        assert_eq!(session.pool.count(), 4);
        assert_eq!(session.pool.owner_limit(), 1);
        let owner = OwnerId::new(5).unwrap();
        session.pool.bind(owner, "17700000002").unwrap();
        session.save().unwrap();

        let mut reopened = Session::open(root).unwrap();
        assert_eq!(reopened.pool, session.pool);
        assert!(reopened.pool.bind(owner, "17700000003").is_err());
    }

    #[test]
    fn open_falls_back_to_defaults_on_unreadable_config() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "not = [valid").unwrap();

        let session = Session::open(tmp.path()).unwrap();
        assert_eq!(session.config, Config::default());
    }

    #[test]
    fn open_reports_corrupt_pool_file() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("phones.dat"), [1, 0, 0]).unwrap();

        let err = Session::open(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to open pool file"));
    }
}
