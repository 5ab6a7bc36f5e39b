//! Saving and loading the pool file.
//!
//! Writes truncate the file in place: a failure part-way through leaves a
//! truncated file behind.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use tracing::instrument;

use super::codec::{self, Error};
use crate::{domain::Config, pool::ResourcePool};

/// Writes the whole pool to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or fully written, or if
/// the pool is too large for the file format.
#[instrument(skip(pool), fields(count = pool.count()))]
pub fn save(pool: &ResourcePool, path: &Path) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    codec::encode(pool, &mut writer)?;
    writer.flush()?;
    tracing::debug!("Saved {} records to {}", pool.count(), path.display());
    Ok(())
}

/// Replaces the contents of `pool` with the records stored at `path`.
///
/// The file is fully decoded and validated first; on error the pool is left
/// unchanged.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unsupported version, or
/// is corrupt.
#[instrument(skip(pool))]
pub fn load(pool: &mut ResourcePool, path: &Path) -> Result<(), Error> {
    let file = File::open(path)?;
    let snapshot = codec::decode(BufReader::new(file))?;
    codec::restore(pool, snapshot)?;
    tracing::debug!("Loaded {} records from {}", pool.count(), path.display());
    Ok(())
}

/// How a pool was obtained by [`open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The pool was read from an existing file.
    Loaded,
    /// No file existed; the pool was generated from the configured segments.
    Seeded {
        /// The number of records generated.
        added: usize,
    },
}

/// Builds the pool described by `config`, loading it from `path`.
///
/// If `path` does not exist, the configured segments are generated instead.
/// Nothing is written to disk.
///
/// # Errors
///
/// Any failure to load an existing file is returned. A corrupt or
/// incompatible file is never silently replaced.
#[instrument(skip(config))]
pub fn open(path: &Path, config: &Config) -> Result<(ResourcePool, Origin), Error> {
    let mut pool =
        ResourcePool::new(config.initial_capacity()).with_owner_limit(config.owner_limit());

    match load(&mut pool, path) {
        Ok(()) => Ok((pool, Origin::Loaded)),
        Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(
                "No pool file at {}, generating default segments",
                path.display()
            );
            let added = pool.seed(&config.segments);
            Ok((pool, Origin::Seeded { added }))
        }
        Err(e) => Err(e),
    }
}
