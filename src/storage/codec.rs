//! The binary pool file format.
//!
//! All integers are little-endian `i32`. The file is a 12 byte header
//! followed by `count` fixed-size records in pool order:
//!
//! ```text
//! header:  version | count | capacity
//! record:  number[12] | status | owner | assigned_at[20]
//! ```
//!
//! Text fields are NUL-padded. `owner` is `-1` for unbound records and
//! `assigned_at` is empty unless the record is assigned.

use std::{
    collections::HashSet,
    io::{self, Read, Write},
};

use chrono::NaiveDateTime;
use tracing::instrument;

use crate::{
    domain::{
        record::TIMESTAMP_FORMAT, Assignment, OwnerId, PhoneNumber, ResourceRecord, State, Status,
    },
    pool::{self, ResourcePool},
};

/// The only supported format version.
pub const FORMAT_VERSION: i32 = 1;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 12;

/// Width of the NUL-padded number field.
pub const NUMBER_FIELD_SIZE: usize = 12;

/// Width of the NUL-padded timestamp field.
pub const TIMESTAMP_FIELD_SIZE: usize = 20;

/// Record size in bytes (number + status + owner + timestamp).
pub const RECORD_SIZE: usize = NUMBER_FIELD_SIZE + 4 + 4 + TIMESTAMP_FIELD_SIZE;

const UNBOUND_OWNER: i32 = -1;

/// The pool file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Format version.
    pub version: i32,
    /// Number of records that follow.
    pub count: i32,
    /// Pool capacity at the time of writing.
    pub capacity: i32,
}

impl Header {
    /// Serialize header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.version.to_le_bytes());
        buf[4..8].copy_from_slice(&self.count.to_le_bytes());
        buf[8..12].copy_from_slice(&self.capacity.to_le_bytes());
        buf
    }

    /// Parse header from bytes.
    #[must_use]
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        Self {
            version: read_i32(buf, 0),
            count: read_i32(buf, 4),
            capacity: read_i32(buf, 8),
        }
    }
}

/// The decoded contents of a pool file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The stored capacity.
    pub capacity: usize,
    /// The stored records, in pool order.
    pub records: Vec<ResourceRecord>,
}

/// Writes `pool` in the pool file format.
///
/// # Errors
///
/// - [`Error::TooLarge`] if the count or capacity exceed `i32`
/// - [`Error::Io`] if writing fails
#[instrument(level = "debug", skip_all, fields(count = pool.count()))]
pub fn encode<W: Write>(pool: &ResourcePool, mut writer: W) -> Result<(), Error> {
    let header = Header {
        version: FORMAT_VERSION,
        count: i32::try_from(pool.count()).map_err(|_| Error::TooLarge("record count"))?,
        capacity: i32::try_from(pool.capacity()).map_err(|_| Error::TooLarge("capacity"))?,
    };
    writer.write_all(&header.to_bytes())?;

    for record in pool.records() {
        writer.write_all(&encode_record(record))?;
    }
    Ok(())
}

/// Reads a pool file.
///
/// Every record is validated before anything is returned.
///
/// # Errors
///
/// - [`Error::Io`] if reading fails, including a truncated file
/// - [`Error::UnsupportedVersion`] if the version is not [`FORMAT_VERSION`]
/// - [`Error::Corrupt`] if the header or any record is invalid
#[instrument(level = "debug", skip_all)]
pub fn decode<R: Read>(mut reader: R) -> Result<Snapshot, Error> {
    let mut buf = [0u8; HEADER_SIZE];
    reader.read_exact(&mut buf)?;
    let header = Header::from_bytes(&buf);

    if header.version != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion(header.version));
    }
    let count = usize::try_from(header.count)
        .map_err(|_| Error::Corrupt(format!("negative record count {}", header.count)))?;
    let capacity = usize::try_from(header.capacity)
        .map_err(|_| Error::Corrupt(format!("negative capacity {}", header.capacity)))?;
    if count > capacity {
        return Err(Error::Corrupt(format!(
            "record count {count} exceeds capacity {capacity}"
        )));
    }

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut buf = [0u8; RECORD_SIZE];
    for position in 0..count {
        reader.read_exact(&mut buf)?;
        let record = decode_record(position, &buf)?;
        if !seen.insert(record.number().clone()) {
            return Err(Error::Corrupt(format!(
                "record {position}: duplicate number {}",
                record.number()
            )));
        }
        records.push(record);
    }

    tracing::debug!("Decoded {count} records (capacity {capacity})");
    Ok(Snapshot { capacity, records })
}

/// Replaces the contents of `pool` with a decoded snapshot.
///
/// The pool grows to the stored capacity. Records already in the pool are
/// discarded, not merged.
///
/// # Errors
///
/// Returns [`Error::Pool`] if storage for the decoded records cannot be
/// allocated.
pub fn restore(pool: &mut ResourcePool, snapshot: Snapshot) -> Result<(), Error> {
    pool.replace_records(snapshot.records, snapshot.capacity)?;
    Ok(())
}

fn encode_record(record: &ResourceRecord) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];
    let mut offset = 0;

    write_text(&mut buf[offset..offset + NUMBER_FIELD_SIZE], record.number());
    offset += NUMBER_FIELD_SIZE;

    buf[offset..offset + 4].copy_from_slice(&record.status().code().to_le_bytes());
    offset += 4;

    let owner = record.owner().map_or(UNBOUND_OWNER, OwnerId::get);
    buf[offset..offset + 4].copy_from_slice(&owner.to_le_bytes());
    offset += 4;

    write_text(
        &mut buf[offset..offset + TIMESTAMP_FIELD_SIZE],
        &record.assigned_at_display(),
    );
    buf
}

fn decode_record(position: usize, buf: &[u8; RECORD_SIZE]) -> Result<ResourceRecord, Error> {
    let corrupt = |what: String| Error::Corrupt(format!("record {position}: {what}"));

    let number_field = &buf[..NUMBER_FIELD_SIZE];
    let status_code = read_i32(buf, NUMBER_FIELD_SIZE);
    let owner = read_i32(buf, NUMBER_FIELD_SIZE + 4);
    let timestamp_field = &buf[NUMBER_FIELD_SIZE + 8..];

    let number = read_text(number_field)
        .and_then(|text| PhoneNumber::try_from(text).ok())
        .ok_or_else(|| corrupt("invalid phone number".to_string()))?;

    let status = Status::from_code(status_code)
        .ok_or_else(|| corrupt(format!("unknown status code {status_code}")))?;

    let state = match status {
        Status::Free => State::Free,
        Status::Inactive => State::Inactive,
        Status::Assigned => {
            let owner = OwnerId::new(owner)
                .map_err(|_| corrupt(format!("assigned record has owner {owner}")))?;
            let assigned_at = read_text(timestamp_field)
                .and_then(|text| NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok())
                .ok_or_else(|| corrupt("invalid assignment timestamp".to_string()))?;
            State::Assigned(Assignment { owner, assigned_at })
        }
    };

    Ok(ResourceRecord::with_state(number, state))
}

fn read_i32(buf: &[u8], offset: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    i32::from_le_bytes(bytes)
}

/// Copies `text` into a NUL-padded field, truncating to leave at least one
/// trailing NUL.
fn write_text(field: &mut [u8], text: &str) {
    let len = text.len().min(field.len() - 1);
    field[..len].copy_from_slice(&text.as_bytes()[..len]);
}

/// Reads a NUL-terminated field.
fn read_text(field: &[u8]) -> Option<&str> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..end]).ok()
}

/// Errors that can occur when reading or writing pool files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file was written by an unsupported format version.
    #[error("Unsupported pool file version {0}")]
    UnsupportedVersion(i32),

    /// The file content is invalid.
    #[error("Corrupt pool file: {0}")]
    Corrupt(String),

    /// The pool is too large for the file format.
    #[error("Pool {0} does not fit in the file format")]
    TooLarge(&'static str),

    /// The pool could not hold the stored records.
    #[error(transparent)]
    Pool(#[from] pool::Error),
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn owner(id: i32) -> OwnerId {
        OwnerId::new(id).unwrap()
    }

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 28)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap()
    }

    fn sample_pool() -> ResourcePool {
        let mut pool = ResourcePool::new(4);
        pool.generate("138", 3).unwrap();
        pool.bind_at(owner(7), "13800000001", timestamp()).unwrap();
        pool
    }

    fn encoded(pool: &ResourcePool) -> Vec<u8> {
        let mut bytes = Vec::new();
        encode(pool, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn layout_is_bit_exact() {
        let bytes = encoded(&sample_pool());

        assert_eq!(bytes.len(), HEADER_SIZE + 3 * RECORD_SIZE);
        assert_eq!(&bytes[0..4], &1_i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &3_i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &4_i32.to_le_bytes());

        // First record: free, unbound, empty timestamp.
        let first = &bytes[HEADER_SIZE..HEADER_SIZE + RECORD_SIZE];
        assert_eq!(&first[..12], b"13800000000\0");
        assert_eq!(&first[12..16], &0_i32.to_le_bytes());
        assert_eq!(&first[16..20], &(-1_i32).to_le_bytes());
        assert_eq!(&first[20..], &[0u8; TIMESTAMP_FIELD_SIZE]);

        // Second record: assigned to owner 7.
        let second = &bytes[HEADER_SIZE + RECORD_SIZE..HEADER_SIZE + 2 * RECORD_SIZE];
        assert_eq!(&second[..12], b"13800000001\0");
        assert_eq!(&second[12..16], &1_i32.to_le_bytes());
        assert_eq!(&second[16..20], &7_i32.to_le_bytes());
        assert_eq!(&second[20..], b"2025-10-28 08:15:00\0");
    }

    #[test]
    fn round_trip_preserves_records_and_order() {
        let pool = sample_pool();

        let snapshot = decode(encoded(&pool).as_slice()).unwrap();

        assert_eq!(snapshot.capacity, pool.capacity());
        let original: Vec<_> = pool.records().cloned().collect();
        assert_eq!(snapshot.records, original);
    }

    #[test]
    fn header_round_trips() {
        let header = Header {
            version: 1,
            count: 12,
            capacity: 200,
        };
        assert_eq!(Header::from_bytes(&header.to_bytes()), header);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut bytes = encoded(&sample_pool());
        bytes[0..4].copy_from_slice(&2_i32.to_le_bytes());

        let err = decode(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(2)));
    }

    #[test]
    fn truncated_file_is_an_io_error() {
        let bytes = encoded(&sample_pool());
        let err = decode(&bytes[..bytes.len() - 5]).unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn count_above_capacity_is_corrupt() {
        let mut bytes = encoded(&sample_pool());
        bytes[8..12].copy_from_slice(&2_i32.to_le_bytes());
        assert!(matches!(decode(bytes.as_slice()), Err(Error::Corrupt(_))));
    }

    #[test]
    fn unknown_status_is_corrupt() {
        let mut bytes = encoded(&sample_pool());
        let status = HEADER_SIZE + NUMBER_FIELD_SIZE;
        bytes[status..status + 4].copy_from_slice(&9_i32.to_le_bytes());
        assert!(matches!(decode(bytes.as_slice()), Err(Error::Corrupt(_))));
    }

    #[test]
    fn assigned_record_without_owner_is_corrupt() {
        let mut bytes = encoded(&sample_pool());
        let owner = HEADER_SIZE + RECORD_SIZE + NUMBER_FIELD_SIZE + 4;
        bytes[owner..owner + 4].copy_from_slice(&(-1_i32).to_le_bytes());
        assert!(matches!(decode(bytes.as_slice()), Err(Error::Corrupt(_))));
    }

    #[test]
    fn duplicate_numbers_are_corrupt() {
        let mut bytes = encoded(&sample_pool());
        let third = HEADER_SIZE + 2 * RECORD_SIZE;
        bytes[third..third + NUMBER_FIELD_SIZE].copy_from_slice(b"13800000000\0");
        assert!(matches!(decode(bytes.as_slice()), Err(Error::Corrupt(_))));
    }

    #[test]
    fn free_records_ignore_stale_binding_fields() {
        let mut bytes = encoded(&sample_pool());
        let owner = HEADER_SIZE + NUMBER_FIELD_SIZE + 4;
        bytes[owner..owner + 4].copy_from_slice(&3_i32.to_le_bytes());

        let snapshot = decode(bytes.as_slice()).unwrap();
        assert_eq!(snapshot.records[0].owner(), None);
    }

    #[test]
    fn inactive_records_survive_round_trip() {
        let mut pool = ResourcePool::new(2);
        let number = PhoneNumber::try_from("15000000000").unwrap();
        pool.append_record(ResourceRecord::with_state(number, State::Inactive))
            .unwrap();

        let snapshot = decode(encoded(&pool).as_slice()).unwrap();
        assert_eq!(snapshot.records[0].status(), Status::Inactive);
    }

    #[test]
    fn restore_replaces_existing_records() {
        let snapshot = decode(encoded(&sample_pool()).as_slice()).unwrap();

        let mut pool = ResourcePool::new(1);
        pool.generate("150", 5).unwrap();
        restore(&mut pool, snapshot).unwrap();

        assert_eq!(pool.count(), 3);
        assert!(!pool.contains("15000000000"));
        assert_eq!(pool.find("13800000002"), Some(2));
        assert_eq!(pool.capacity(), 8);
    }
}
