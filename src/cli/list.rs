use std::path::Path;

use clap::Parser;
use phonepool::{pool::query::sort_numbers, OwnerId, PhoneNumber, ResourceRecord};
use serde::Serialize;
use tracing::instrument;

use super::{
    session::Session,
    status::OutputFormat,
    terminal::{tagged, Colorize},
};

const DEFAULT_LIMIT: usize = 20;

/// Command arguments for `phonepool list`.
#[derive(Debug, Parser)]
#[command(about = "List free numbers, or the numbers bound to an owner")]
pub struct List {
    /// Only numbers starting with these digits
    #[arg(long, short, default_value = "")]
    prefix: String,

    /// Limit number of rows returned
    #[arg(long, short, default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// List the numbers bound to this owner instead of free numbers
    #[arg(long, conflicts_with = "prefix")]
    owner: Option<OwnerId>,

    /// Output format (default: table)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    number: &'a PhoneNumber,
    status: phonepool::Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assigned_at: Option<String>,
}

impl<'a> From<&'a ResourceRecord> for Row<'a> {
    fn from(record: &'a ResourceRecord) -> Self {
        Self {
            number: record.number(),
            status: record.status(),
            owner: record.owner().map(OwnerId::get),
            assigned_at: record
                .assigned_at()
                .map(|_| record.assigned_at_display()),
        }
    }
}

impl List {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let session = Session::open(root)?;
        let pool = &session.pool;

        let mut numbers = match self.owner {
            Some(owner) => pool.numbers_of(owner),
            None => pool.list_free_by_prefix(&self.prefix, self.limit),
        };
        sort_numbers(&mut numbers);
        numbers.truncate(self.limit);

        let rows: Vec<Row<'_>> = numbers
            .iter()
            .filter_map(|number| pool.find(number).and_then(|i| pool.get(i)))
            .map(Row::from)
            .collect();

        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            OutputFormat::Table => self.output_table(&rows, pool.count_free_by_prefix(&self.prefix)),
        }
        Ok(())
    }

    fn output_table(&self, rows: &[Row<'_>], free_matching: usize) {
        if rows.is_empty() {
            match self.owner {
                Some(owner) => println!("Owner {owner} holds no numbers"),
                None => println!("No free numbers match '{}'", self.prefix),
            }
            return;
        }

        for row in rows {
            match (&row.owner, &row.assigned_at) {
                (Some(_), Some(at)) => println!("{}  {}", tagged(row.number), at.dim()),
                _ => println!("{}", tagged(row.number)),
            }
        }

        if self.owner.is_none() && free_matching > rows.len() {
            println!(
                "{}",
                format!("... showing {} of {free_matching}", rows.len()).dim()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use phonepool::ResourcePool;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn rows_serialize_binding_only_when_assigned() {
        let mut pool = ResourcePool::new(2);
        pool.generate("138", 2).unwrap();
        let at = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        pool.bind_at(OwnerId::new(4).unwrap(), "13800000001", at)
            .unwrap();

        let rows: Vec<Row<'_>> = pool.records().map(Row::from).collect();
        let json = serde_json::to_value(&rows).unwrap();

        assert_eq!(
            json,
            serde_json::json!([
                { "number": "13800000000", "status": "free" },
                {
                    "number": "13800000001",
                    "status": "assigned",
                    "owner": 4,
                    "assigned_at": "2025-03-01 08:00:00"
                }
            ])
        );
    }

    #[test]
    fn list_run_succeeds_for_prefix_and_owner() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();

        List {
            prefix: "139".to_string(),
            limit: 5,
            owner: None,
            output: OutputFormat::Json,
        }
        .run(root)
        .expect("list command should succeed");

        List {
            prefix: String::new(),
            limit: DEFAULT_LIMIT,
            owner: Some(OwnerId::new(1).unwrap()),
            output: OutputFormat::Table,
        }
        .run(root)
        .expect("list command should succeed");
    }
}
