use std::collections::HashSet;
use std::slice;

use crate::error::{Error, Result};
use crate::record::{Column, Record};

/// Ordered records with unique IDs
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    /// Fails with `DuplicateId` if two records share an ID, and with `InvalidMonth` if a month is
    /// outside `1..=12`
    pub fn new(records: Vec<Record>) -> Result<Table> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !(1..=12).contains(&record.month) {
                return Err(Error::InvalidMonth {
                    id: record.id,
                    month: record.month,
                });
            }
            if !seen.insert(record.id) {
                return Err(Error::DuplicateId(record.id));
            }
        }

        Ok(Table { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Present values of `column`, in row order
    pub fn values(&self, column: Column) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.get(column)).collect()
    }

    /// New table with the records for which `keep` holds
    pub fn filter<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&Record) -> bool,
    {
        Table {
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = slice::Iter<'a, Record>;

    fn into_iter(self) -> slice::Iter<'a, Record> {
        self.iter()
    }
}

/// Replaces every missing measure with zero
pub fn fill_missing(table: &Table) -> Table {
    let records = table
        .iter()
        .map(|record| {
            let mut record = record.clone();
            for &column in Column::MEASURES.iter() {
                if let Some(slot) = record.measure_mut(column) {
                    slot.get_or_insert(0);
                }
            }
            record
        })
        .collect();

    Table { records }
}
