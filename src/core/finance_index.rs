use crate::domain::model::{FinanceRecord, Year, YearlyFinanceDataset};
use crate::utils::error::Result;
use std::collections::HashMap;

/// Record used for regions without finance data: missing renders as neutral.
pub static DEFAULT_RECORD: FinanceRecord = FinanceRecord {
    region_code: String::new(),
    receive: 0.0,
    invest: 0.0,
    delta: 0.0,
};

/// Region code to finance record lookup for a single year.
#[derive(Debug, Clone, Default)]
pub struct RegionFinanceIndex {
    records: HashMap<String, FinanceRecord>,
}

impl RegionFinanceIndex {
    /// Indexes the records of `year`. Duplicate codes: the last record wins.
    pub fn build(dataset: &YearlyFinanceDataset, year: &Year) -> Result<Self> {
        let records = dataset.records_for(year)?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: &[FinanceRecord]) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for record in records {
            if let Some(previous) = index.insert(record.region_code.clone(), record.clone()) {
                tracing::warn!(
                    "Duplicate finance record for region {}, replacing delta {} with {}",
                    previous.region_code,
                    previous.delta,
                    record.delta
                );
            }
        }
        Self { records: index }
    }

    /// The record for `region_code`, or [`DEFAULT_RECORD`] when there is none.
    pub fn get(&self, region_code: &str) -> &FinanceRecord {
        self.find(region_code).unwrap_or(&DEFAULT_RECORD)
    }

    pub fn find(&self, region_code: &str) -> Option<&FinanceRecord> {
        self.records.get(region_code)
    }

    pub fn contains(&self, region_code: &str) -> bool {
        self.records.contains_key(region_code)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}
