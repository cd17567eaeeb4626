//! JSON wire format for a partition, for renderers that live out of process.
//!
//! Columns are stored as arrays of `{key, ...}` objects rather than JSON maps
//! so key order survives any consumer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::partition::Partition;
use crate::value::Value;

pub const REPORT_VERSION: &str = "1";

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct WireReport {
    pub version: String,
    pub records: usize,
    pub distinct: Vec<WireColumn>,
    #[serde(default)]
    pub common: Vec<WireShared>,
    pub names: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct WireColumn {
    pub key: String,
    pub values: Vec<Value>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct WireShared {
    pub key: String,
    pub value: Value,
}

impl From<&Partition> for WireReport {
    fn from(p: &Partition) -> Self {
        Self {
            version: REPORT_VERSION.to_string(),
            records: p.names.len(),
            distinct: p
                .distinct
                .iter()
                .map(|(key, values)| WireColumn {
                    key: key.clone(),
                    values: values.clone(),
                })
                .collect(),
            common: p
                .common
                .iter()
                .map(|(key, value)| WireShared {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
            names: p.names.clone(),
        }
    }
}

impl WireReport {
    pub fn into_partition(self) -> Result<Partition, ReportError> {
        if self.version != REPORT_VERSION {
            return Err(ReportError::Version(self.version));
        }
        if self.names.len() != self.records {
            return Err(ReportError::Shape(format!(
                "{} names for {} records",
                self.names.len(),
                self.records
            )));
        }
        let mut distinct = IndexMap::new();
        for col in self.distinct {
            if col.values.len() != self.records {
                return Err(ReportError::Shape(format!(
                    "column `{}` has {} values for {} records",
                    col.key,
                    col.values.len(),
                    self.records
                )));
            }
            distinct.insert(col.key, col.values);
        }
        let common = self
            .common
            .into_iter()
            .map(|shared| (shared.key, shared.value))
            .collect();
        Ok(Partition {
            distinct,
            common,
            names: self.names,
        })
    }
}

pub fn export_json(partition: &Partition) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&WireReport::from(partition))
}

pub fn import_json(json: &str) -> Result<Partition, ReportError> {
    let report: WireReport = serde_json::from_str(json)?;
    report.into_partition()
}
