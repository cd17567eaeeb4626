//! Split the attributes of a set of records into those every record shares
//! and those that tell records apart.

use indexmap::{IndexMap, IndexSet};

use crate::constants::PRIORITY_KEYS;
use crate::naming::synthesize_names;
use crate::record::ConfigRecord;
use crate::value::Value;

/// Result of comparing a set of records. Derived on demand, never cached.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partition {
    /// Key -> one value per record (`None` where absent), priority-ordered.
    pub distinct: IndexMap<String, Vec<Value>>,
    /// Key -> the value every record shares.
    pub common: IndexMap<String, Value>,
    /// Synthesized name per record, index-aligned with the records.
    pub names: Vec<String>,
}

impl Partition {
    pub fn of(records: &[ConfigRecord]) -> Self {
        let (distinct, common) = partition(records);
        let names = synthesize_names(&distinct, records.len());
        Self {
            distinct,
            common,
            names,
        }
    }
}

/// Union of attribute keys across `records`, in first-seen order.
fn attribute_keys(records: &[ConfigRecord]) -> IndexSet<&str> {
    records
        .iter()
        .flat_map(|r| r.attributes().map(|(k, _)| k))
        .collect()
}

fn priority(key: &str) -> usize {
    PRIORITY_KEYS
        .iter()
        .position(|p| *p == key)
        .unwrap_or(PRIORITY_KEYS.len())
}

/// Partition attributes into `(distinct, common)`.
///
/// A key is common only when there are at least two records and they all
/// hold an equal value for it. A lone record therefore keeps every key
/// distinct, so it always has something to be named by.
pub fn partition(
    records: &[ConfigRecord],
) -> (IndexMap<String, Vec<Value>>, IndexMap<String, Value>) {
    let mut distinct = IndexMap::new();
    let mut common = IndexMap::new();

    for key in attribute_keys(records) {
        let values: Vec<Value> = records
            .iter()
            .map(|r| r.get(key).cloned().unwrap_or_default())
            .collect();
        let shared = records.len() > 1 && values.iter().all(|v| *v == values[0]);
        if shared {
            common.insert(key.to_string(), values[0].clone());
        } else {
            distinct.insert(key.to_string(), values);
        }
    }

    // Stable: non-priority keys keep first-seen order.
    distinct.sort_by(|a, _, b, _| priority(a).cmp(&priority(b)));
    (distinct, common)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(driver: &str, settings: &[(&str, Value)]) -> ConfigRecord {
        ConfigRecord::from_args(driver, [], settings.iter().cloned()).unwrap()
    }

    #[test]
    fn test_two_records_one_varying_key() {
        let records = vec![
            rec("X", &[("size", Value::Int(10))]),
            rec("X", &[("size", Value::Int(20))]),
        ];
        let p = Partition::of(&records);
        assert_eq!(p.common.len(), 1);
        assert_eq!(p.common["driver"], Value::ident("X"));
        assert_eq!(p.distinct.len(), 1);
        assert_eq!(p.distinct["size"], vec![Value::Int(10), Value::Int(20)]);
        assert_eq!(p.names, vec!["10", "20"]);
    }

    #[test]
    fn test_empty() {
        let p = Partition::of(&[]);
        assert!(p.distinct.is_empty());
        assert!(p.common.is_empty());
        assert!(p.names.is_empty());
    }

    #[test]
    fn test_single_record_has_no_common() {
        let records = vec![rec("X", &[("size", Value::Int(10))])];
        let p = Partition::of(&records);
        assert!(p.common.is_empty());
        let keys: Vec<_> = p.distinct.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["driver", "size"]);
        assert_eq!(p.distinct["driver"], vec![Value::ident("X")]);
        assert_eq!(p.distinct["size"], vec![Value::Int(10)]);
    }

    #[test]
    fn test_missing_key_is_none_and_distinct() {
        let records = vec![
            rec("X", &[("loc_rad", Value::Int(10))]),
            rec("X", &[]),
        ];
        let p = Partition::of(&records);
        assert_eq!(p.distinct["loc_rad"], vec![Value::Int(10), Value::None]);
    }

    #[test]
    fn test_explicit_none_matches_absent() {
        let records = vec![
            rec("X", &[("xN", Value::None)]),
            rec("X", &[]),
        ];
        let p = Partition::of(&records);
        assert_eq!(p.common["xN"], Value::None);
    }

    #[test]
    fn test_priority_keys_lead_in_fixed_order() {
        let records = vec![
            rec(
                "EnKF",
                &[
                    ("loc_rad", Value::Int(10)),
                    ("rotation", Value::Bool(true)),
                    ("inflation", Value::Float(1.02)),
                    ("ensemble-size", Value::Int(20)),
                    ("zeta", Value::Int(1)),
                ],
            ),
            rec(
                "ETKF",
                &[
                    ("loc_rad", Value::Int(12)),
                    ("rotation", Value::Bool(false)),
                    ("inflation", Value::Float(1.05)),
                    ("ensemble-size", Value::Int(40)),
                    ("zeta", Value::Int(2)),
                ],
            ),
        ];
        let (distinct, _) = partition(&records);
        let keys: Vec<_> = distinct.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["driver", "ensemble-size", "inflation", "rotation", "loc_rad", "zeta"]
        );
    }

    #[test]
    fn test_int_and_float_equal_values_are_common() {
        let records = vec![
            rec("X", &[("inflation", Value::Int(1))]),
            rec("X", &[("inflation", Value::Float(1.0))]),
        ];
        let (distinct, common) = partition(&records);
        assert!(distinct.is_empty());
        assert_eq!(common["inflation"], Value::Int(1));
    }

    #[test]
    fn test_large_int_and_nearby_float_are_distinct() {
        let two_53 = 1_i64 << 53;
        let records = vec![
            rec("X", &[("seed", Value::Int(two_53 + 1))]),
            rec("X", &[("seed", Value::Float(two_53 as f64))]),
        ];
        let (distinct, common) = partition(&records);
        assert!(distinct.contains_key("seed"));
        assert!(!common.contains_key("seed"));
    }
}
