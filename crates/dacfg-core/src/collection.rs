use std::ops::{AddAssign, Deref};

use indexmap::IndexMap;

use crate::error::{ConfigError, Result};
use crate::naming::collapse_whitespace;
use crate::partition::{Partition, partition};
use crate::record::ConfigRecord;
use crate::value::{Ident, Value};

/// Anything that can seed a [`ConfigCollection`].
#[derive(Clone, Debug)]
pub enum CollectionItem {
    Record(ConfigRecord),
    Collection(ConfigCollection),
    /// A bare value. Only present so loosely typed input (experiment files)
    /// can be rejected with a proper error.
    Value(Value),
}

impl From<ConfigRecord> for CollectionItem {
    fn from(record: ConfigRecord) -> Self {
        CollectionItem::Record(record)
    }
}

impl From<ConfigCollection> for CollectionItem {
    fn from(collection: ConfigCollection) -> Self {
        CollectionItem::Collection(collection)
    }
}

/// Ordered group of configurations under comparison.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigCollection {
    records: Vec<ConfigRecord>,
}

impl ConfigCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records, or from exactly one collection to flatten.
    pub fn from_items(items: impl IntoIterator<Item = CollectionItem>) -> Result<Self> {
        let items: Vec<CollectionItem> = items.into_iter().collect();
        let count = items.len();
        let mut records = Vec::with_capacity(count);
        for item in items {
            match item {
                CollectionItem::Record(record) => records.push(record),
                CollectionItem::Collection(_) if count > 1 => {
                    return Err(ConfigError::NestedCollectionNotAlone { count });
                }
                CollectionItem::Collection(nested) => records.extend(nested.records),
                CollectionItem::Value(value) => {
                    return Err(ConfigError::UnsupportedItem { kind: value.kind() });
                }
            }
        }
        Ok(Self { records })
    }

    /// Build a record and append it.
    pub fn add<K, V>(
        &mut self,
        driver: impl Into<Ident>,
        unnamed: impl IntoIterator<Item = Value>,
        settings: impl IntoIterator<Item = (K, V)>,
    ) -> Result<()>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let record = ConfigRecord::from_args(driver, unnamed, settings)?;
        self.records.push(record);
        Ok(())
    }

    /// Build a record and insert it at `index`. Past-the-end appends.
    pub fn insert<K, V>(
        &mut self,
        index: usize,
        driver: impl Into<Ident>,
        unnamed: impl IntoIterator<Item = Value>,
        settings: impl IntoIterator<Item = (K, V)>,
    ) -> Result<()>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let record = ConfigRecord::from_args(driver, unnamed, settings)?;
        self.records.insert(index.min(self.records.len()), record);
        Ok(())
    }

    pub fn push(&mut self, record: ConfigRecord) {
        self.records.push(record);
    }

    pub fn remove(&mut self, index: usize) -> Option<ConfigRecord> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    pub fn records(&self) -> &[ConfigRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ConfigRecord> {
        self.records
    }

    /// Fresh comparison of the current records.
    pub fn partition(&self) -> Partition {
        Partition::of(&self.records)
    }

    pub fn distinct_attrs(&self) -> IndexMap<String, Vec<Value>> {
        partition(&self.records).0
    }

    pub fn common_attrs(&self) -> IndexMap<String, Value> {
        partition(&self.records).1
    }

    pub fn distinct_names(&self) -> Vec<String> {
        self.partition().names
    }

    /// Write synthesized names onto records.
    ///
    /// Records that already carry a name keep it unless `overwrite` is set.
    /// With `pad` off, alignment padding is squeezed out of each name.
    pub fn assign_names(&mut self, overwrite: bool, pad: bool) {
        let names = self.distinct_names();
        for (record, name) in self.records.iter_mut().zip(names) {
            if overwrite || record.is_unnamed() {
                let name = if pad { name } else { collapse_whitespace(&name) };
                record.set_auto_name(name);
            }
        }
    }
}

impl Deref for ConfigCollection {
    type Target = [ConfigRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl AddAssign<ConfigRecord> for ConfigCollection {
    fn add_assign(&mut self, record: ConfigRecord) {
        self.records.push(record);
    }
}

impl FromIterator<ConfigRecord> for ConfigCollection {
    fn from_iter<I: IntoIterator<Item = ConfigRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<ConfigRecord> for ConfigCollection {
    fn extend<I: IntoIterator<Item = ConfigRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl IntoIterator for ConfigCollection {
    type Item = ConfigRecord;
    type IntoIter = std::vec::IntoIter<ConfigRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConfigCollection {
    type Item = &'a ConfigRecord;
    type IntoIter = std::slice::Iter<'a, ConfigRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
