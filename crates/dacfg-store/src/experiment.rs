//! Experiment files: an optional `[setup]` and a list of `[[config]]` tables.
//!
//! ```toml
//! [setup]
//! name = "Lorenz84/pajonk2012.py"
//! dt = 0.05
//! dk_obs = 1
//! t_end = 100.0
//! f = { m = 3 }
//! h = { m = 3, noise = { variance = 0.01 } }
//!
//! [[config]]
//! driver = "EnKF"
//! secondary = "Sqrt"
//! ensemble-size = 10
//! inflation = 1.02
//! ```

use std::fs;
use std::path::Path;

use dacfg_core::{
    Chronology, CollectionItem, ConfigCollection, ConfigRecord, Covariance, DRIVER_KEY, Ident,
    Operator, Settings, TwinSetup, Value,
};
use serde::Deserialize;
use toml::{Table, Value as TomlValue};

use crate::error::{Result, StoreError};

const SECONDARY_FIELD: &str = "secondary";

/// A parsed experiment file.
#[derive(Clone, Debug)]
pub struct Experiment {
    pub setup: Option<TwinSetup>,
    pub configs: ConfigCollection,
}

#[derive(Deserialize)]
struct SetupSpec {
    name: String,
    dt: f64,
    #[serde(default = "one")]
    dk_obs: usize,
    t_end: f64,
    #[serde(default)]
    burn_in: f64,
    f: OperatorSpec,
    h: OperatorSpec,
}

#[derive(Deserialize)]
struct OperatorSpec {
    m: usize,
    noise: Option<NoiseSpec>,
}

#[derive(Deserialize)]
struct NoiseSpec {
    variance: f64,
    rank: Option<usize>,
}

fn one() -> usize {
    1
}

impl OperatorSpec {
    fn build(self) -> Result<Operator> {
        let op = Operator::new(self.m);
        match self.noise {
            None => Ok(op),
            Some(spec) => {
                let mut cov = Covariance::isotropic(self.m, spec.variance);
                if let Some(rank) = spec.rank {
                    cov.rank = rank;
                }
                Ok(op.with_noise(cov)?)
            }
        }
    }
}

impl SetupSpec {
    fn build(self) -> Result<TwinSetup> {
        let t = Chronology::new(self.dt, self.dk_obs, self.t_end, self.burn_in)?;
        Ok(TwinSetup::new(self.name, self.f.build()?, self.h.build()?, t)?)
    }
}

/// Convert a TOML value into a setting value. Arrays have no counterpart.
fn value_from_toml(key: &str, v: TomlValue) -> Result<Value> {
    Ok(match v {
        TomlValue::String(s) => Value::Text(s),
        TomlValue::Integer(i) => Value::Int(i),
        TomlValue::Float(x) => Value::Float(x),
        TomlValue::Boolean(b) => Value::Bool(b),
        TomlValue::Datetime(dt) => Value::Text(dt.to_string()),
        TomlValue::Array(_) => {
            return Err(StoreError::InvalidData(format!(
                "{key}: arrays are not supported as settings"
            )));
        }
        TomlValue::Table(table) => {
            let mut fields = Settings::new();
            for (k, v) in table {
                let path = format!("{key}.{k}");
                fields.insert(k, value_from_toml(&path, v)?);
            }
            Value::Record(fields)
        }
    })
}

fn secondary_from_toml(at: &str, v: TomlValue) -> Result<Vec<Value>> {
    match v {
        TomlValue::Array(items) => items
            .into_iter()
            .map(|item| value_from_toml(at, item))
            .collect(),
        other => Ok(vec![value_from_toml(at, other)?]),
    }
}

fn record_from_table(at: &str, table: Table) -> Result<ConfigRecord> {
    let mut driver = None;
    let mut unnamed = Vec::new();
    let mut settings = Vec::with_capacity(table.len());
    for (key, v) in table {
        if key == DRIVER_KEY {
            driver = Some(v);
        } else if key == SECONDARY_FIELD {
            unnamed = secondary_from_toml(&format!("{at}.{key}"), v)?;
        } else {
            let value = value_from_toml(&format!("{at}.{key}"), v)?;
            settings.push((key, value));
        }
    }

    let driver = match driver {
        Some(TomlValue::String(s)) => Ident::new(s),
        Some(other) => {
            return Err(StoreError::InvalidData(format!(
                "{at}: driver must be a string, got {}",
                other.type_str()
            )));
        }
        None => return Err(StoreError::InvalidData(format!("{at}: missing driver"))),
    };
    Ok(ConfigRecord::from_args(driver, unnamed, settings)?)
}

/// Parse experiment-file content.
pub fn parse_experiment(content: &str) -> Result<Experiment> {
    let table: Table = toml::from_str(content)?;

    let mut setup = None;
    let mut items = Vec::new();
    for (key, v) in table {
        match (key.as_str(), v) {
            ("setup", v) => setup = Some(SetupSpec::deserialize(v)?.build()?),
            ("config", TomlValue::Array(array)) => items = array,
            ("config", other) => {
                return Err(StoreError::InvalidData(format!(
                    "`config` must be an array of tables, got {}",
                    other.type_str()
                )));
            }
            (key, _) => tracing::warn!("ignoring unknown top-level key `{key}`"),
        }
    }

    let mut collection_items = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let at = format!("config[{i}]");
        let item = match item {
            TomlValue::Table(t) => CollectionItem::Record(record_from_table(&at, t)?),
            other => CollectionItem::Value(value_from_toml(&at, other)?),
        };
        collection_items.push(item);
    }
    let configs = ConfigCollection::from_items(collection_items)?;

    tracing::debug!(
        "parsed experiment: {} configs, setup={}",
        configs.len(),
        setup.as_ref().map_or("none", TwinSetup::name)
    );
    Ok(Experiment { setup, configs })
}

/// Read and parse an experiment file.
pub fn load_experiment(path: &Path) -> Result<Experiment> {
    let content = fs::read_to_string(path)?;
    parse_experiment(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dacfg_core::{ConfigError, SetupError};

    const PAJONK: &str = r#"
[setup]
name = "Lorenz84/pajonk2012.py"
dt = 0.05
dk_obs = 1
t_end = 10.0
burn_in = 0.5
f = { m = 3 }
h = { m = 3, noise = { variance = 0.01 } }

[[config]]
driver = "ExtKF"
inflation = 2

[[config]]
driver = "EnKF"
secondary = "Sqrt"
ensemble-size = 3
inflation = 1.01

[[config]]
driver = "PartFilt"
ensemble-size = 100
NER = 0.4
LP = false
name = "pf 100"
"#;

    #[test]
    fn test_parse_full_file() {
        let exp = parse_experiment(PAJONK).unwrap();
        let setup = exp.setup.unwrap();
        assert_eq!(setup.name(), "Lorenz84/pajonk2012.py");
        assert_eq!(setup.t().k(), 200);

        let cfgs = exp.configs;
        assert_eq!(cfgs.len(), 3);
        assert_eq!(cfgs[0].driver_name(), "ExtKF");
        assert_eq!(cfgs[0].get("inflation"), Some(&Value::Int(2)));
        assert_eq!(cfgs[1].secondary(), Some(&Value::text("Sqrt")));
        assert_eq!(cfgs[2].get("liveplotting"), Some(&Value::Bool(false)));
        assert_eq!(cfgs[2].name(), Some("pf 100"));
    }

    #[test]
    fn test_settings_keep_file_order() {
        let exp = parse_experiment(PAJONK).unwrap();
        let keys: Vec<_> = exp.configs[2].settings().keys().cloned().collect();
        assert_eq!(keys, vec!["ensemble-size", "NER", "liveplotting"]);
    }

    #[test]
    fn test_no_configs_is_empty() {
        let exp = parse_experiment("").unwrap();
        assert!(exp.setup.is_none());
        assert!(exp.configs.is_empty());
    }

    #[test]
    fn test_missing_driver() {
        let err = parse_experiment("[[config]]\nN = 3\n").unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(msg) if msg.contains("missing driver")));
    }

    #[test]
    fn test_two_secondaries_rejected() {
        let content = "[[config]]\ndriver = \"EnKF\"\nsecondary = [\"Sqrt\", \"Serial\"]\n";
        let err = parse_experiment(content).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Config(ConfigError::TooManyUnnamed { count: 2 })
        ));
    }

    #[test]
    fn test_non_table_config_item_rejected() {
        let err = parse_experiment("config = [3]\n").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Config(ConfigError::UnsupportedItem { kind: "int" })
        ));
    }

    #[test]
    fn test_array_setting_rejected() {
        let err = parse_experiment("[[config]]\ndriver = \"EnKF\"\nloc = [1, 2]\n").unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(msg) if msg.starts_with("config[0].loc")));
    }

    #[test]
    fn test_nested_table_becomes_record() {
        let content = "[[config]]\ndriver = \"LETKF\"\nloc = { radius = 10, taper = \"GC\" }\n";
        let exp = parse_experiment(content).unwrap();
        match exp.configs[0].get("loc") {
            Some(Value::Record(fields)) => {
                assert_eq!(fields["radius"], Value::Int(10));
                assert_eq!(fields["taper"], Value::text("GC"));
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_unset_obs_noise_rejected() {
        let content =
            "[setup]\nname = \"x\"\ndt = 0.1\nt_end = 1.0\nf = { m = 2 }\nh = { m = 2 }\n";
        let err = parse_experiment(content).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Setup(SetupError::RankDeficientObsNoise { rank: 0, m: 2 })
        ));
    }
}
