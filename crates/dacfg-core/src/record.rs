use std::fmt;

use crate::alias::canonical_key;
use crate::constants::{DRIVER_KEY, NAME_KEY, PRIVATE_PREFIX, SECONDARY_KEY};
use crate::error::{ConfigError, Result};
use crate::naming::collapse_whitespace;
use crate::value::{Ident, Settings, Value};

/// One experiment configuration: a driver, an optional unnamed parameter,
/// and free-form settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigRecord {
    /// Always a `Value::Ident`.
    driver: Value,
    secondary: Option<Value>,
    settings: Settings,
    name: Option<String>,
    /// Index into `settings` the name was first given at, for display.
    name_slot: Option<usize>,
    name_is_auto: bool,
}

impl ConfigRecord {
    pub fn new(driver: impl Into<Ident>) -> Self {
        Self {
            driver: Value::Ident(driver.into()),
            secondary: None,
            settings: Settings::new(),
            name: None,
            name_slot: None,
            name_is_auto: false,
        }
    }

    /// Build a record from positional and keyword arguments.
    ///
    /// At most one unnamed parameter is accepted. Keywords go through the
    /// alias table; `name` sets the user name and `driver` is rejected.
    pub fn from_args<K, V>(
        driver: impl Into<Ident>,
        unnamed: impl IntoIterator<Item = Value>,
        settings: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut unnamed: Vec<Value> = unnamed.into_iter().collect();
        if unnamed.len() > 1 {
            return Err(ConfigError::TooManyUnnamed {
                count: unnamed.len(),
            });
        }

        let mut record = Self::new(driver);
        record.secondary = unnamed.pop();
        for (key, value) in settings {
            record.set(key.as_ref(), value)?;
        }
        Ok(record)
    }

    /// Assign one keyword setting.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        match canonical_key(key) {
            DRIVER_KEY => Err(ConfigError::ReservedKey {
                key: DRIVER_KEY.to_string(),
            }),
            NAME_KEY => {
                let name = match value {
                    Value::None => None,
                    Value::Text(s) => Some(s),
                    other => Some(other.to_string()),
                };
                self.store_name(name, false);
                Ok(())
            }
            SECONDARY_KEY => {
                self.secondary = Some(value);
                Ok(())
            }
            key => {
                self.settings.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    pub fn with_secondary(mut self, value: impl Into<Value>) -> Self {
        self.secondary = Some(value.into());
        self
    }

    pub fn driver(&self) -> &Value {
        &self.driver
    }

    pub fn driver_name(&self) -> &str {
        self.driver.short_name().unwrap_or_default()
    }

    pub fn secondary(&self) -> Option<&Value> {
        self.secondary.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Look up any diffable attribute, including `driver` and the
    /// unnamed parameter.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match key {
            DRIVER_KEY => Some(&self.driver),
            SECONDARY_KEY => self.secondary.as_ref(),
            _ => self.settings.get(key),
        }
    }

    /// Every diffable attribute in declaration order: driver, unnamed
    /// parameter, then settings.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        std::iter::once((DRIVER_KEY, &self.driver))
            .chain(self.secondary.iter().map(|v| (SECONDARY_KEY, v)))
            .chain(self.settings.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn name_is_auto(&self) -> bool {
        self.name_is_auto
    }

    /// Set a user name. Synthesized names will not replace it unless
    /// asked to overwrite.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.store_name(Some(name.into()), false);
    }

    pub(crate) fn set_auto_name(&mut self, name: String) {
        self.store_name(Some(name), true);
    }

    /// A name keeps the position it was first given at among the settings.
    fn store_name(&mut self, name: Option<String>, auto: bool) {
        if self.name_slot.is_none() {
            self.name_slot = Some(self.settings.len());
        }
        self.name = name;
        self.name_is_auto = auto;
    }

    fn fmt_user_name(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) if !self.name_is_auto => {
                write!(f, ", name='{}'", collapse_whitespace(name))
            }
            _ => Ok(()),
        }
    }

    /// Whether the record still lacks a usable name.
    pub fn is_unnamed(&self) -> bool {
        self.name.as_deref().is_none_or(str::is_empty)
    }
}

/// Attributes in declaration order. A user-given name shows up where it was
/// first set; synthesized names are left out.
impl fmt::Display for ConfigRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigRecord({}", self.driver_name())?;
        if let Some(secondary) = &self.secondary {
            write!(f, ", {SECONDARY_KEY}={secondary}")?;
        }
        for (i, (key, val)) in self.settings.iter().enumerate() {
            if self.name_slot == Some(i) {
                self.fmt_user_name(f)?;
            }
            if key.starts_with(PRIVATE_PREFIX) {
                continue;
            }
            write!(f, ", {key}={val}")?;
        }
        if self.name_slot.is_some_and(|slot| slot >= self.settings.len()) {
            self.fmt_user_name(f)?;
        }
        f.write_str(")")
    }
}
