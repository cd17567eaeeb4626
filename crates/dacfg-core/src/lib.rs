//! Configuration differencing and naming for data-assimilation experiments.
//!
//! Given a collection of experiment configurations, works out which settings
//! every configuration shares and which tell them apart, and synthesizes a
//! compact, column-aligned name per configuration from the latter.
//!
//! Zero I/O: loading experiment files and caching simulations live in
//! `dacfg-store`.

pub mod alias;
pub mod collection;
pub mod constants;
pub mod error;
pub mod naming;
pub mod partition;
pub mod record;
pub mod report;
pub mod setup;
pub mod value;

pub use alias::{ALIAS_TABLE_VERSION, canonical_key};
pub use collection::{CollectionItem, ConfigCollection};
pub use constants::{DRIVER_KEY, LIVEPLOTTING_KEY, NAME_KEY, PRIORITY_KEYS, SECONDARY_KEY};
pub use error::{ConfigError, ReportError, Result, SetupError};
pub use naming::{collapse_whitespace, column_label, synthesize_names, typeset};
pub use partition::{Partition, partition};
pub use record::ConfigRecord;
pub use report::{REPORT_VERSION, WireReport, export_json, import_json};
pub use setup::{Chronology, Covariance, Noise, Operator, TwinSetup};
pub use value::{Ident, Settings, ShortName, Value, format_general};
