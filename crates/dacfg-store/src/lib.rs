pub mod cache;
pub mod error;
pub mod experiment;

pub use cache::{SimCache, SimKey, Trajectories, default_host, default_sim_root};
pub use error::{Result, StoreError};
pub use experiment::{Experiment, load_experiment, parse_experiment};
