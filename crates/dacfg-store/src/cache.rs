//! On-disk cache of simulated truth and observation trajectories, keyed by
//! the setup, schedule, configuration name, host and seed.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dacfg_core::{ShortName, TwinSetup, format_general};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Environment variable prefixing every cache root.
pub const SIM_STORAGE_ENV: &str = "SIM_STORAGE";

/// Cache root: `$SIM_STORAGE` if set, else the working directory.
pub fn default_sim_root() -> PathBuf {
    env::var(SIM_STORAGE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Host part of cache keys: `$HOSTNAME` if set, else `localhost`.
pub fn default_host() -> String {
    env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Truth trajectory `xx` (one row per model step) and observations `yy`
/// (one row per observation time).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectories {
    pub xx: Vec<Vec<f64>>,
    pub yy: Vec<Vec<f64>>,
}

/// Everything that makes two simulations reusable for one another.
#[derive(Clone, Debug, PartialEq)]
pub struct SimKey {
    pub setup: String,
    pub dt: f64,
    pub t_end: f64,
    pub dk_obs: usize,
    pub more: String,
    pub host: String,
    pub seed: u64,
}

impl SimKey {
    pub fn new(setup: &TwinSetup, more: &str, host: &str, seed: u64) -> Self {
        let t = setup.t();
        Self {
            setup: setup.short_name().to_string(),
            dt: t.dt(),
            t_end: t.t_end(),
            dk_obs: t.dk_obs(),
            more: more.to_string(),
            host: host.to_string(),
            seed,
        }
    }

    /// File stem, e.g. `HMM=sak08 dt=5 T=1.5e+03 dkObs=1  h=node1 sd=3`.
    pub fn file_stem(&self) -> String {
        sanitize_component(&format!(
            "HMM={} dt={} T={} dkObs={} {} h={} sd={}",
            self.setup,
            format_general(self.dt, 3),
            format_general(self.t_end, 3),
            self.dk_obs,
            self.more,
            self.host,
            self.seed
        ))
    }
}

/// Keep a key usable as a single path component.
fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Simulation cache rooted at `<root>/<script>/sims/`.
pub struct SimCache {
    dir: PathBuf,
}

impl SimCache {
    pub fn new(root: &Path, script: &str) -> Self {
        Self {
            dir: root.join(script).join("sims"),
        }
    }

    /// Rooted at [`default_sim_root`].
    pub fn from_env(script: &str) -> Self {
        Self::new(&default_sim_root(), script)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &SimKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.file_stem()))
    }

    /// Cached trajectories, or `None` on a miss.
    pub fn load(&self, key: &SimKey) -> Result<Option<Trajectories>> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, key: &SimKey, data: &Trajectories) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        fs::write(&path, serde_json::to_string(data)?)?;
        Ok(path)
    }

    /// Reuse a cached simulation, or run `simulate` and cache its output.
    pub fn load_or_insert_with(
        &self,
        key: &SimKey,
        simulate: impl FnOnce() -> Trajectories,
    ) -> Result<Trajectories> {
        if let Some(data) = self.load(key)? {
            tracing::info!("truth and obs loaded from {}", self.path(key).display());
            return Ok(data);
        }
        let data = simulate();
        let path = self.save(key, &data)?;
        tracing::info!("truth and obs saved to {}", path.display());
        Ok(data)
    }
}
