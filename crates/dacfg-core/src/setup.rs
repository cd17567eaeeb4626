//! Descriptors for the twin-experiment setup a collection is run against.
//!
//! These only carry the shape of the model and observation operators and the
//! time schedule. The numerics live elsewhere.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::value::ShortName;

/// Time schedule of a run. Always valid: built through [`Chronology::new`]
/// or checked on deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChronologyFields")]
pub struct Chronology {
    dt: f64,
    dk_obs: usize,
    t_end: f64,
    burn_in: f64,
}

#[derive(Deserialize)]
struct ChronologyFields {
    dt: f64,
    dk_obs: usize,
    t_end: f64,
    #[serde(default)]
    burn_in: f64,
}

impl TryFrom<ChronologyFields> for Chronology {
    type Error = SetupError;

    fn try_from(raw: ChronologyFields) -> Result<Self, SetupError> {
        Self::new(raw.dt, raw.dk_obs, raw.t_end, raw.burn_in)
    }
}

impl Chronology {
    pub fn new(dt: f64, dk_obs: usize, t_end: f64, burn_in: f64) -> Result<Self, SetupError> {
        if dt.is_nan() || dt <= 0.0 {
            return Err(SetupError::NonPositiveStep { dt });
        }
        if dk_obs == 0 {
            return Err(SetupError::ZeroObsInterval);
        }
        Ok(Self {
            dt,
            dk_obs,
            t_end,
            burn_in,
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn dk_obs(&self) -> usize {
        self.dk_obs
    }

    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    pub fn burn_in(&self) -> f64 {
        self.burn_in
    }

    /// Number of model steps.
    pub fn k(&self) -> usize {
        (self.t_end / self.dt).round() as usize
    }

    /// Number of observation times.
    pub fn k_obs(&self) -> usize {
        self.k() / self.dk_obs
    }
}

impl fmt::Display for Chronology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chronology(dt={}, dkObs={}, T={}, BurnIn={})",
            self.dt, self.dk_obs, self.t_end, self.burn_in
        )
    }
}

/// Gaussian covariance summary: dimension, rank and per-component variance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Covariance {
    pub m: usize,
    pub rank: usize,
    pub variance: f64,
}

impl Covariance {
    /// Full-rank isotropic covariance. Zero variance gives rank 0.
    pub fn isotropic(m: usize, variance: f64) -> Self {
        let rank = if variance == 0.0 { 0 } else { m };
        Self { m, rank, variance }
    }

    pub fn zero(m: usize) -> Self {
        Self::isotropic(m, 0.0)
    }

    pub fn is_full_rank(&self) -> bool {
        self.rank == self.m
    }
}

/// Additive noise of an operator. `Unset` is resolved at use, never compared
/// against a magic zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Noise {
    #[default]
    Unset,
    Gaussian(Covariance),
}

/// Model or observation operator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub m: usize,
    #[serde(default)]
    pub noise: Noise,
}

impl Operator {
    pub fn new(m: usize) -> Self {
        Self {
            m,
            noise: Noise::Unset,
        }
    }

    pub fn with_noise(mut self, cov: Covariance) -> Result<Self, SetupError> {
        if cov.rank > cov.m {
            return Err(SetupError::RankExceedsDimension {
                rank: cov.rank,
                m: cov.m,
            });
        }
        self.noise = Noise::Gaussian(cov);
        Ok(self)
    }

    /// Effective noise covariance: unset noise is zero noise of the
    /// operator's dimension.
    pub fn noise_cov(&self) -> Covariance {
        match &self.noise {
            Noise::Unset => Covariance::zero(self.m),
            Noise::Gaussian(cov) => cov.clone(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cov = self.noise_cov();
        write!(
            f,
            "Operator(m={}, noise=N(0, {}I, rank {}))",
            self.m, cov.variance, cov.rank
        )
    }
}

/// Model operator, observation operator, schedule and a name.
#[derive(Clone, Debug, PartialEq)]
pub struct TwinSetup {
    name: String,
    f: Operator,
    h: Operator,
    t: Chronology,
}

impl TwinSetup {
    pub fn new(
        name: impl Into<String>,
        f: Operator,
        h: Operator,
        t: Chronology,
    ) -> Result<Self, SetupError> {
        let r = h.noise_cov();
        if !r.is_full_rank() {
            return Err(SetupError::RankDeficientObsNoise {
                rank: r.rank,
                m: r.m,
            });
        }
        Ok(Self {
            name: name.into(),
            f,
            h,
            t,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn f(&self) -> &Operator {
        &self.f
    }

    pub fn h(&self) -> &Operator {
        &self.h
    }

    pub fn t(&self) -> &Chronology {
        &self.t
    }
}

/// File stem of the setup name: `"Lorenz84/pajonk2012.py"` -> `"pajonk2012"`.
impl ShortName for TwinSetup {
    fn short_name(&self) -> &str {
        let base = self.name.rsplit('/').next().unwrap_or(&self.name);
        match base.rfind('.') {
            Some(dot) if dot > 0 => &base[..dot],
            _ => base,
        }
    }
}

impl fmt::Display for TwinSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TwinSetup({}", self.name)?;
        write!(f, "\nf={}", self.f)?;
        write!(f, "\nh={}", self.h)?;
        write!(f, "\nt={}", self.t)?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrono() -> Chronology {
        Chronology::new(0.05, 1, 10.0, 1.0).unwrap()
    }

    #[test]
    fn test_chronology_counts() {
        let t = Chronology::new(0.05, 2, 10.0, 0.0).unwrap();
        assert_eq!(t.k(), 200);
        assert_eq!(t.k_obs(), 100);
    }

    #[test]
    fn test_chronology_rejects_bad_schedule() {
        assert_eq!(
            Chronology::new(0.0, 1, 1.0, 0.0).unwrap_err(),
            SetupError::NonPositiveStep { dt: 0.0 }
        );
        assert_eq!(
            Chronology::new(0.1, 0, 1.0, 0.0).unwrap_err(),
            SetupError::ZeroObsInterval
        );
        assert!(matches!(
            Chronology::new(f64::NAN, 1, 1.0, 0.0),
            Err(SetupError::NonPositiveStep { .. })
        ));
    }

    #[test]
    fn test_chronology_deserialize_validates() {
        let t: Chronology =
            serde_json::from_str(r#"{"dt":0.05,"dk_obs":2,"t_end":10.0}"#).unwrap();
        assert_eq!(t.k_obs(), 100);
        assert_eq!(t.burn_in(), 0.0);

        let err = serde_json::from_str::<Chronology>(r#"{"dt":0.05,"dk_obs":0,"t_end":10.0}"#)
            .unwrap_err();
        assert!(err.to_string().contains("observation interval"));
    }

    #[test]
    fn test_unset_noise_resolves_to_zero() {
        let f = Operator::new(3);
        assert_eq!(f.noise, Noise::Unset);
        assert_eq!(f.noise_cov(), Covariance::zero(3));
        assert_eq!(f.noise_cov().rank, 0);
    }

    #[test]
    fn test_explicit_zero_variance_is_not_unset() {
        let f = Operator::new(3).with_noise(Covariance::zero(3)).unwrap();
        assert_ne!(f.noise, Noise::Unset);
    }

    #[test]
    fn test_rank_deficient_obs_noise_rejected() {
        let f = Operator::new(3);
        let h = Operator::new(3);
        let err = TwinSetup::new("x.py", f, h, chrono()).unwrap_err();
        assert_eq!(err, SetupError::RankDeficientObsNoise { rank: 0, m: 3 });
    }

    #[test]
    fn test_rank_above_dimension_rejected() {
        let cov = Covariance {
            m: 2,
            rank: 3,
            variance: 1.0,
        };
        assert!(Operator::new(2).with_noise(cov).is_err());
    }

    #[test]
    fn test_setup_short_name_and_display() {
        let f = Operator::new(3);
        let h = Operator::new(3)
            .with_noise(Covariance::isotropic(3, 0.01))
            .unwrap();
        let setup = TwinSetup::new("Lorenz84/pajonk2012.py", f, h, chrono()).unwrap();
        assert_eq!(setup.short_name(), "pajonk2012");
        let shown = setup.to_string();
        assert!(shown.starts_with("TwinSetup(Lorenz84/pajonk2012.py\nf=Operator(m=3"));
        assert!(shown.ends_with(")"));
    }

    #[test]
    fn test_short_name_without_extension() {
        let h = Operator::new(1).with_noise(Covariance::isotropic(1, 1.0)).unwrap();
        let setup = TwinSetup::new("QG", Operator::new(1), h, chrono()).unwrap();
        assert_eq!(setup.short_name(), "QG");
    }
}
