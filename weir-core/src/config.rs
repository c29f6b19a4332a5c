use std::collections::BTreeMap;
use std::time::Duration;

use tracing::warn;

use crate::errors::{Result, SelectorError};
use crate::types::RequestProfile;

/// Fallback cadence for the refresh loop when the configured value is unusable.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Fallback per-source acquisition timeout.
pub const DEFAULT_ACQUISITION_TIMEOUT: Duration = Duration::from_secs(10);

/// Validated scoring configuration, shared read-only across the service.
///
/// Construct through [`SelectorConfig::new`], which rejects inconsistent
/// input once so scoring and selection never have to re-check it.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Global importance of each resource dimension, applied to every request type.
    pub weights: BTreeMap<String, f64>,
    /// Maximum expected raw reading per weighted dimension; raw values are
    /// scaled against these into [0, 1] and clamped, never extrapolated.
    pub bounds: BTreeMap<String, f64>,
    /// Demand coefficients per request type.
    pub profiles: BTreeMap<String, RequestProfile>,
    /// Cadence of the refresh loop.
    pub refresh_interval: Duration,
    /// Upper bound on a single source acquisition within one cycle.
    pub acquisition_timeout: Duration,
}

impl SelectorConfig {
    /// Validates and assembles a selector configuration.
    ///
    /// Rejected outright: no weighted dimensions, no request profiles,
    /// non-finite or negative weights and demands, non-positive bounds,
    /// a weighted dimension without a bound, a bound for a dimension that
    /// carries no weight, and zero durations. A profile demanding an
    /// unweighted dimension is accepted with a warning since that demand
    /// can never reach a score.
    pub fn new(
        weights: BTreeMap<String, f64>,
        bounds: BTreeMap<String, f64>,
        profiles: BTreeMap<String, RequestProfile>,
        refresh_interval: Duration,
        acquisition_timeout: Duration,
    ) -> Result<Self> {
        if weights.is_empty() {
            return Err(SelectorError::Config(
                "at least one weighted dimension is required".to_string(),
            ));
        }
        if profiles.is_empty() {
            return Err(SelectorError::Config(
                "at least one request profile is required".to_string(),
            ));
        }

        for (dimension, weight) in &weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(SelectorError::Config(format!(
                    "weight for dimension '{}' must be finite and non-negative, got {}",
                    dimension, weight
                )));
            }
            if !bounds.contains_key(dimension) {
                return Err(SelectorError::Config(format!(
                    "weighted dimension '{}' has no normalization bound",
                    dimension
                )));
            }
        }

        for (dimension, bound) in &bounds {
            if !weights.contains_key(dimension) {
                return Err(SelectorError::Config(format!(
                    "normalization bound for '{}' has no matching weight",
                    dimension
                )));
            }
            if !bound.is_finite() || *bound <= 0.0 {
                return Err(SelectorError::Config(format!(
                    "normalization bound for '{}' must be finite and positive, got {}",
                    dimension, bound
                )));
            }
        }

        for (request_type, profile) in &profiles {
            for (dimension, demand) in &profile.demand {
                if !demand.is_finite() || *demand < 0.0 {
                    return Err(SelectorError::Config(format!(
                        "demand for dimension '{}' in profile '{}' must be finite and non-negative, got {}",
                        dimension, request_type, demand
                    )));
                }
                if !weights.contains_key(dimension) {
                    warn!(
                        request_type = %request_type,
                        dimension = %dimension,
                        "profile demands an unweighted dimension, it will never contribute to a score"
                    );
                }
            }
        }

        if refresh_interval.is_zero() {
            return Err(SelectorError::Config(
                "refresh interval must be positive".to_string(),
            ));
        }
        if acquisition_timeout.is_zero() {
            return Err(SelectorError::Config(
                "acquisition timeout must be positive".to_string(),
            ));
        }

        Ok(Self {
            weights,
            bounds,
            profiles,
            refresh_interval,
            acquisition_timeout,
        })
    }
}
