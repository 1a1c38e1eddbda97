use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::BeaconError;

/// Match criteria forwarded untouched to every chunk worker.
///
/// How a variant is matched against these fields is up to the worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPredicate {
    pub reference_bases: String,
    pub alternate_bases: Option<String>,
    pub variant_type: Option<String>,
    pub end_min: u64,
    pub end_max: u64,
    /// Length bounds on the variant; `None` leaves that side open
    #[serde(default)]
    pub variant_min_length: Option<u64>,
    #[serde(default)]
    pub variant_max_length: Option<u64>,
}

/// Restricts a search to a subset of the samples in each data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleScope {
    pub selected_samples_only: bool,
    pub sample_names: Vec<String>,
}

impl SampleScope {
    pub fn all_samples() -> Self {
        Self::default()
    }

    pub fn only(sample_names: Vec<String>) -> Self {
        SampleScope {
            selected_samples_only: true,
            sample_names,
        }
    }
}

/// Which datasets get their detail reported, based on whether they matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InclusionPolicy {
    #[default]
    None,
    Hit,
    Miss,
    All,
}

impl InclusionPolicy {
    /// Whether every chunk must report so counts can be accumulated.
    ///
    /// MISS datasets only ever report zeros, so detail is skipped for them.
    pub fn check_all(&self) -> bool {
        matches!(self, InclusionPolicy::Hit | InclusionPolicy::All)
    }

    pub fn includes(&self, exists: bool) -> bool {
        match self {
            InclusionPolicy::All => true,
            InclusionPolicy::Hit => exists,
            InclusionPolicy::Miss => !exists,
            InclusionPolicy::None => false,
        }
    }
}

impl FromStr for InclusionPolicy {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(InclusionPolicy::None),
            "HIT" => Ok(InclusionPolicy::Hit),
            "MISS" => Ok(InclusionPolicy::Miss),
            "ALL" => Ok(InclusionPolicy::All),
            _ => Err(BeaconError::UnknownInclusionPolicy(s.to_string())),
        }
    }
}

impl Display for InclusionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InclusionPolicy::None => "NONE",
            InclusionPolicy::Hit => "HIT",
            InclusionPolicy::Miss => "MISS",
            InclusionPolicy::All => "ALL",
        };
        write!(f, "{}", s)
    }
}

/// Requested level of detail of the final answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Boolean,
    Count,
    Record,
    Aggregated,
}

impl FromStr for Granularity {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" => Ok(Granularity::Boolean),
            "count" => Ok(Granularity::Count),
            "record" => Ok(Granularity::Record),
            "aggregated" => Ok(Granularity::Aggregated),
            _ => Err(BeaconError::UnknownGranularity(s.to_string())),
        }
    }
}

impl Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Granularity::Boolean => "boolean",
            Granularity::Count => "count",
            Granularity::Record => "record",
            Granularity::Aggregated => "aggregated",
        };
        write!(f, "{}", s)
    }
}
