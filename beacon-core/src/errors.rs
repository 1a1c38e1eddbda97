use thiserror::Error;

/// Error type for beacon-core operations.
#[derive(Error, Debug)]
pub enum BeaconError {
    /// Non-positive split span, zero concurrency, `start > end` and similar.
    /// Always raised before any chunk is dispatched.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Error parsing region: {0}")]
    RegionParseError(String),

    #[error("Unknown inclusion policy: {0}")]
    UnknownInclusionPolicy(String),

    #[error("Unknown granularity: {0}")]
    UnknownGranularity(String),

    /// A poll referenced a query id that has never been submitted.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Can't parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for beacon-core operations.
pub type Result<T> = std::result::Result<T, BeaconError>;
