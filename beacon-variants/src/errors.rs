use beacon_core::BeaconError;
use beacon_jobs::JobError;
use beacon_splitquery::SplitQueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VariantsError {
    #[error(transparent)]
    Beacon(#[from] BeaconError),

    #[error(transparent)]
    SplitQuery(#[from] SplitQueryError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error("Can't read dataset catalog {0}: {1}")]
    Catalog(String, String),

    #[error("Can't serialize response: {0}")]
    Response(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VariantsError {
    /// Errors caused by the request itself rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            VariantsError::Beacon(
                BeaconError::InvalidConfiguration(_)
                    | BeaconError::RegionParseError(_)
                    | BeaconError::UnknownInclusionPolicy(_)
                    | BeaconError::UnknownGranularity(_)
                    | BeaconError::JobNotFound(_)
            ) | VariantsError::SplitQuery(SplitQueryError::Beacon(
                BeaconError::InvalidConfiguration(_)
            )) | VariantsError::Job(JobError::InvalidQueryId(_))
                | VariantsError::Job(JobError::Beacon(BeaconError::JobNotFound(_)))
        )
    }
}

pub type Result<T> = std::result::Result<T, VariantsError>;
