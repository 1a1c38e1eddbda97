use log::info;
use serde_json::Value;

use beacon_jobs::{JobManager, JobOutcome, JobStatus, JobStore};

use crate::datasets::DatasetResolver;
use crate::errors::Result;
use crate::request::VariantQuery;
use crate::responses::{build_response, running_response};
use crate::search::VariantSearch;

/// Answer to one request for a query id.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    /// RUNNING while another request executes the query, DONE otherwise
    pub status: JobStatus,
    /// True only for the request that executed the query
    pub executed: bool,
    pub body: Value,
}

impl RouteResponse {
    fn from_outcome(outcome: JobOutcome) -> Self {
        match outcome {
            JobOutcome::InProgress(_) => RouteResponse {
                status: JobStatus::Running,
                executed: false,
                body: running_response(),
            },
            JobOutcome::Completed(record) => RouteResponse {
                status: JobStatus::Done,
                executed: true,
                body: record.cached_response.unwrap_or(Value::Null),
            },
            JobOutcome::Cached(record) => RouteResponse {
                status: JobStatus::Done,
                executed: false,
                body: record.cached_response.unwrap_or(Value::Null),
            },
        }
    }
}

/// Entry point for variant queries identified by a query id.
pub struct QueryRouter<R: DatasetResolver, S: JobStore> {
    search: VariantSearch<R>,
    jobs: JobManager<S>,
}

impl<R: DatasetResolver, S: JobStore> QueryRouter<R, S> {
    pub fn new(search: VariantSearch<R>, jobs: JobManager<S>) -> Self {
        QueryRouter { search, jobs }
    }

    pub fn jobs(&self) -> &JobManager<S> {
        &self.jobs
    }

    ///
    /// Run `query` under `query_id`, or report on an earlier run.
    ///
    /// Invalid queries are rejected before the job is touched, so a corrected
    /// retry under the same id starts from NEW.
    ///
    pub fn handle(&self, query_id: &str, query: &VariantQuery) -> Result<RouteResponse> {
        self.search.validate(query)?;

        let outcome = self.jobs.run(query_id, || -> Result<Value> {
            let answer = self.search.perform(query)?;
            Ok(serde_json::to_value(build_response(&answer))?)
        })?;

        let response = RouteResponse::from_outcome(outcome);
        info!(
            "Query {}: status {:?}, executed {}",
            query_id, response.status, response.executed
        );
        Ok(response)
    }

    /// Report on a query id without running anything; unknown ids are an error.
    pub fn poll(&self, query_id: &str) -> Result<RouteResponse> {
        let record = self.jobs.poll(query_id)?;
        Ok(match record.status {
            JobStatus::Done => RouteResponse::from_outcome(JobOutcome::Cached(record)),
            _ => RouteResponse::from_outcome(JobOutcome::InProgress(record)),
        })
    }
}
