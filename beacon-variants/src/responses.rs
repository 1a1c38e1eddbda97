//! Projection of a [`SearchAnswer`] into the answer body cached on the job.
//!
//! Only the parts that depend on the answer are built here; wrapping them in
//! the public envelope happens elsewhere.

use serde::Serialize;
use serde_json::{Value, json};

use beacon_core::consts::QUERY_RUNNING_MESSAGE;
use beacon_core::models::Granularity;
use beacon_splitquery::DatasetResponse;

use crate::search::SearchAnswer;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub returned_granularity: Granularity,
    pub response_summary: ResponseSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResultSets>,
    pub info: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSummary {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_total_results: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSets {
    pub result_sets: Vec<DatasetResponse>,
}

/// Build the answer for the requested granularity.
pub fn build_response(answer: &SearchAnswer) -> QueryResponse {
    let info = json!({
        "failedChunks": answer.failed_chunks,
        "indeterminate": answer.indeterminate,
    });

    match answer.granularity {
        Granularity::Boolean => QueryResponse {
            returned_granularity: Granularity::Boolean,
            response_summary: ResponseSummary {
                exists: answer.exists,
                num_total_results: None,
            },
            response: None,
            info,
        },
        Granularity::Count => QueryResponse {
            returned_granularity: Granularity::Count,
            response_summary: ResponseSummary {
                exists: answer.exists,
                num_total_results: Some(answer.total_count),
            },
            response: None,
            info,
        },
        granularity @ (Granularity::Record | Granularity::Aggregated) => QueryResponse {
            returned_granularity: granularity,
            response_summary: ResponseSummary {
                exists: answer.exists,
                num_total_results: Some(answer.total_count),
            },
            response: Some(ResultSets {
                result_sets: answer.included().map(|d| d.to_response()).collect(),
            }),
            info,
        },
    }
}

/// Answer served while another request is still executing the query.
pub fn running_response() -> Value {
    json!({
        "returnedGranularity": Granularity::Boolean,
        "responseSummary": { "exists": false },
        "info": { "message": QUERY_RUNNING_MESSAGE },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::models::InclusionPolicy;
    use beacon_splitquery::{DatasetResult, resolve};
    use pretty_assertions::assert_eq;

    fn answer(granularity: Granularity) -> SearchAnswer {
        let mut hit = DatasetResult::empty("ds1");
        hit.exists = true;
        hit.variant_count = 3;
        hit.call_count = 4;
        hit.all_alleles_count = 8;
        hit.chunks_total = 3;
        hit.chunks_succeeded = 3;

        let mut miss = DatasetResult::empty("ds2");
        miss.chunks_total = 3;
        miss.chunks_succeeded = 3;

        SearchAnswer {
            exists: true,
            total_count: 3,
            per_dataset: vec![
                resolve(hit, InclusionPolicy::Hit),
                resolve(miss, InclusionPolicy::Hit),
            ],
            granularity,
            failed_chunks: 0,
            indeterminate: false,
        }
    }

    #[test]
    fn test_boolean_response() {
        let json = serde_json::to_value(build_response(&answer(Granularity::Boolean))).unwrap();
        assert_eq!(
            json,
            json!({
                "returnedGranularity": "boolean",
                "responseSummary": {"exists": true},
                "info": {"failedChunks": 0, "indeterminate": false},
            })
        );
    }

    #[test]
    fn test_count_response() {
        let json = serde_json::to_value(build_response(&answer(Granularity::Count))).unwrap();
        assert_eq!(json["responseSummary"], json!({"exists": true, "numTotalResults": 3}));
        assert!(json.get("response").is_none());
    }

    #[test]
    fn test_record_response_lists_included_datasets_only() {
        let json = serde_json::to_value(build_response(&answer(Granularity::Record))).unwrap();
        let sets = json["response"]["resultSets"].as_array().unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0]["datasetId"], "ds1");
        assert_eq!(sets[0]["frequency"], 0.5);
        assert_eq!(json["returnedGranularity"], "record");
    }

    #[test]
    fn test_running_response() {
        let json = running_response();
        assert_eq!(json["responseSummary"]["exists"], false);
        assert_eq!(json["info"]["message"], "Query still running.");
    }
}
