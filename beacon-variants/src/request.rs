use serde::{Deserialize, Serialize};

use beacon_core::errors::Result;
use beacon_core::models::{Granularity, InclusionPolicy, Region, SampleScope, VariantPredicate};

fn default_reference_bases() -> String {
    "N".to_string()
}

/// Caller-facing parameters of a variant query, already decoded from the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantQuery {
    pub assembly_id: String,
    pub reference_name: String,
    pub start: u64,
    pub end: u64,
    #[serde(default = "default_reference_bases")]
    pub reference_bases: String,
    #[serde(default)]
    pub alternate_bases: Option<String>,
    #[serde(default)]
    pub variant_type: Option<String>,
    /// Bounds on variant end positions; default to the queried region
    #[serde(default)]
    pub end_min: Option<u64>,
    #[serde(default)]
    pub end_max: Option<u64>,
    /// Variant length bounds; a negative maximum means no upper bound
    #[serde(default)]
    pub variant_min_length: Option<u64>,
    #[serde(default)]
    pub variant_max_length: Option<i64>,
    #[serde(default)]
    pub requested_granularity: Granularity,
    /// Falls back to the configured default when absent
    #[serde(default)]
    pub include_resultset_responses: Option<InclusionPolicy>,
    #[serde(default)]
    pub dataset_ids: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub selected_samples_only: bool,
    #[serde(default)]
    pub sample_names: Vec<String>,
}

impl VariantQuery {
    /// A query for `reference_name:start-end` with every other field defaulted.
    pub fn new(assembly_id: &str, reference_name: &str, start: u64, end: u64) -> Self {
        VariantQuery {
            assembly_id: assembly_id.to_string(),
            reference_name: reference_name.to_string(),
            start,
            end,
            reference_bases: default_reference_bases(),
            alternate_bases: None,
            variant_type: None,
            end_min: None,
            end_max: None,
            variant_min_length: None,
            variant_max_length: None,
            requested_granularity: Granularity::Boolean,
            include_resultset_responses: None,
            dataset_ids: None,
            limit: None,
            selected_samples_only: false,
            sample_names: vec![],
        }
    }

    pub fn region(&self) -> Result<Region> {
        Region::new(self.reference_name.as_str(), self.start, self.end)
    }

    pub fn predicate(&self) -> VariantPredicate {
        VariantPredicate {
            reference_bases: self.reference_bases.clone(),
            alternate_bases: self.alternate_bases.clone(),
            variant_type: self.variant_type.clone(),
            end_min: self.end_min.unwrap_or(self.start),
            end_max: self.end_max.unwrap_or(self.end),
            variant_min_length: self.variant_min_length.filter(|&min| min > 0),
            variant_max_length: self
                .variant_max_length
                .and_then(|max| u64::try_from(max).ok()),
        }
    }

    /// Sample scope for a dataset; the caller's selection wins over the dataset's own.
    pub fn scope_for(&self, dataset_sample_ids: &[String]) -> SampleScope {
        if self.selected_samples_only {
            SampleScope::only(self.sample_names.clone())
        } else if !dataset_sample_ids.is_empty() {
            SampleScope::only(dataset_sample_ids.to_vec())
        } else {
            SampleScope::all_samples()
        }
    }

    pub fn policy(&self, default_policy: InclusionPolicy) -> InclusionPolicy {
        self.include_resultset_responses.unwrap_or(default_policy)
    }

    /// Whether counts are needed: the policy reports detail, or the answer
    /// is more than a boolean.
    pub fn check_all(&self, policy: InclusionPolicy) -> bool {
        policy.check_all() || self.requested_granularity != Granularity::Boolean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_request_parameters() {
        let query: VariantQuery = serde_json::from_str(
            r#"{
                "assemblyId": "GRCh38",
                "referenceName": "1",
                "start": 1,
                "end": 2500000,
                "alternateBases": "A",
                "requestedGranularity": "count",
                "includeResultsetResponses": "HIT"
            }"#,
        )
        .unwrap();

        assert_eq!(query.reference_bases, "N");
        assert_eq!(query.requested_granularity, Granularity::Count);
        assert_eq!(query.policy(InclusionPolicy::None), InclusionPolicy::Hit);
        assert_eq!(query.region().unwrap().to_string(), "1:1-2500000");

        let predicate = query.predicate();
        assert_eq!(predicate.end_min, 1);
        assert_eq!(predicate.end_max, 2_500_000);
        assert_eq!(predicate.variant_min_length, None);
        assert_eq!(predicate.variant_max_length, None);
    }

    #[test]
    fn test_length_bounds_reach_the_predicate() {
        let query: VariantQuery = serde_json::from_str(
            r#"{
                "assemblyId": "GRCh38",
                "referenceName": "1",
                "start": 1,
                "end": 100,
                "variantMinLength": 2,
                "variantMaxLength": 50
            }"#,
        )
        .unwrap();
        let predicate = query.predicate();
        assert_eq!(predicate.variant_min_length, Some(2));
        assert_eq!(predicate.variant_max_length, Some(50));

        let unbounded: VariantQuery = serde_json::from_str(
            r#"{"assemblyId": "GRCh38", "referenceName": "1", "start": 1, "end": 100,
                "variantMinLength": 0, "variantMaxLength": -1}"#,
        )
        .unwrap();
        let predicate = unbounded.predicate();
        assert_eq!(predicate.variant_min_length, None);
        assert_eq!(predicate.variant_max_length, None);
    }

    #[test]
    fn test_check_all() {
        let mut query = VariantQuery::new("GRCh38", "1", 1, 10);
        assert!(!query.check_all(InclusionPolicy::None));
        assert!(!query.check_all(InclusionPolicy::Miss));
        assert!(query.check_all(InclusionPolicy::Hit));

        query.requested_granularity = Granularity::Record;
        assert!(query.check_all(InclusionPolicy::None));
    }

    #[test]
    fn test_scope_for() {
        let mut query = VariantQuery::new("GRCh38", "1", 1, 10);
        assert_eq!(query.scope_for(&[]), SampleScope::all_samples());
        assert_eq!(
            query.scope_for(&["s1".to_string()]),
            SampleScope::only(vec!["s1".to_string()])
        );

        query.selected_samples_only = true;
        query.sample_names = vec!["HG00096".to_string()];
        assert_eq!(
            query.scope_for(&["s1".to_string()]),
            SampleScope::only(vec!["HG00096".to_string()])
        );
    }

    #[test]
    fn test_inverted_region_is_rejected() {
        assert!(VariantQuery::new("GRCh38", "1", 10, 1).region().is_err());
    }
}
