//! Resolving which datasets take part in a query.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VariantsError};

/// One searchable dataset and the data sources behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDescriptor {
    pub dataset_id: String,
    pub assembly_id: String,
    /// Every data source is split and scanned on its own
    pub vcf_locations: Vec<String>,
    /// When non-empty, searches are restricted to these samples
    #[serde(default)]
    pub sample_ids: Vec<String>,
}

/// Finds the datasets a query runs against.
pub trait DatasetResolver: Send + Sync {
    ///
    /// # Arguments
    /// - assembly_id: only datasets on this assembly
    /// - dataset_ids: restrict to these ids, in this order; all datasets when `None`
    /// - limit: keep at most this many
    fn resolve(
        &self,
        assembly_id: &str,
        dataset_ids: Option<&[String]>,
        limit: Option<usize>,
    ) -> Result<Vec<DatasetDescriptor>>;
}

/// Datasets listed in a JSON or YAML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetCatalog {
    pub datasets: Vec<DatasetDescriptor>,
}

impl DatasetCatalog {
    pub fn new(datasets: Vec<DatasetDescriptor>) -> Self {
        DatasetCatalog { datasets }
    }

    /// Load a catalog; `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let display = path.display().to_string();

        match path.extension().and_then(OsStr::to_str) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)
                .map_err(|e| VariantsError::Catalog(display, e.to_string())),
            _ => serde_json::from_str(&raw)
                .map_err(|e| VariantsError::Catalog(display, e.to_string())),
        }
    }
}

impl DatasetResolver for DatasetCatalog {
    fn resolve(
        &self,
        assembly_id: &str,
        dataset_ids: Option<&[String]>,
        limit: Option<usize>,
    ) -> Result<Vec<DatasetDescriptor>> {
        let on_assembly = |d: &&DatasetDescriptor| d.assembly_id == assembly_id;

        let selected: Vec<DatasetDescriptor> = match dataset_ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.datasets.iter().find(|d| &d.dataset_id == id))
                .filter(on_assembly)
                .cloned()
                .collect(),
            None => self.datasets.iter().filter(on_assembly).cloned().collect(),
        };

        Ok(match limit {
            Some(limit) => selected.into_iter().take(limit).collect(),
            None => selected,
        })
    }
}
