use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;

use beacon_jobs::{FileJobStore, JobManager};
use beacon_splitquery::SplitQueryAggregator;
use beacon_splitquery::http::HttpChunkWorker;
use beacon_variants::{DatasetCatalog, QueryRouter, VariantQuery, VariantSearch};

use crate::common::load_config;

/// Run a query under its query id and print the answer body
/// # Arguments
/// - matches: matched items from CLAP args
pub fn run_query(matches: &ArgMatches) -> Result<()> {
    let query_file = matches
        .get_one::<String>("query")
        .expect("A path to a query file is required.");
    let catalog_file = matches
        .get_one::<String>("catalog")
        .expect("A path to a dataset catalog is required.");
    let query_id = matches
        .get_one::<String>("query-id")
        .expect("A query id is required.");

    let mut config = load_config(matches)?;
    if let Some(url) = matches.get_one::<String>("worker-url") {
        config.worker_url = Some(url.clone());
    }
    if let Some(dir) = matches.get_one::<String>("job-store") {
        config.job_store_dir = PathBuf::from(dir);
    }

    let raw_query = fs::read_to_string(query_file)
        .with_context(|| format!("Failed to read query file {}", query_file))?;
    let query: VariantQuery = serde_json::from_str(&raw_query)
        .with_context(|| format!("Failed to parse query file {}", query_file))?;
    let catalog = DatasetCatalog::from_file(catalog_file)?;

    let worker = HttpChunkWorker::from_config(&config)?;
    let aggregator = SplitQueryAggregator::new(Arc::new(worker), &config)?;
    let search = VariantSearch::new(aggregator, catalog, &config);

    let store = FileJobStore::open(&config.job_store_dir).with_context(|| {
        format!(
            "Failed to open job store {}",
            config.job_store_dir.display()
        )
    })?;
    let router = QueryRouter::new(search, JobManager::new(store, &config));

    let response = router.handle(query_id, &query)?;
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    Ok(())
}
