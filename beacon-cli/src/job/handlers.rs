use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use beacon_jobs::{FileJobStore, JobManager, JobStatus};

use crate::common::load_config;

pub fn run_job(matches: &ArgMatches) -> Result<()> {
    let query_id = matches
        .get_one::<String>("query-id")
        .expect("A query id is required.");

    let config = load_config(matches)?;
    let job_store_dir = matches
        .get_one::<String>("job-store")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.job_store_dir.clone());

    let store = FileJobStore::open(&job_store_dir)
        .with_context(|| format!("Failed to open job store {}", job_store_dir.display()))?;
    let jobs = JobManager::new(store, &config);
    let record = jobs.poll(query_id)?;

    println!("query id:   {}", record.query_id);
    println!("status:     {:?}", record.status);
    println!("started:    {}", record.start_time.to_rfc3339());
    println!("attempt:    {}", record.attempt);
    if let Some(elapsed) = record.elapsed_time {
        println!("elapsed:    {:.3}s", elapsed);
    }
    if record.status == JobStatus::Done {
        if let Some(response) = &record.cached_response {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
    }

    Ok(())
}
