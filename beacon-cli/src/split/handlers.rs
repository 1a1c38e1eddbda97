use anyhow::{Context, Result};
use clap::ArgMatches;

use beacon_core::models::Region;
use beacon_splitquery::split_region;

use crate::common::load_config;

pub fn run_split(matches: &ArgMatches) -> Result<()> {
    let region_str = matches
        .get_one::<String>("region")
        .expect("A region is required");
    let region: Region = region_str
        .parse()
        .with_context(|| format!("Invalid region {}", region_str))?;

    let split_size = match matches.get_one::<u64>("split-size") {
        Some(size) => *size,
        None => load_config(matches)?.split_size,
    };

    let chunks = split_region(&region, split_size)?;
    for chunk in &chunks {
        println!("{}", chunk.region);
    }
    log::info!("{} split into {} chunks", region, chunks.len());

    Ok(())
}
