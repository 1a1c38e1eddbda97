mod common;
mod job;
mod query;
mod split;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "beacon";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Answer genomic variant existence queries by splitting regions across chunk workers.")
        .subcommand_required(true)
        .subcommand(split::cli::create_split_cli())
        .subcommand(query::cli::create_query_cli())
        .subcommand(job::cli::create_job_cli())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // SPLIT
        //
        Some((split::cli::SPLIT_CMD, matches)) => {
            split::handlers::run_split(matches)?;
        }

        //
        // QUERY
        //
        Some((query::cli::QUERY_CMD, matches)) => {
            query::handlers::run_query(matches)?;
        }

        //
        // JOB STATUS
        //
        Some((job::cli::JOB_CMD, matches)) => {
            job::handlers::run_job(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
