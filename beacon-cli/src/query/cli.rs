use clap::{Arg, Command};

use crate::common::config_arg;

pub const QUERY_CMD: &str = "query";

pub fn create_query_cli() -> Command {
    Command::new(QUERY_CMD)
        .about("Run a variant query as a tracked job, or report on an earlier run of it")
        .arg_required_else_help(true)
        .arg(
            Arg::new("query")
                .long("query")
                .short('q')
                .required(true)
                .help("JSON file with the query parameters"),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .short('d')
                .required(true)
                .help("JSON or YAML dataset catalog"),
        )
        .arg(
            Arg::new("query-id")
                .long("query-id")
                .short('i')
                .required(true)
                .help("Identifier the job is tracked under"),
        )
        .arg(
            Arg::new("worker-url")
                .long("worker-url")
                .short('w')
                .help("Chunk worker endpoint (overrides config)"),
        )
        .arg(
            Arg::new("job-store")
                .long("job-store")
                .short('j')
                .help("Folder holding job records (overrides config)"),
        )
        .arg(config_arg())
}
