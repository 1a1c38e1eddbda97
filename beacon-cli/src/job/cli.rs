use clap::{Arg, Command};

use crate::common::config_arg;

pub const JOB_CMD: &str = "job";

pub fn create_job_cli() -> Command {
    Command::new(JOB_CMD)
        .about("Show the state of a tracked query")
        .arg_required_else_help(true)
        .arg(
            Arg::new("query-id")
                .long("query-id")
                .short('i')
                .required(true)
                .help("Identifier the job is tracked under"),
        )
        .arg(
            Arg::new("job-store")
                .long("job-store")
                .short('j')
                .help("Folder holding job records (overrides config)"),
        )
        .arg(config_arg())
}
