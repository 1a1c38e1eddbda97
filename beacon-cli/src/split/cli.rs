use clap::{Arg, Command, value_parser};

use crate::common::config_arg;

pub const SPLIT_CMD: &str = "split";

pub fn create_split_cli() -> Command {
    Command::new(SPLIT_CMD)
        .about("Print the chunks a region is split into")
        .arg_required_else_help(true)
        .arg(
            Arg::new("region")
                .long("region")
                .short('r')
                .required(true)
                .help("Region as chrom:start-end"),
        )
        .arg(
            Arg::new("split-size")
                .long("split-size")
                .short('s')
                .value_parser(value_parser!(u64))
                .help("Largest chunk span in bases (overrides config)"),
        )
        .arg(config_arg())
}
