use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use template_tree::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    match args.command {
        cli::Command::Apply(opts) => {
            logging::init_subscriber(args.verbose, "apply");
            let log = Arc::new(logging::Logger::new("apply"));
            commands::apply::run(&args.global, &opts, &log)
        }
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
