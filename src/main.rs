use std::path::Path;

use clap::Parser;
use guide::cli::commands::{Cli, Commands};
use guide::cli::handlers;

fn main() {
    let cli = Cli::parse();
    let guide_dir = cli.guide_dir.clone();

    match cli.command {
        None => {
            // No subcommand → launch the console (it logs to guide/guide.log)
            if let Err(e) = guide::tui::run(guide_dir.as_deref().map(Path::new)) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Init(args)) => {
            // Init is handled before workspace discovery
            guide::logging::init_cli();
            if let Err(e) = handlers::cmd_init(args, guide_dir.as_deref().map(Path::new)) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            guide::logging::init_cli();
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
