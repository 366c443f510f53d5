use color_eyre::Result;
use libris::cli::{parse_args, run_cli_command, USAGE};
use libris::config::LibraryConfig;
use libris::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let command = match parse_args(std::env::args()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    init_logging();
    run_cli_command(command, LibraryConfig::from_env()).await
}
