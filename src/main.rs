use clap::Parser;
use hashrouter::cli::{run_cli, Cli};
use hashrouter::logging::init_logging;

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    run_cli(cli)
}
