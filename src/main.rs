use clap::Parser;
use fieldmetrics::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.init_logging();
    cli.run()
}
