use clap::Parser;
use salesboard::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.init_logging()?;
    cli.run()
}
