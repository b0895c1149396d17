use clap::Parser;
use clipstack_lib::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clipstack_lib::run(Cli::parse()).await
}
