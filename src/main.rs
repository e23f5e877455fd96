use anirec::cli::Cli;
use anirec::{Config, run};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let config = Config::load(cli.config.as_deref())?;
    let worker_threads = config.general.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }

    let runtime = builder.build()?;
    runtime.block_on(run(cli, config))
}
