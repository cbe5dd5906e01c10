mod cli;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use qtest::diagnostics::{emit, Category};
use qtest::{ReqwestTransport, Runner, UseCase};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if cli.debug { "debug" } else { "info" })
        }))
        .with_ansi(!cli.no_color)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("*-*-* Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.runner_config();

    let use_cases = cli
        .files
        .iter()
        .map(|path| UseCase::load(path).with_context(|| format!("loading {}", path.display())))
        .collect::<anyhow::Result<Vec<_>>>()?;

    if cli.debug {
        let dump = serde_json::json!({
            "config": config,
            "useCases": use_cases.iter().map(UseCase::to_value).collect::<Vec<_>>(),
        });
        emit(
            &config.show,
            Category::Debug,
            serde_json::to_string_pretty(&dump).context("serializing debug dump")?,
        );
    }

    let runner = Runner::new(config, ReqwestTransport::new());
    let report = runner.run(&use_cases).await;
    tracing::info!(
        total = report.total,
        passed = report.passed,
        failed = report.failed,
        skipped = report.skipped,
        duration_ms = report.duration_ms as u64,
        "run finished"
    );

    report.into_result()?;
    Ok(())
}
