//! # CLI
//!
//! `qtest [OPTIONS] <FILES>...` runs use case files against a server.

use std::path::PathBuf;

use clap::Parser;

use qtest::config::{RunnerConfig, ShowOptions, DEFAULT_BASE};

#[derive(Debug, Parser)]
#[command(name = "qtest", version, about = "Run use case files against a query API server")]
pub struct Cli {
    /// Server URL, host and port (example: http://localhost:8080)
    #[arg(short, long, env = "QTEST_SERVER", default_value = "")]
    pub server: String,

    /// URL base path
    #[arg(short, long, default_value = DEFAULT_BASE)]
    pub base: String,

    /// Show comments
    #[arg(long)]
    pub comment: bool,

    /// Show requests
    #[arg(long)]
    pub request: bool,

    /// Show responses
    #[arg(long)]
    pub response: bool,

    /// Show comments, requests and responses
    #[arg(short, long)]
    pub verbose: bool,

    /// Dump the loaded configuration and use cases before running
    #[arg(short, long)]
    pub debug: bool,

    /// Indentation for logged responses
    #[arg(short, long, default_value_t = 0)]
    pub indent: usize,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Use case files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl Cli {
    pub fn runner_config(&self) -> RunnerConfig {
        let show = if self.verbose {
            ShowOptions::all()
        } else {
            ShowOptions {
                comments: self.comment,
                requests: self.request,
                responses: self.response,
            }
        };

        RunnerConfig::new(self.server.clone())
            .with_base(self.base.clone())
            .with_show(show)
            .with_indent(self.indent)
    }
}
