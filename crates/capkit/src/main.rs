//! capkit: inspect Capacitor and Ionic projects and run the right package
//! manager commands.
//!
//! Every invocation prints exactly one JSON envelope on stdout:
//! `{"success": bool, "message": string, "data"?: ..., "error"?: string}`.

mod cli;
mod commands;
mod tracing;

use crate::cli::Cli;
use capkit_core::{ShellExecutor, ToolResponse};
use clap::Parser;
use std::io::Write;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = crate::tracing::init_tracing(cli.tracing_config()) {
        let _ = writeln!(std::io::stderr(), "{error:?}");
    }

    let response = match commands::execute(&cli, &ShellExecutor::new()).await {
        Ok(response) => response,
        Err(report) => ToolResponse::from_diagnostic(&*report),
    };

    let json = response.to_json().unwrap_or_else(|e| {
        format!(r#"{{"success":false,"message":"Failed to serialize response","error":"{e}"}}"#)
    });
    if writeln!(std::io::stdout().lock(), "{json}").is_err() || !response.success {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
