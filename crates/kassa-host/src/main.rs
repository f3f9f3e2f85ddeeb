// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kassa — desktop demo shell.
//
// Entry point. Initialises logging and config, then runs one host screen
// against the in-memory store, reading document messages and host events
// from stdin and writing outbound envelopes to stdout.

mod console;

use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;
use tracing::{error, info, warn};

use kassa_core::AppConfig;
use kassa_core::types::{NavigationState, Platform};
use kassa_host::Screen;
use kassa_store::{StubStore, platform_purchases};

use console::{Command, ConsoleDocument, ConsoleShell};

#[derive(Parser)]
#[command(name = "kassa")]
#[command(about = "Bridge an embedded web document to in-app purchases and ads", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file
    #[arg(short, long, env = "KASSA_CONFIG")]
    config: Option<PathBuf>,

    /// Platform to present to the document (android, ios, other)
    #[arg(short, long, value_parser = parse_platform)]
    platform: Option<Platform>,
}

fn parse_platform(name: &str) -> Result<Platform, String> {
    Platform::from_name(name).ok_or_else(|| format!("unknown platform `{name}`"))
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries protocol traffic.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("Kassa starting");

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to start the event loop");
            return ExitCode::FAILURE;
        }
    };

    LocalSet::new().block_on(&runtime, run(cli));
    ExitCode::SUCCESS
}

fn load_config(path: Option<&PathBuf>) -> AppConfig {
    let Some(path) = path else {
        return AppConfig::default();
    };
    match AppConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config unreadable — using defaults");
            AppConfig::default()
        }
    }
}

async fn run(cli: Cli) {
    let config = load_config(cli.config.as_ref());
    let platform = cli.platform.unwrap_or_else(Platform::current);
    info!(%platform, url = %config.document_url, catalog = config.catalog.len(), "hosting document");

    let store = Rc::new(StubStore::new(config.catalog.clone()));
    let (screen, handle) = Screen::new(
        Rc::clone(&store),
        platform_purchases(platform),
        Rc::new(ConsoleDocument),
        Box::new(ConsoleShell),
        &config,
    );
    let screen_task = tokio::task::spawn_local(screen.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to read stdin");
                break;
            }
        };
        let command = match console::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                warn!("{usage}");
                continue;
            }
        };

        match command {
            Command::Web(text) => handle.web_message(text),
            Command::Load => handle.load_end(),
            Command::Nav(can_go_back) => handle.navigation_changed(NavigationState::with_back(can_go_back)),
            Command::Back => {
                if !handle.back_pressed().await {
                    // Unhandled back exits the host.
                    info!("back not handled by the document; exiting");
                    break;
                }
            }
            Command::Outcome(outcome) => store.set_outcome(outcome),
            Command::Redeliver(sku) => store.emit_purchase(StubStore::make_purchase(&sku, true)),
            Command::Quit => break,
        }
    }

    handle.unmount();
    if let Err(e) = screen_task.await {
        error!(error = %e, "screen task failed");
    }
    info!("Kassa stopped");
}
