// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Warden binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use warden::{create_router, handle_event, logging, read_event, version, AppState};
use warden_config::WardenConfig;
use warden_quarantine::{Dispatcher, EksConnector};

/// Warden - quarantines EKS workloads flagged by initial access detections.
#[derive(Parser, Debug)]
#[command(
	name = "warden",
	about = "Incident response quarantine for EKS workloads",
	version
)]
struct Args {
	/// Config file (defaults to /etc/warden/warden.toml)
	#[arg(long, env = "WARDEN_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Process a single detection event and print the response
	Handle {
		/// Event JSON file, or `-` for stdin
		#[arg(long, default_value = "-")]
		event: String,
	},
	/// Accept detection events over HTTP (default)
	Serve,
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => warden_config::load_config_with_file(path),
		None => warden_config::load_config(),
	}
	.context("failed to load configuration")?;

	logging::init_tracing(&config.logging);

	let dispatcher = Arc::new(dispatcher(&config));

	match args.command {
		Some(Command::Handle { event }) => {
			let event = read_event(&event)?;
			let response = handle_event(&dispatcher, &event).await;
			println!("{}", serde_json::to_string(&response)?);
			if response.status_code != 200 {
				std::process::exit(1);
			}
			Ok(())
		}
		Some(Command::Serve) | None => serve(&config, dispatcher).await,
		Some(Command::Version) => Ok(()),
	}
}

fn dispatcher(config: &WardenConfig) -> Dispatcher {
	let connector = EksConnector::new(config.cluster.name.clone(), config.aws.clone());
	Dispatcher::new(config.quarantine.clone(), Arc::new(connector))
}

async fn serve(config: &WardenConfig, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
	let addr = config.socket_addr();
	tracing::info!(
		addr = %addr,
		cluster = %config.cluster.name,
		"starting warden"
	);

	let app = create_router(AppState { dispatcher });
	let listener = tokio::net::TcpListener::bind(&addr)
		.await
		.with_context(|| format!("failed to bind {addr}"))?;

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.context("server error")?;

	tracing::info!("warden stopped");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "Failed to listen for shutdown signal");
	}
	tracing::info!("shutdown signal received");
}
