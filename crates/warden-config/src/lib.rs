// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for Warden.
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. TOML file (`/etc/warden/warden.toml` or an explicit path)
//! 3. Environment (`AWS_*` for credentials, `WARDEN_*` for the rest)

pub mod env;
pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use env::{load_secret_env, SecretEnvError};
pub use error::ConfigError;
pub use layer::WardenConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct WardenConfig {
	pub aws: AwsConfig,
	pub cluster: ClusterConfig,
	pub quarantine: QuarantineConfig,
	pub http: HttpConfig,
	pub logging: LoggingConfig,
}

impl WardenConfig {
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from defaults, the system config file and the environment.
pub fn load_config() -> Result<WardenConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<WardenConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<WardenConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = WardenConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

fn finalize(layer: WardenConfigLayer) -> Result<WardenConfig, ConfigError> {
	let aws = layer.aws.unwrap_or_default().finalize();
	let cluster = layer.cluster.unwrap_or_default().finalize();
	let quarantine = layer.quarantine.unwrap_or_default().finalize();
	let http = layer.http.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	quarantine.validate()?;
	if cluster.name.trim().is_empty() {
		return Err(ConfigError::Validation(
			"cluster name must not be empty".to_string(),
		));
	}

	info!(
		region = %aws.region,
		cluster = %cluster.name,
		credentials_configured = aws.has_credentials(),
		trigger_tactic = %quarantine.trigger_tactic,
		capture_name = %quarantine.capture_name,
		"Warden configuration loaded"
	);

	Ok(WardenConfig {
		aws,
		cluster,
		quarantine,
		http,
		logging,
	})
}
