// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML file and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::env::{env_u16, env_u64, env_var, secret_env};
use crate::error::ConfigError;
use crate::layer::WardenConfigLayer;
use crate::sections::{
	AwsConfigLayer, ClusterConfigLayer, HttpConfigLayer, LogFormat, LoggingConfigLayer,
	QuarantineConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<WardenConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		Ok(WardenConfigLayer::default())
	}
}

/// TOML file source. A missing file is not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/warden/warden.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(WardenConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: WardenConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Credentials use the standard `AWS_*` names; everything else is
/// `WARDEN_<SECTION>_<FIELD>`.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(WardenConfigLayer {
			aws: Some(load_aws_from_env()?),
			cluster: Some(load_cluster_from_env()),
			quarantine: Some(load_quarantine_from_env()?),
			http: Some(load_http_from_env()?),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn load_aws_from_env() -> Result<AwsConfigLayer, ConfigError> {
	Ok(AwsConfigLayer {
		region: env_var("AWS_REGION").or_else(|| env_var("AWS_DEFAULT_REGION")),
		access_key_id: env_var("AWS_ACCESS_KEY_ID"),
		secret_access_key: secret_env("AWS_SECRET_ACCESS_KEY")?,
		session_token: secret_env("AWS_SESSION_TOKEN")?,
		eks_endpoint: env_var("WARDEN_EKS_ENDPOINT"),
	})
}

fn load_cluster_from_env() -> ClusterConfigLayer {
	ClusterConfigLayer {
		name: env_var("WARDEN_CLUSTER_NAME"),
	}
}

fn load_quarantine_from_env() -> Result<QuarantineConfigLayer, ConfigError> {
	Ok(QuarantineConfigLayer {
		trigger_tactic: env_var("WARDEN_QUARANTINE_TRIGGER_TACTIC"),
		label_key: env_var("WARDEN_QUARANTINE_LABEL_KEY"),
		label_value: env_var("WARDEN_QUARANTINE_LABEL_VALUE"),
		capture_name: env_var("WARDEN_QUARANTINE_CAPTURE_NAME"),
		capture_selector: env_var("WARDEN_QUARANTINE_CAPTURE_SELECTOR"),
		capture_duration_secs: env_u64("WARDEN_QUARANTINE_CAPTURE_DURATION_SECS")?,
		capture_filters: None,
		fallback_namespace: env_var("WARDEN_QUARANTINE_FALLBACK_NAMESPACE"),
		fallback_pod: env_var("WARDEN_QUARANTINE_FALLBACK_POD"),
	})
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("WARDEN_HOST"),
		port: env_u16("WARDEN_PORT")?,
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	let format = env_var("WARDEN_LOG_FORMAT")
		.map(|v| v.parse::<LogFormat>())
		.transpose()?;

	Ok(LoggingConfigLayer {
		level: env_var("WARDEN_LOG_LEVEL"),
		format,
	})
}
