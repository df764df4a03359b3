// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Quarantine behaviour: trigger tactic, labels and packet capture settings.

use serde::Deserialize;

use crate::error::ConfigError;

fn default_trigger_tactic() -> String {
	"Initial Access".to_string()
}

fn default_label_key() -> String {
	"quarantine".to_string()
}

fn default_label_value() -> String {
	"true".to_string()
}

fn default_capture_name() -> String {
	"collect-evidence".to_string()
}

fn default_capture_selector() -> String {
	"all()".to_string()
}

/// Protocol as a name (`"TCP"`) or IP protocol number (`6`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CaptureProtocol {
	Number(u8),
	Name(String),
}

/// A port number, a `"low:high"` range or a named port.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CapturePort {
	Number(u16),
	Range(String),
}

/// One packet capture filter rule as written in the config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CaptureFilterConfig {
	pub protocol: Option<CaptureProtocol>,
	#[serde(default)]
	pub ports: Vec<CapturePort>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct QuarantineConfigLayer {
	pub trigger_tactic: Option<String>,
	pub label_key: Option<String>,
	pub label_value: Option<String>,
	pub capture_name: Option<String>,
	pub capture_selector: Option<String>,
	pub capture_duration_secs: Option<u64>,
	pub capture_filters: Option<Vec<CaptureFilterConfig>>,
	pub fallback_namespace: Option<String>,
	pub fallback_pod: Option<String>,
}

impl QuarantineConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.trigger_tactic.is_some() {
			self.trigger_tactic = other.trigger_tactic;
		}
		if other.label_key.is_some() {
			self.label_key = other.label_key;
		}
		if other.label_value.is_some() {
			self.label_value = other.label_value;
		}
		if other.capture_name.is_some() {
			self.capture_name = other.capture_name;
		}
		if other.capture_selector.is_some() {
			self.capture_selector = other.capture_selector;
		}
		if other.capture_duration_secs.is_some() {
			self.capture_duration_secs = other.capture_duration_secs;
		}
		if other.capture_filters.is_some() {
			self.capture_filters = other.capture_filters;
		}
		if other.fallback_namespace.is_some() {
			self.fallback_namespace = other.fallback_namespace;
		}
		if other.fallback_pod.is_some() {
			self.fallback_pod = other.fallback_pod;
		}
	}

	pub fn finalize(self) -> QuarantineConfig {
		QuarantineConfig {
			trigger_tactic: self.trigger_tactic.unwrap_or_else(default_trigger_tactic),
			label_key: self.label_key.unwrap_or_else(default_label_key),
			label_value: self.label_value.unwrap_or_else(default_label_value),
			capture_name: self.capture_name.unwrap_or_else(default_capture_name),
			capture_selector: self
				.capture_selector
				.unwrap_or_else(default_capture_selector),
			capture_duration_secs: self.capture_duration_secs,
			capture_filters: self.capture_filters.unwrap_or_default(),
			fallback_namespace: self.fallback_namespace,
			fallback_pod: self.fallback_pod,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuarantineConfig {
	pub trigger_tactic: String,
	pub label_key: String,
	pub label_value: String,
	pub capture_name: String,
	pub capture_selector: String,
	/// When set, captures get `startTime = now` and `endTime = now + duration`.
	pub capture_duration_secs: Option<u64>,
	pub capture_filters: Vec<CaptureFilterConfig>,
	pub fallback_namespace: Option<String>,
	pub fallback_pod: Option<String>,
}

impl Default for QuarantineConfig {
	fn default() -> Self {
		QuarantineConfigLayer::default().finalize()
	}
}

impl QuarantineConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		for (key, value) in [
			("quarantine.trigger_tactic", &self.trigger_tactic),
			("quarantine.label_key", &self.label_key),
			("quarantine.capture_name", &self.capture_name),
			("quarantine.capture_selector", &self.capture_selector),
		] {
			if value.trim().is_empty() {
				return Err(ConfigError::InvalidValue {
					key: key.to_string(),
					message: "must not be empty".to_string(),
				});
			}
		}

		if self.capture_duration_secs == Some(0) {
			return Err(ConfigError::InvalidValue {
				key: "quarantine.capture_duration_secs".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}

		match (&self.fallback_namespace, &self.fallback_pod) {
			(Some(_), None) => {
				return Err(ConfigError::InvalidValue {
					key: "quarantine.fallback_pod".to_string(),
					message: "must be set together with quarantine.fallback_namespace"
						.to_string(),
				});
			}
			(None, Some(_)) => {
				return Err(ConfigError::InvalidValue {
					key: "quarantine.fallback_namespace".to_string(),
					message: "must be set together with quarantine.fallback_pod".to_string(),
				});
			}
			_ => {}
		}

		Ok(())
	}
}
