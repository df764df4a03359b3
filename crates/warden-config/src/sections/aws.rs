// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! AWS account and credential section.

use serde::Deserialize;
use warden_common_secret::SecretString;

fn default_region() -> String {
	"us-east-1".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwsConfigLayer {
	pub region: Option<String>,
	pub access_key_id: Option<String>,
	pub secret_access_key: Option<SecretString>,
	pub session_token: Option<SecretString>,
	/// Overrides `https://eks.<region>.amazonaws.com`.
	pub eks_endpoint: Option<String>,
}

impl AwsConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.region.is_some() {
			self.region = other.region;
		}
		if other.access_key_id.is_some() {
			self.access_key_id = other.access_key_id;
		}
		if other.secret_access_key.is_some() {
			self.secret_access_key = other.secret_access_key;
		}
		if other.session_token.is_some() {
			self.session_token = other.session_token;
		}
		if other.eks_endpoint.is_some() {
			self.eks_endpoint = other.eks_endpoint;
		}
	}

	pub fn finalize(self) -> AwsConfig {
		AwsConfig {
			region: self.region.unwrap_or_else(default_region),
			access_key_id: self.access_key_id,
			secret_access_key: self.secret_access_key,
			session_token: self.session_token,
			eks_endpoint: self.eks_endpoint,
		}
	}
}

/// Resolved AWS settings.
///
/// Credentials stay optional here: they are only needed once an event
/// actually triggers a quarantine.
#[derive(Debug, Clone)]
pub struct AwsConfig {
	pub region: String,
	pub access_key_id: Option<String>,
	pub secret_access_key: Option<SecretString>,
	pub session_token: Option<SecretString>,
	pub eks_endpoint: Option<String>,
}

impl Default for AwsConfig {
	fn default() -> Self {
		AwsConfigLayer::default().finalize()
	}
}

impl AwsConfig {
	pub fn has_credentials(&self) -> bool {
		self.access_key_id.is_some() && self.secret_access_key.is_some()
	}
}
