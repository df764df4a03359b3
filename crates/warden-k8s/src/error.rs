// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for K8s operations.
pub type K8sResult<T> = Result<T, K8sError>;

/// Errors that can occur during K8s operations.
#[derive(Error, Debug)]
pub enum K8sError {
	#[error("{kind} not found: {name}")]
	NotFound { kind: &'static str, name: String },

	#[error("{kind} already exists: {name}")]
	AlreadyExists { kind: &'static str, name: String },

	#[error("forbidden: {message}")]
	Forbidden { message: String },

	#[error("K8s API error: {message}")]
	ApiError { message: String },

	#[error("invalid cluster connection: {message}")]
	Config { message: String },
}

impl K8sError {
	/// Map a kube error for an operation on `kind`/`name` into a typed error.
	pub fn from_kube(err: kube::Error, kind: &'static str, name: &str) -> Self {
		match err {
			kube::Error::Api(ref resp) if resp.code == 404 => K8sError::NotFound {
				kind,
				name: name.to_string(),
			},
			kube::Error::Api(ref resp) if resp.code == 409 && resp.reason == "AlreadyExists" => {
				K8sError::AlreadyExists {
					kind,
					name: name.to_string(),
				}
			}
			kube::Error::Api(resp) if resp.code == 403 => K8sError::Forbidden {
				message: resp.message,
			},
			other => other.into(),
		}
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, K8sError::NotFound { .. })
	}

	pub fn is_already_exists(&self) -> bool {
		matches!(self, K8sError::AlreadyExists { .. })
	}
}

impl From<kube::Error> for K8sError {
	fn from(err: kube::Error) -> Self {
		K8sError::ApiError {
			message: err.to_string(),
		}
	}
}
