// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type AwsResult<T> = Result<T, AwsError>;

#[derive(Debug, Error)]
pub enum AwsError {
	#[error("AWS credentials unavailable: {0}")]
	Credentials(String),

	#[error("request signing failed: {0}")]
	Signing(String),

	#[error("EKS cluster not found: {name}")]
	ClusterNotFound { name: String },

	#[error("access denied by AWS: {0}")]
	AccessDenied(String),

	#[error("AWS API error (HTTP {status}): {message}")]
	Api { status: u16, message: String },

	#[error("invalid AWS response: {0}")]
	InvalidResponse(String),

	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),
}

impl AwsError {
	/// Lookup failures (the named cluster does not exist).
	pub fn is_not_found(&self) -> bool {
		matches!(self, AwsError::ClusterNotFound { .. })
	}

	/// Credential or authorization failures.
	pub fn is_auth(&self) -> bool {
		matches!(
			self,
			AwsError::Credentials(_) | AwsError::Signing(_) | AwsError::AccessDenied(_)
		)
	}
}
