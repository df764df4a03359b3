// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use warden_common_secret::SecretString;

use crate::error::{AwsError, AwsResult};

/// Explicit AWS credentials, scoped to a single invocation.
#[derive(Debug, Clone)]
pub struct AwsCredentials {
	access_key_id: String,
	secret_access_key: SecretString,
	session_token: Option<SecretString>,
}

impl AwsCredentials {
	pub fn new(
		access_key_id: impl Into<String>,
		secret_access_key: SecretString,
		session_token: Option<SecretString>,
	) -> AwsResult<Self> {
		let access_key_id = access_key_id.into();
		if access_key_id.trim().is_empty() {
			return Err(AwsError::Credentials("access key id is empty".into()));
		}
		if secret_access_key.is_empty() {
			return Err(AwsError::Credentials("secret access key is empty".into()));
		}

		Ok(Self {
			access_key_id,
			secret_access_key,
			// An empty session token means "not using temporary credentials".
			session_token: session_token.filter(|t| !t.is_empty()),
		})
	}

	/// Build credentials from optional parts, failing if either half of the
	/// key pair is missing.
	pub fn from_parts(
		access_key_id: Option<String>,
		secret_access_key: Option<SecretString>,
		session_token: Option<SecretString>,
	) -> AwsResult<Self> {
		let access_key_id = access_key_id
			.ok_or_else(|| AwsError::Credentials("AWS_ACCESS_KEY_ID is not set".into()))?;
		let secret_access_key = secret_access_key
			.ok_or_else(|| AwsError::Credentials("AWS_SECRET_ACCESS_KEY is not set".into()))?;
		Self::new(access_key_id, secret_access_key, session_token)
	}

	pub fn access_key_id(&self) -> &str {
		&self.access_key_id
	}

	pub(crate) fn secret_access_key(&self) -> &str {
		self.secret_access_key.expose()
	}

	pub(crate) fn session_token(&self) -> Option<&str> {
		self.session_token.as_ref().map(|t| t.expose().as_str())
	}
}
