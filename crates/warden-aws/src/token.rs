// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! EKS bearer tokens.
//!
//! A token is a presigned STS `GetCallerIdentity` URL, bound to a cluster via
//! the signed `x-k8s-aws-id` header, base64url encoded without padding and
//! prefixed with `k8s-aws-v1.`. The API server replays the URL against STS to
//! learn the caller's identity.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use tracing::{debug, error, instrument};
use warden_common_secret::SecretString;

use crate::credentials::AwsCredentials;
use crate::error::{AwsError, AwsResult};
use crate::sigv4::{presign_url, CanonicalRequest, Scope};

pub const TOKEN_PREFIX: &str = "k8s-aws-v1.";
pub const CLUSTER_ID_HEADER: &str = "x-k8s-aws-id";
pub const TOKEN_EXPIRY_SECS: u64 = 60;

const STS_SERVICE: &str = "sts";

/// Short-lived cluster credential; redacted in logs.
pub type BearerToken = SecretString;

/// Produces bearer tokens for EKS clusters from explicit credentials.
#[derive(Debug, Clone)]
pub struct TokenSigner {
	region: String,
	credentials: AwsCredentials,
}

impl TokenSigner {
	pub fn new(region: impl Into<String>, credentials: AwsCredentials) -> AwsResult<Self> {
		let region = region.into();
		validate_region(&region)?;
		Ok(Self {
			region,
			credentials,
		})
	}

	pub fn region(&self) -> &str {
		&self.region
	}

	fn sts_host(&self) -> String {
		format!("sts.{}.amazonaws.com", self.region)
	}

	/// The presigned STS URL for `cluster_name` as of `now`.
	pub fn presigned_url(&self, cluster_name: &str, now: DateTime<Utc>) -> AwsResult<String> {
		validate_cluster_name(cluster_name)?;

		let request = CanonicalRequest::new("GET", &self.sts_host(), "/")
			.query("Action", "GetCallerIdentity")
			.query("Version", "2011-06-15")
			.header(CLUSTER_ID_HEADER, cluster_name);
		let scope = Scope::new(now, &self.region, STS_SERVICE);

		Ok(presign_url(
			request,
			&self.credentials,
			&scope,
			TOKEN_EXPIRY_SECS,
		))
	}

	/// Derive a token as of `now`. Same inputs and clock give the same token.
	#[instrument(skip(self, now), fields(region = %self.region))]
	pub fn token_at(&self, cluster_name: &str, now: DateTime<Utc>) -> AwsResult<BearerToken> {
		let url = self.presigned_url(cluster_name, now).map_err(|e| {
			error!(cluster = %cluster_name, error = %e, "Error generating bearer token");
			e
		})?;

		let token = format!("{TOKEN_PREFIX}{}", URL_SAFE_NO_PAD.encode(url.as_bytes()));
		debug!(cluster = %cluster_name, expires_in_secs = TOKEN_EXPIRY_SECS, "Generated bearer token");
		Ok(SecretString::new(token))
	}

	pub fn token(&self, cluster_name: &str) -> AwsResult<BearerToken> {
		self.token_at(cluster_name, Utc::now())
	}
}

fn validate_region(region: &str) -> AwsResult<()> {
	if region.is_empty()
		|| !region
			.chars()
			.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
	{
		return Err(AwsError::Signing(format!("invalid region '{region}'")));
	}
	Ok(())
}

/// EKS cluster names: 1-100 chars, alphanumeric first, then alphanumerics,
/// hyphens and underscores.
pub(crate) fn validate_cluster_name(name: &str) -> AwsResult<()> {
	let mut chars = name.chars();
	let valid = match chars.next() {
		Some(first) => {
			first.is_ascii_alphanumeric()
				&& name.len() <= 100
				&& chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
		}
		None => false,
	};

	if valid {
		Ok(())
	} else {
		Err(AwsError::Signing(format!("invalid cluster name '{name}'")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use proptest::prelude::*;

	fn signer() -> TokenSigner {
		let creds = AwsCredentials::new(
			"AKIDEXAMPLE",
			SecretString::new("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string()),
			None,
		)
		.unwrap();
		TokenSigner::new("us-east-1", creds).unwrap()
	}

	fn fixed_clock() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
	}

	fn decode(token: &BearerToken) -> String {
		let encoded = token.expose().strip_prefix(TOKEN_PREFIX).unwrap();
		String::from_utf8(URL_SAFE_NO_PAD.decode(encoded).unwrap()).unwrap()
	}

	#[test]
	fn token_has_prefix_and_no_padding() {
		let token = signer().token_at("demo", fixed_clock()).unwrap();
		assert!(token.expose().starts_with(TOKEN_PREFIX));
		assert!(!token.expose().contains('='));
		assert!(!token.expose().contains('+'));
		assert!(!token.expose().contains('/'));
	}

	#[test]
	fn token_decodes_to_presigned_sts_url() {
		let url = decode(&signer().token_at("demo", fixed_clock()).unwrap());

		assert!(url.starts_with("https://sts.us-east-1.amazonaws.com/?"));
		assert!(url.contains("Action=GetCallerIdentity"));
		assert!(url.contains("Version=2011-06-15"));
		assert!(url.contains("X-Amz-Expires=60"));
		assert!(url.contains("X-Amz-SignedHeaders=host%3Bx-k8s-aws-id"));
		assert!(url.contains("X-Amz-Date=20240601T120000Z"));
	}

	#[test]
	fn token_is_deterministic_for_fixed_clock() {
		let a = signer().token_at("demo", fixed_clock()).unwrap();
		let b = signer().token_at("demo", fixed_clock()).unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn cluster_name_changes_signature() {
		let a = decode(&signer().token_at("demo", fixed_clock()).unwrap());
		let b = decode(&signer().token_at("prod", fixed_clock()).unwrap());
		assert_ne!(a, b);
	}

	#[test]
	fn token_is_redacted_in_debug() {
		let token = signer().token_at("demo", fixed_clock()).unwrap();
		assert!(!format!("{token:?}").contains(TOKEN_PREFIX));
	}

	#[test]
	fn invalid_inputs_are_signing_errors() {
		let creds = AwsCredentials::new("AKID", SecretString::new("s".into()), None).unwrap();
		assert!(matches!(
			TokenSigner::new("US East", creds),
			Err(AwsError::Signing(_))
		));
		assert!(matches!(
			signer().token_at("-bad", fixed_clock()),
			Err(AwsError::Signing(_))
		));
		assert!(matches!(
			signer().token_at("", fixed_clock()),
			Err(AwsError::Signing(_))
		));
	}

	proptest! {
		#[test]
		fn distinct_clusters_never_share_tokens(
			a in "[a-z][a-z0-9-]{0,20}",
			b in "[a-z][a-z0-9-]{0,20}",
		) {
			prop_assume!(a != b);
			let signer = signer();
			let ta = signer.token_at(&a, fixed_clock()).unwrap();
			let tb = signer.token_at(&b, fixed_clock()).unwrap();
			prop_assert_ne!(ta.expose(), tb.expose());
		}
	}
}
