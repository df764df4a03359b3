// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! AWS Signature Version 4.
//!
//! Two flavours are needed: query-string presigning (the STS URL embedded in
//! an EKS bearer token) and `Authorization` header signing (EKS
//! `DescribeCluster`). Both share the canonical request and key derivation
//! below. Only bodiless requests are signed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::credentials::AwsCredentials;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Hex SHA-256 of the empty string.
pub const EMPTY_PAYLOAD_SHA256: &str =
	"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
	let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
	mac.update(data);
	mac.finalize().into_bytes().to_vec()
}

pub fn sha256_hex(data: &[u8]) -> String {
	hex::encode(Sha256::digest(data))
}

/// Derive the per-day, per-region, per-service signing key.
pub fn signing_key(secret_access_key: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
	let k_date = hmac_sha256(
		format!("AWS4{secret_access_key}").as_bytes(),
		date_stamp.as_bytes(),
	);
	let k_region = hmac_sha256(&k_date, region.as_bytes());
	let k_service = hmac_sha256(&k_region, service.as_bytes());
	hmac_sha256(&k_service, b"aws4_request")
}

/// Date, region and service a signature is bound to.
#[derive(Debug, Clone)]
pub struct Scope {
	pub amz_date: String,
	pub date_stamp: String,
	pub region: String,
	pub service: String,
}

impl Scope {
	pub fn new(now: DateTime<Utc>, region: &str, service: &str) -> Self {
		Self {
			amz_date: now.format("%Y%m%dT%H%M%SZ").to_string(),
			date_stamp: now.format("%Y%m%d").to_string(),
			region: region.to_string(),
			service: service.to_string(),
		}
	}

	pub fn credential_scope(&self) -> String {
		format!(
			"{}/{}/{}/aws4_request",
			self.date_stamp, self.region, self.service
		)
	}

	fn sign(&self, credentials: &AwsCredentials, canonical_request: &str) -> String {
		let string_to_sign = [
			ALGORITHM,
			&self.amz_date,
			&self.credential_scope(),
			&sha256_hex(canonical_request.as_bytes()),
		]
		.join("\n");

		let key = signing_key(
			credentials.secret_access_key(),
			&self.date_stamp,
			&self.region,
			&self.service,
		);
		hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()))
	}
}

/// A request in SigV4 canonical form.
///
/// Header names are stored lowercased; `host` must be present.
#[derive(Debug, Clone)]
pub struct CanonicalRequest {
	pub method: String,
	pub path: String,
	pub query: Vec<(String, String)>,
	pub headers: BTreeMap<String, String>,
}

impl CanonicalRequest {
	pub fn new(method: &str, host: &str, path: &str) -> Self {
		let mut headers = BTreeMap::new();
		headers.insert("host".to_string(), host.to_string());
		Self {
			method: method.to_string(),
			path: if path.is_empty() { "/".to_string() } else { path.to_string() },
			query: Vec::new(),
			headers,
		}
	}

	pub fn query(mut self, key: &str, value: &str) -> Self {
		self.query.push((key.to_string(), value.to_string()));
		self
	}

	pub fn header(mut self, name: &str, value: &str) -> Self {
		self.headers
			.insert(name.to_ascii_lowercase(), value.trim().to_string());
		self
	}

	pub fn signed_headers(&self) -> String {
		self.headers.keys().cloned().collect::<Vec<_>>().join(";")
	}

	/// Query string with keys and values URI-encoded and sorted.
	pub fn canonical_query(&self) -> String {
		let mut pairs: Vec<(String, String)> = self
			.query
			.iter()
			.map(|(k, v)| (urlencoding::encode(k).into_owned(), urlencoding::encode(v).into_owned()))
			.collect();
		pairs.sort();
		pairs
			.iter()
			.map(|(k, v)| format!("{k}={v}"))
			.collect::<Vec<_>>()
			.join("&")
	}

	pub fn canonical_string(&self) -> String {
		let canonical_headers: String = self
			.headers
			.iter()
			.map(|(k, v)| format!("{k}:{v}\n"))
			.collect();

		[
			self.method.as_str(),
			self.path.as_str(),
			&self.canonical_query(),
			&canonical_headers,
			&self.signed_headers(),
			EMPTY_PAYLOAD_SHA256,
		]
		.join("\n")
	}

	fn host(&self) -> &str {
		self.headers.get("host").map(String::as_str).unwrap_or_default()
	}
}

/// Presign `request` into a URL valid for `expires_secs`.
pub fn presign_url(
	request: CanonicalRequest,
	credentials: &AwsCredentials,
	scope: &Scope,
	expires_secs: u64,
) -> String {
	let credential = format!("{}/{}", credentials.access_key_id(), scope.credential_scope());
	let signed_headers = request.signed_headers();

	let mut request = request
		.query("X-Amz-Algorithm", ALGORITHM)
		.query("X-Amz-Credential", &credential)
		.query("X-Amz-Date", &scope.amz_date)
		.query("X-Amz-Expires", &expires_secs.to_string())
		.query("X-Amz-SignedHeaders", &signed_headers);
	if let Some(token) = credentials.session_token() {
		request = request.query("X-Amz-Security-Token", token);
	}

	let signature = scope.sign(credentials, &request.canonical_string());

	format!(
		"https://{}{}?{}&X-Amz-Signature={}",
		request.host(),
		request.path,
		request.canonical_query(),
		signature
	)
}

/// Sign `request` for header-based authentication.
///
/// Returns the headers the caller must attach (`x-amz-date`, optionally
/// `x-amz-security-token`, and `authorization`).
pub fn sign_headers(
	request: CanonicalRequest,
	credentials: &AwsCredentials,
	scope: &Scope,
) -> Vec<(String, String)> {
	let mut request = request.header("x-amz-date", &scope.amz_date);
	if let Some(token) = credentials.session_token() {
		request = request.header("x-amz-security-token", token);
	}

	let signature = scope.sign(credentials, &request.canonical_string());
	let authorization = format!(
		"{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={}",
		credentials.access_key_id(),
		scope.credential_scope(),
		request.signed_headers(),
		signature
	);

	let mut headers = vec![("x-amz-date".to_string(), scope.amz_date.clone())];
	if let Some(token) = credentials.session_token() {
		headers.push(("x-amz-security-token".to_string(), token.to_string()));
	}
	headers.push(("authorization".to_string(), authorization));
	headers
}
