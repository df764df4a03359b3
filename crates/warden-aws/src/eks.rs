// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! EKS `DescribeCluster` lookup.

use chrono::Utc;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::credentials::AwsCredentials;
use crate::error::{AwsError, AwsResult};
use crate::http::new_client;
use crate::sigv4::{sign_headers, CanonicalRequest, Scope};
use crate::token::validate_cluster_name;

const EKS_SERVICE: &str = "eks";

/// Where and how to reach a cluster's API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterInfo {
	pub name: String,
	pub endpoint: String,
	/// Base64-encoded PEM bundle of the cluster CA.
	pub ca_data: String,
}

#[derive(Debug, Deserialize)]
struct DescribeClusterResponse {
	cluster: ClusterDescription,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterDescription {
	endpoint: Option<String>,
	certificate_authority: Option<CertificateAuthority>,
	status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CertificateAuthority {
	data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
	#[serde(alias = "Message")]
	message: Option<String>,
}

/// Resolves cluster names to [`ClusterInfo`] via the EKS control plane.
#[derive(Debug, Clone)]
pub struct EksClusterResolver {
	http: reqwest::Client,
	endpoint: String,
	region: String,
	credentials: AwsCredentials,
}

impl EksClusterResolver {
	pub fn new(region: impl Into<String>, credentials: AwsCredentials) -> AwsResult<Self> {
		let region = region.into();
		Ok(Self {
			http: new_client()?,
			endpoint: format!("https://eks.{region}.amazonaws.com"),
			region,
			credentials,
		})
	}

	/// Point the resolver at a non-default EKS endpoint.
	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = endpoint.into().trim_end_matches('/').to_string();
		self
	}

	#[instrument(skip(self), fields(region = %self.region))]
	pub async fn describe_cluster(&self, name: &str) -> AwsResult<ClusterInfo> {
		match self.fetch(name).await {
			Ok(info) => Ok(info),
			Err(e) => {
				error!(cluster = %name, error = %e, "Error getting cluster info");
				Err(e)
			}
		}
	}

	async fn fetch(&self, name: &str) -> AwsResult<ClusterInfo> {
		validate_cluster_name(name)?;

		let url = Url::parse(&format!("{}/clusters/{}", self.endpoint, name))
			.map_err(|e| AwsError::Signing(format!("invalid EKS endpoint: {e}")))?;
		let host = match (url.host_str(), url.port()) {
			(Some(host), Some(port)) => format!("{host}:{port}"),
			(Some(host), None) => host.to_string(),
			(None, _) => {
				return Err(AwsError::Signing(format!(
					"EKS endpoint has no host: {}",
					self.endpoint
				)))
			}
		};

		let scope = Scope::new(Utc::now(), &self.region, EKS_SERVICE);
		let headers = sign_headers(
			CanonicalRequest::new("GET", &host, url.path()),
			&self.credentials,
			&scope,
		);

		let mut request = self.http.get(url);
		for (header, value) in headers {
			request = request.header(header, value);
		}

		debug!(cluster = %name, "Describing EKS cluster");
		let response = request.send().await?;
		let status = response.status();

		if status.is_success() {
			let body: DescribeClusterResponse = response
				.json()
				.await
				.map_err(|e| AwsError::InvalidResponse(e.to_string()))?;
			return into_cluster_info(name, body.cluster);
		}

		let text = response.text().await.unwrap_or_default();
		let message = serde_json::from_str::<ErrorResponse>(&text)
			.ok()
			.and_then(|e| e.message)
			.unwrap_or_else(|| truncate(&text, 200));

		match status {
			StatusCode::NOT_FOUND => Err(AwsError::ClusterNotFound {
				name: name.to_string(),
			}),
			StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AwsError::AccessDenied(message)),
			_ => Err(AwsError::Api {
				status: status.as_u16(),
				message,
			}),
		}
	}
}

fn into_cluster_info(name: &str, cluster: ClusterDescription) -> AwsResult<ClusterInfo> {
	let endpoint = cluster
		.endpoint
		.filter(|e| !e.is_empty())
		.ok_or_else(|| AwsError::InvalidResponse(format!("cluster {name} has no endpoint")))?;
	let ca_data = cluster
		.certificate_authority
		.and_then(|ca| ca.data)
		.filter(|d| !d.is_empty())
		.ok_or_else(|| {
			AwsError::InvalidResponse(format!("cluster {name} has no certificate authority data"))
		})?;

	debug!(
		cluster = %name,
		endpoint = %endpoint,
		status = cluster.status.as_deref().unwrap_or("UNKNOWN"),
		"Resolved EKS cluster"
	);

	Ok(ClusterInfo {
		name: name.to_string(),
		endpoint,
		ca_data,
	})
}

fn truncate(body: &str, max_chars: usize) -> String {
	body.chars().take(max_chars).collect()
}
