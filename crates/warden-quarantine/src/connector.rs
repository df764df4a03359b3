// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Turning configuration into a live cluster client.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};
use warden_aws::{AwsCredentials, EksClusterResolver, TokenSigner};
use warden_config::AwsConfig;
use warden_k8s::{ClusterConnection, KubeClient, QuarantineClient};

use crate::error::QuarantineResult;

/// Produces a client for the target cluster on demand.
///
/// Called only once an event has matched the trigger, so untriggered events
/// never touch AWS or the cluster.
#[async_trait]
pub trait ClusterConnector: Send + Sync {
	async fn connect(&self) -> QuarantineResult<Arc<dyn QuarantineClient>>;
}

/// Connects to an EKS cluster: describe cluster, sign a bearer token, build
/// a kube client from both.
#[derive(Debug, Clone)]
pub struct EksConnector {
	cluster_name: String,
	aws: AwsConfig,
}

impl EksConnector {
	pub fn new(cluster_name: impl Into<String>, aws: AwsConfig) -> Self {
		Self {
			cluster_name: cluster_name.into(),
			aws,
		}
	}

	pub fn cluster_name(&self) -> &str {
		&self.cluster_name
	}

	fn credentials(&self) -> QuarantineResult<AwsCredentials> {
		Ok(AwsCredentials::from_parts(
			self.aws.access_key_id.clone(),
			self.aws.secret_access_key.clone(),
			self.aws.session_token.clone(),
		)?)
	}

	async fn connection(&self) -> QuarantineResult<ClusterConnection> {
		let credentials = self.credentials()?;

		let mut resolver = EksClusterResolver::new(&self.aws.region, credentials.clone())?;
		if let Some(endpoint) = &self.aws.eks_endpoint {
			resolver = resolver.with_endpoint(endpoint);
		}
		let cluster = resolver.describe_cluster(&self.cluster_name).await?;

		let bearer_token = TokenSigner::new(&self.aws.region, credentials)?.token(&self.cluster_name)?;

		Ok(ClusterConnection {
			endpoint: cluster.endpoint,
			ca_data: cluster.ca_data,
			bearer_token,
		})
	}
}

#[async_trait]
impl ClusterConnector for EksConnector {
	#[instrument(skip(self), fields(cluster = %self.cluster_name, region = %self.aws.region))]
	async fn connect(&self) -> QuarantineResult<Arc<dyn QuarantineClient>> {
		let connection = self.connection().await?;
		let client = KubeClient::connect(&connection)?;
		info!(endpoint = %connection.endpoint, "Connected to cluster");
		Ok(Arc::new(client))
	}
}
