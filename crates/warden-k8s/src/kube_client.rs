// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::{
	api::{Api, Patch, PatchParams, PostParams},
	config::AuthInfo,
	Client, Config,
};
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::CertificateDer;
use tracing::{debug, error, info, instrument};

use crate::client::QuarantineClient;
use crate::connection::ClusterConnection;
use crate::error::{K8sError, K8sResult};
use crate::labels::label_patch;
use crate::packet_capture::{PacketCapture, PACKET_CAPTURE_KIND};

/// Production client bound to a single cluster connection.
pub struct KubeClient {
	client: Client,
}

impl KubeClient {
	/// Build a client authenticating with the connection's bearer token.
	///
	/// Must be called from within a tokio runtime.
	pub fn connect(connection: &ClusterConnection) -> K8sResult<Self> {
		let config = build_config(connection)?;
		let client = Client::try_from(config).map_err(|e| K8sError::Config {
			message: e.to_string(),
		})?;
		debug!(endpoint = %connection.endpoint, "K8s client initialized");
		Ok(Self { client })
	}

	pub fn from_client(client: Client) -> Self {
		Self { client }
	}
}

/// Assemble a typed `kube::Config` from endpoint, CA bundle and token.
pub fn build_config(connection: &ClusterConnection) -> K8sResult<Config> {
	let cluster_url = connection
		.endpoint
		.parse::<http::Uri>()
		.map_err(|e| K8sError::Config {
			message: format!("invalid endpoint '{}': {e}", connection.endpoint),
		})?;
	if cluster_url.scheme_str() != Some("https") {
		return Err(K8sError::Config {
			message: format!("endpoint must use https: {}", connection.endpoint),
		});
	}

	let mut config = Config::new(cluster_url);
	config.root_cert = Some(decode_ca_bundle(&connection.ca_data)?);
	config.auth_info = AuthInfo {
		token: Some(secrecy::SecretString::from(
			connection.bearer_token.expose().clone(),
		)),
		..Default::default()
	};
	Ok(config)
}

/// Decode base64 PEM CA data into DER certificates.
pub fn decode_ca_bundle(ca_data: &str) -> K8sResult<Vec<Vec<u8>>> {
	let pem = STANDARD
		.decode(ca_data.trim())
		.map_err(|e| K8sError::Config {
			message: format!("CA data is not valid base64: {e}"),
		})?;

	let certs = CertificateDer::pem_slice_iter(&pem)
		.map(|cert| cert.map(|der| der.to_vec()))
		.collect::<Result<Vec<_>, _>>()
		.map_err(|e| K8sError::Config {
			message: format!("failed to parse CA certificates: {e}"),
		})?;

	if certs.is_empty() {
		return Err(K8sError::Config {
			message: "CA data contains no certificates".to_string(),
		});
	}
	Ok(certs)
}

#[async_trait]
impl QuarantineClient for KubeClient {
	#[instrument(skip(self))]
	async fn label_namespace(&self, name: &str, key: &str, value: &str) -> K8sResult<Namespace> {
		let namespaces: Api<Namespace> = Api::all(self.client.clone());
		let patch = label_patch(key, value);
		match namespaces
			.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
			.await
		{
			Ok(ns) => {
				info!(namespace = %name, label = %format!("{key}={value}"), "Labeled namespace");
				Ok(ns)
			}
			Err(e) => {
				let err = K8sError::from_kube(e, "Namespace", name);
				error!(namespace = %name, error = %err, "Error labeling namespace");
				Err(err)
			}
		}
	}

	#[instrument(skip(self))]
	async fn label_pod(
		&self,
		namespace: &str,
		name: &str,
		key: &str,
		value: &str,
	) -> K8sResult<Pod> {
		let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
		let patch = label_patch(key, value);
		match pods
			.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
			.await
		{
			Ok(pod) => {
				info!(
					namespace = %namespace,
					pod = %name,
					label = %format!("{key}={value}"),
					"Labeled pod"
				);
				Ok(pod)
			}
			Err(e) => {
				let err = K8sError::from_kube(e, "Pod", name);
				error!(namespace = %namespace, pod = %name, error = %err, "Error labeling pod");
				Err(err)
			}
		}
	}

	async fn get_packet_capture(&self, namespace: &str, name: &str) -> K8sResult<PacketCapture> {
		let captures: Api<PacketCapture> = Api::namespaced(self.client.clone(), namespace);
		captures
			.get(name)
			.await
			.map_err(|e| K8sError::from_kube(e, PACKET_CAPTURE_KIND, name))
	}

	async fn create_packet_capture(
		&self,
		namespace: &str,
		capture: PacketCapture,
	) -> K8sResult<PacketCapture> {
		let name = capture.metadata.name.clone().unwrap_or_default();
		let captures: Api<PacketCapture> = Api::namespaced(self.client.clone(), namespace);
		captures
			.create(&PostParams::default(), &capture)
			.await
			.map_err(|e| K8sError::from_kube(e, PACKET_CAPTURE_KIND, &name))
	}
}
