// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Pod};

use crate::error::K8sError;
use crate::packet_capture::PacketCapture;

/// Cluster operations needed to quarantine a workload.
///
/// Implemented by [`crate::KubeClient`] against a live API server and by
/// [`crate::MockQuarantineClient`] in tests.
#[async_trait]
pub trait QuarantineClient: Send + Sync {
	/// Merge-patch a single label onto a namespace.
	async fn label_namespace(&self, name: &str, key: &str, value: &str)
		-> Result<Namespace, K8sError>;

	/// Merge-patch a single label onto a pod.
	async fn label_pod(
		&self,
		namespace: &str,
		name: &str,
		key: &str,
		value: &str,
	) -> Result<Pod, K8sError>;

	/// Fetch a packet capture. Missing captures are [`K8sError::NotFound`].
	async fn get_packet_capture(
		&self,
		namespace: &str,
		name: &str,
	) -> Result<PacketCapture, K8sError>;

	/// Create a packet capture. A concurrent writer surfaces as
	/// [`K8sError::AlreadyExists`].
	async fn create_packet_capture(
		&self,
		namespace: &str,
		capture: PacketCapture,
	) -> Result<PacketCapture, K8sError>;
}
