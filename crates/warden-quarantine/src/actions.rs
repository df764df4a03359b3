// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Idempotent quarantine actions.
//!
//! Each action can be re-run safely: labels are merge patches and the packet
//! capture is only created when absent.

use tracing::{error, info, instrument};
use warden_k8s::{PacketCapture, PacketCaptureSpec, QuarantineClient};

use crate::error::QuarantineResult;

/// Result of ensuring a packet capture exists.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
	Created(PacketCapture),
	/// Already present, either before the check or created concurrently.
	AlreadyExisted(PacketCapture),
}

impl CaptureOutcome {
	pub fn capture(&self) -> &PacketCapture {
		match self {
			CaptureOutcome::Created(c) | CaptureOutcome::AlreadyExisted(c) => c,
		}
	}

	pub fn was_created(&self) -> bool {
		matches!(self, CaptureOutcome::Created(_))
	}
}

#[instrument(skip(client))]
pub async fn label_namespace(
	client: &dyn QuarantineClient,
	namespace: &str,
	key: &str,
	value: &str,
) -> QuarantineResult<()> {
	client
		.label_namespace(namespace, key, value)
		.await
		.map_err(|e| {
			error!(operation = "label_namespace", namespace = %namespace, error = %e, "Quarantine action failed");
			e
		})?;
	Ok(())
}

#[instrument(skip(client))]
pub async fn label_pod(
	client: &dyn QuarantineClient,
	namespace: &str,
	pod: &str,
	key: &str,
	value: &str,
) -> QuarantineResult<()> {
	client
		.label_pod(namespace, pod, key, value)
		.await
		.map_err(|e| {
			error!(operation = "label_pod", namespace = %namespace, pod = %pod, error = %e, "Quarantine action failed");
			e
		})?;
	Ok(())
}

/// Create the named packet capture unless it already exists.
///
/// Only a not-found lookup leads to a create. Any other lookup error fails
/// without creating. A create that loses a race to another writer re-reads
/// the winner and reports it as [`CaptureOutcome::AlreadyExisted`].
#[instrument(skip(client, spec))]
pub async fn create_packet_capture(
	client: &dyn QuarantineClient,
	namespace: &str,
	name: &str,
	spec: PacketCaptureSpec,
) -> QuarantineResult<CaptureOutcome> {
	match client.get_packet_capture(namespace, name).await {
		Ok(existing) => {
			info!(namespace = %namespace, capture = %name, "Packet capture already exists, skipped");
			return Ok(CaptureOutcome::AlreadyExisted(existing));
		}
		Err(e) if e.is_not_found() => {}
		Err(e) => {
			error!(operation = "get_packet_capture", namespace = %namespace, capture = %name, error = %e, "Quarantine action failed");
			return Err(e.into());
		}
	}

	let capture = PacketCapture::for_namespace(namespace, name, spec);
	match client.create_packet_capture(namespace, capture).await {
		Ok(created) => {
			info!(namespace = %namespace, capture = %name, "Created packet capture");
			Ok(CaptureOutcome::Created(created))
		}
		Err(e) if e.is_already_exists() => {
			info!(namespace = %namespace, capture = %name, "Packet capture created concurrently, skipped");
			let existing = client
				.get_packet_capture(namespace, name)
				.await
				.map_err(|e| {
					error!(operation = "get_packet_capture", namespace = %namespace, capture = %name, error = %e, "Quarantine action failed");
					e
				})?;
			Ok(CaptureOutcome::AlreadyExisted(existing))
		}
		Err(e) => {
			error!(operation = "create_packet_capture", namespace = %namespace, capture = %name, error = %e, "Quarantine action failed");
			Err(e.into())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::QuarantineError;
	use warden_k8s::{K8sError, MockOperation, MockQuarantineClient, RecordedCall};

	fn get(name: &str) -> RecordedCall {
		RecordedCall::GetPacketCapture {
			namespace: "attack".to_string(),
			name: name.to_string(),
		}
	}

	fn create(name: &str) -> RecordedCall {
		RecordedCall::CreatePacketCapture {
			namespace: "attack".to_string(),
			name: name.to_string(),
		}
	}

	#[tokio::test]
	async fn missing_capture_is_created() {
		let mock = MockQuarantineClient::new();

		let outcome =
			create_packet_capture(&mock, "attack", "collect-evidence", PacketCaptureSpec::new("all()"))
				.await
				.unwrap();

		assert!(outcome.was_created());
		assert_eq!(outcome.capture().spec.selector, "all()");
		assert_eq!(mock.calls(), vec![get("collect-evidence"), create("collect-evidence")]);
	}

	#[tokio::test]
	async fn existing_capture_is_left_alone() {
		let existing = PacketCapture::for_namespace(
			"attack",
			"collect-evidence",
			PacketCaptureSpec::new("app == 'old'"),
		);
		let mock = MockQuarantineClient::new().with_packet_capture(existing);

		let outcome =
			create_packet_capture(&mock, "attack", "collect-evidence", PacketCaptureSpec::new("all()"))
				.await
				.unwrap();

		assert!(!outcome.was_created());
		assert_eq!(outcome.capture().spec.selector, "app == 'old'");
		assert_eq!(mock.calls(), vec![get("collect-evidence")]);
	}

	#[tokio::test]
	async fn lookup_failure_never_creates() {
		let mock = MockQuarantineClient::new().forbid(MockOperation::GetPacketCapture);

		let err =
			create_packet_capture(&mock, "attack", "collect-evidence", PacketCaptureSpec::new("all()"))
				.await
				.unwrap_err();

		assert!(matches!(err, QuarantineError::K8s(K8sError::Forbidden { .. })));
		assert_eq!(mock.calls(), vec![get("collect-evidence")]);
	}

	#[tokio::test]
	async fn lost_create_race_rereads_existing() {
		let mock = MockQuarantineClient::new().lose_create_race();

		let outcome =
			create_packet_capture(&mock, "attack", "collect-evidence", PacketCaptureSpec::new("all()"))
				.await
				.unwrap();

		assert!(matches!(outcome, CaptureOutcome::AlreadyExisted(_)));
		assert_eq!(
			mock.calls(),
			vec![
				get("collect-evidence"),
				create("collect-evidence"),
				get("collect-evidence")
			]
		);
	}

	#[tokio::test]
	async fn create_failure_propagates() {
		let mock = MockQuarantineClient::new().forbid(MockOperation::CreatePacketCapture);

		let err =
			create_packet_capture(&mock, "attack", "collect-evidence", PacketCaptureSpec::new("all()"))
				.await
				.unwrap_err();

		assert!(matches!(err, QuarantineError::K8s(K8sError::Forbidden { .. })));
	}

	#[tokio::test]
	async fn labeling_missing_pod_propagates_not_found() {
		let mock = MockQuarantineClient::new();
		let err = label_pod(&mock, "attack", "attack", "quarantine", "true")
			.await
			.unwrap_err();
		assert!(matches!(err, QuarantineError::K8s(ref e) if e.is_not_found()));
	}

	#[tokio::test]
	async fn relabeling_is_idempotent() {
		let mock = MockQuarantineClient::new().with_pod("attack", "attack");
		label_namespace(&mock, "attack", "quarantine", "true").await.unwrap();
		label_namespace(&mock, "attack", "quarantine", "true").await.unwrap();

		let labels = mock.namespace_labels("attack");
		assert_eq!(labels.len(), 1);
		assert_eq!(labels.get("quarantine").map(String::as_str), Some("true"));
	}
}
