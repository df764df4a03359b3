// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory [`QuarantineClient`] for tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::client::QuarantineClient;
use crate::error::K8sError;
use crate::packet_capture::{PacketCapture, PACKET_CAPTURE_KIND};

/// Operations the mock can be told to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
	LabelNamespace,
	LabelPod,
	GetPacketCapture,
	CreatePacketCapture,
}

/// A call observed by the mock, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
	LabelNamespace {
		namespace: String,
		key: String,
		value: String,
	},
	LabelPod {
		namespace: String,
		pod: String,
		key: String,
		value: String,
	},
	GetPacketCapture {
		namespace: String,
		name: String,
	},
	CreatePacketCapture {
		namespace: String,
		name: String,
	},
}

#[derive(Default)]
struct MockState {
	calls: Vec<RecordedCall>,
	namespaces: HashMap<String, Namespace>,
	pods: HashMap<(String, String), Pod>,
	captures: HashMap<(String, String), PacketCapture>,
	forbidden: HashSet<MockOperation>,
	lose_create_race: bool,
}

/// Mock cluster holding namespaces, pods and packet captures in memory.
///
/// Labeling an object that was never seeded returns [`K8sError::NotFound`],
/// like a real API server would.
#[derive(Default)]
pub struct MockQuarantineClient {
	state: Mutex<MockState>,
}

impl MockQuarantineClient {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seed a namespace and a pod inside it.
	pub fn with_pod(self, namespace: &str, pod: &str) -> Self {
		{
			let mut state = self.state.lock().unwrap();
			state
				.namespaces
				.entry(namespace.to_string())
				.or_insert_with(|| Namespace {
					metadata: meta(None, namespace),
					..Default::default()
				});
			state.pods.insert(
				(namespace.to_string(), pod.to_string()),
				Pod {
					metadata: meta(Some(namespace), pod),
					..Default::default()
				},
			);
		}
		self
	}

	/// Seed an existing packet capture.
	pub fn with_packet_capture(self, capture: PacketCapture) -> Self {
		{
			let key = (
				capture.metadata.namespace.clone().unwrap_or_default(),
				capture.metadata.name.clone().unwrap_or_default(),
			);
			self.state.lock().unwrap().captures.insert(key, capture);
		}
		self
	}

	/// Make `operation` fail with a 403-style error.
	pub fn forbid(self, operation: MockOperation) -> Self {
		self.state.lock().unwrap().forbidden.insert(operation);
		self
	}

	/// Simulate another writer creating the capture between our existence
	/// check and our create call.
	pub fn lose_create_race(self) -> Self {
		self.state.lock().unwrap().lose_create_race = true;
		self
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.state.lock().unwrap().calls.clone()
	}

	pub fn namespace_labels(&self, namespace: &str) -> BTreeMap<String, String> {
		let state = self.state.lock().unwrap();
		state
			.namespaces
			.get(namespace)
			.and_then(|ns| ns.metadata.labels.clone())
			.unwrap_or_default()
	}

	pub fn pod_labels(&self, namespace: &str, pod: &str) -> BTreeMap<String, String> {
		let state = self.state.lock().unwrap();
		state
			.pods
			.get(&(namespace.to_string(), pod.to_string()))
			.and_then(|p| p.metadata.labels.clone())
			.unwrap_or_default()
	}

	pub fn packet_capture(&self, namespace: &str, name: &str) -> Option<PacketCapture> {
		let state = self.state.lock().unwrap();
		state
			.captures
			.get(&(namespace.to_string(), name.to_string()))
			.cloned()
	}
}

fn meta(namespace: Option<&str>, name: &str) -> ObjectMeta {
	ObjectMeta {
		name: Some(name.to_string()),
		namespace: namespace.map(str::to_string),
		..Default::default()
	}
}

fn forbidden(operation: MockOperation) -> K8sError {
	K8sError::Forbidden {
		message: format!("mock forbids {operation:?}"),
	}
}

#[async_trait]
impl QuarantineClient for MockQuarantineClient {
	async fn label_namespace(&self, name: &str, key: &str, value: &str) -> Result<Namespace, K8sError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(RecordedCall::LabelNamespace {
			namespace: name.to_string(),
			key: key.to_string(),
			value: value.to_string(),
		});
		if state.forbidden.contains(&MockOperation::LabelNamespace) {
			return Err(forbidden(MockOperation::LabelNamespace));
		}

		let ns = state
			.namespaces
			.get_mut(name)
			.ok_or_else(|| K8sError::NotFound {
				kind: "Namespace",
				name: name.to_string(),
			})?;
		ns.metadata
			.labels
			.get_or_insert_with(BTreeMap::new)
			.insert(key.to_string(), value.to_string());
		Ok(ns.clone())
	}

	async fn label_pod(
		&self,
		namespace: &str,
		name: &str,
		key: &str,
		value: &str,
	) -> Result<Pod, K8sError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(RecordedCall::LabelPod {
			namespace: namespace.to_string(),
			pod: name.to_string(),
			key: key.to_string(),
			value: value.to_string(),
		});
		if state.forbidden.contains(&MockOperation::LabelPod) {
			return Err(forbidden(MockOperation::LabelPod));
		}

		let pod = state
			.pods
			.get_mut(&(namespace.to_string(), name.to_string()))
			.ok_or_else(|| K8sError::NotFound {
				kind: "Pod",
				name: name.to_string(),
			})?;
		pod.metadata
			.labels
			.get_or_insert_with(BTreeMap::new)
			.insert(key.to_string(), value.to_string());
		Ok(pod.clone())
	}

	async fn get_packet_capture(
		&self,
		namespace: &str,
		name: &str,
	) -> Result<PacketCapture, K8sError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(RecordedCall::GetPacketCapture {
			namespace: namespace.to_string(),
			name: name.to_string(),
		});
		if state.forbidden.contains(&MockOperation::GetPacketCapture) {
			return Err(forbidden(MockOperation::GetPacketCapture));
		}

		state
			.captures
			.get(&(namespace.to_string(), name.to_string()))
			.cloned()
			.ok_or_else(|| K8sError::NotFound {
				kind: PACKET_CAPTURE_KIND,
				name: name.to_string(),
			})
	}

	async fn create_packet_capture(
		&self,
		namespace: &str,
		mut capture: PacketCapture,
	) -> Result<PacketCapture, K8sError> {
		let name = capture.metadata.name.clone().unwrap_or_default();
		let mut state = self.state.lock().unwrap();
		state.calls.push(RecordedCall::CreatePacketCapture {
			namespace: namespace.to_string(),
			name: name.clone(),
		});
		if state.forbidden.contains(&MockOperation::CreatePacketCapture) {
			return Err(forbidden(MockOperation::CreatePacketCapture));
		}

		let key = (namespace.to_string(), name.clone());
		if state.lose_create_race {
			state.lose_create_race = false;
			state.captures.insert(key.clone(), capture.clone());
		}
		if state.captures.contains_key(&key) {
			return Err(K8sError::AlreadyExists {
				kind: PACKET_CAPTURE_KIND,
				name,
			});
		}

		capture.metadata.namespace = Some(namespace.to_string());
		state.captures.insert(key, capture.clone());
		Ok(capture)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::packet_capture::PacketCaptureSpec;

	#[tokio::test]
	async fn labeling_unknown_namespace_is_not_found() {
		let mock = MockQuarantineClient::new();
		let err = mock
			.label_namespace("missing", "quarantine", "true")
			.await
			.unwrap_err();
		assert!(err.is_not_found());
		assert_eq!(mock.calls().len(), 1);
	}

	#[tokio::test]
	async fn labels_are_merged_into_existing_objects() {
		let mock = MockQuarantineClient::new().with_pod("attack", "attack");
		mock.label_pod("attack", "attack", "quarantine", "true")
			.await
			.unwrap();
		mock.label_pod("attack", "attack", "team", "red").await.unwrap();

		let labels = mock.pod_labels("attack", "attack");
		assert_eq!(labels.get("quarantine").map(String::as_str), Some("true"));
		assert_eq!(labels.get("team").map(String::as_str), Some("red"));
	}

	#[tokio::test]
	async fn second_create_conflicts() {
		let mock = MockQuarantineClient::new();
		let capture =
			PacketCapture::for_namespace("attack", "collect-evidence", PacketCaptureSpec::new("all()"));

		mock.create_packet_capture("attack", capture.clone())
			.await
			.unwrap();
		let err = mock
			.create_packet_capture("attack", capture)
			.await
			.unwrap_err();
		assert!(err.is_already_exists());
	}
}
