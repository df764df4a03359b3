// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Calico `PacketCapture` custom resource (`projectcalico.org/v3`).

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const PACKET_CAPTURE_KIND: &str = "PacketCapture";

/// Desired state of a packet capture.
///
/// Optional fields are omitted from the wire body when unset.
#[derive(Clone, Debug, Default, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
	group = "projectcalico.org",
	version = "v3",
	kind = "PacketCapture",
	plural = "packetcaptures",
	derive = "PartialEq",
	namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct PacketCaptureSpec {
	/// Calico selector for the endpoints to capture, e.g. `all()`.
	pub selector: String,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub start_time: Option<DateTime<Utc>>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub end_time: Option<DateTime<Utc>>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filters: Option<Vec<PacketCaptureFilter>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PacketCaptureFilter {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub protocol: Option<Protocol>,

	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub ports: Vec<Port>,
}

/// Calico accepts protocols by name (`TCP`) or by IANA number (`6`).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum Protocol {
	Number(u8),
	Name(String),
}

/// A single port (`443`), or a named port or range (`"8080:8090"`).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum Port {
	Number(u16),
	Range(String),
}

impl From<&str> for Protocol {
	fn from(name: &str) -> Self {
		Protocol::Name(name.to_string())
	}
}

impl PacketCaptureSpec {
	pub fn new(selector: impl Into<String>) -> Self {
		Self {
			selector: selector.into(),
			..Default::default()
		}
	}

	pub fn window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
		self.start_time = Some(start);
		self.end_time = Some(end);
		self
	}

	/// Empty filter lists are dropped rather than sent as `[]`.
	pub fn filters(mut self, filters: Vec<PacketCaptureFilter>) -> Self {
		self.filters = if filters.is_empty() { None } else { Some(filters) };
		self
	}
}

impl PacketCapture {
	/// A capture named `name` in `namespace`, ready to be created.
	pub fn for_namespace(namespace: &str, name: &str, spec: PacketCaptureSpec) -> Self {
		let mut capture = PacketCapture::new(name, spec);
		capture.metadata.namespace = Some(namespace.to_string());
		capture
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use serde_json::json;

	#[test]
	fn minimal_body_only_has_selector() {
		let capture = PacketCapture::for_namespace(
			"attack",
			"collect-evidence",
			PacketCaptureSpec::new("all()"),
		);

		let body = serde_json::to_value(&capture).unwrap();
		assert_eq!(body["apiVersion"], "projectcalico.org/v3");
		assert_eq!(body["kind"], "PacketCapture");
		assert_eq!(body["metadata"]["name"], "collect-evidence");
		assert_eq!(body["metadata"]["namespace"], "attack");
		assert_eq!(body["spec"], json!({ "selector": "all()" }));
	}

	#[test]
	fn optional_fields_serialize_in_camel_case() {
		let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
		let end = Utc.with_ymd_and_hms(2024, 6, 1, 12, 10, 0).unwrap();
		let spec = PacketCaptureSpec::new("app == 'web'")
			.window(start, end)
			.filters(vec![PacketCaptureFilter {
				protocol: Some("TCP".into()),
				ports: vec![Port::Number(443), Port::Range("8080:8090".to_string())],
			}]);

		let body = serde_json::to_value(&spec).unwrap();
		assert_eq!(body["startTime"], "2024-06-01T12:00:00Z");
		assert_eq!(body["endTime"], "2024-06-01T12:10:00Z");
		assert_eq!(
			body["filters"],
			json!([{ "protocol": "TCP", "ports": [443, "8080:8090"] }])
		);
	}

	#[test]
	fn empty_filters_are_omitted() {
		let spec = PacketCaptureSpec::new("all()").filters(Vec::new());
		let body = serde_json::to_value(&spec).unwrap();
		assert!(body.get("filters").is_none());
	}

	#[test]
	fn deserializes_capture_with_status_and_unknown_fields() {
		let capture: PacketCapture = serde_json::from_value(json!({
			"apiVersion": "projectcalico.org/v3",
			"kind": "PacketCapture",
			"metadata": { "name": "collect-evidence", "namespace": "attack" },
			"spec": { "selector": "all()", "filters": [{ "protocol": "UDP" }] },
			"status": { "files": [] }
		}))
		.unwrap();

		assert_eq!(capture.spec.selector, "all()");
		assert_eq!(capture.spec.filters.unwrap()[0].protocol, Some("UDP".into()));
	}

	#[test]
	fn accepts_port_ranges_and_numeric_protocols() {
		let capture: PacketCapture = serde_json::from_value(json!({
			"apiVersion": "projectcalico.org/v3",
			"kind": "PacketCapture",
			"metadata": { "name": "collect-evidence", "namespace": "attack" },
			"spec": {
				"selector": "all()",
				"filters": [
					{ "protocol": 6, "ports": ["8080:8090", 443] },
					{ "protocol": "UDP", "ports": ["dns"] }
				]
			}
		}))
		.unwrap();

		let filters = capture.spec.filters.unwrap();
		assert_eq!(filters[0].protocol, Some(Protocol::Number(6)));
		assert_eq!(
			filters[0].ports,
			vec![Port::Range("8080:8090".to_string()), Port::Number(443)]
		);
		assert_eq!(filters[1].ports, vec![Port::Range("dns".to_string())]);
	}
}
