// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Inbound detection events.
//!
//! Only the fields the dispatcher reads are modelled. Everything is optional,
//! unknown fields are ignored and a field of the wrong JSON type reads as
//! absent, so partial or enriched payloads still parse.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DetectionEvent {
	#[serde(default, deserialize_with = "lenient")]
	pub detail: Option<EventDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventDetail {
	#[serde(default, deserialize_with = "lenient")]
	pub mitre_tactic: Option<String>,
	#[serde(default, deserialize_with = "lenient")]
	pub record: Option<EventRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventRecord {
	#[serde(default, deserialize_with = "lenient")]
	pub source: Option<EventSource>,
}

/// The workload the detection was raised against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventSource {
	#[serde(default, deserialize_with = "lenient")]
	pub ip: Option<String>,
	#[serde(default, deserialize_with = "lenient")]
	pub name: Option<String>,
	#[serde(default, deserialize_with = "lenient")]
	pub namespace: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
	Value(T),
	Other(IgnoredAny),
}

/// `Some` only when the value has the expected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	Ok(match Option::<Lenient<T>>::deserialize(deserializer)? {
		Some(Lenient::Value(value)) => Some(value),
		Some(Lenient::Other(_)) | None => None,
	})
}

impl DetectionEvent {
	pub fn tactic(&self) -> Option<&str> {
		self.detail.as_ref()?.mitre_tactic.as_deref()
	}

	pub fn source(&self) -> Option<&EventSource> {
		self.detail.as_ref()?.record.as_ref()?.source.as_ref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn parses_full_event_and_ignores_unknown_fields() {
		let event: DetectionEvent = serde_json::from_value(json!({
			"version": "0",
			"detail-type": "Security Alert",
			"detail": {
				"mitre_tactic": "Initial Access",
				"severity": "HIGH",
				"record": {
					"source": { "ip": "10.0.0.5", "name": "attack", "namespace": "attack", "port": 443 }
				}
			}
		}))
		.unwrap();

		assert_eq!(event.tactic(), Some("Initial Access"));
		let source = event.source().unwrap();
		assert_eq!(source.ip.as_deref(), Some("10.0.0.5"));
		assert_eq!(source.name.as_deref(), Some("attack"));
		assert_eq!(source.namespace.as_deref(), Some("attack"));
	}

	#[test]
	fn empty_object_is_a_valid_event() {
		let event: DetectionEvent = serde_json::from_str("{}").unwrap();
		assert_eq!(event.tactic(), None);
		assert!(event.source().is_none());
	}

	#[test]
	fn event_without_record_has_no_source() {
		let event: DetectionEvent =
			serde_json::from_value(json!({ "detail": { "mitre_tactic": "Discovery" } })).unwrap();
		assert_eq!(event.tactic(), Some("Discovery"));
		assert!(event.source().is_none());
	}

	#[test]
	fn numeric_ip_does_not_reject_event() {
		let event: DetectionEvent = serde_json::from_value(json!({
			"detail": {
				"mitre_tactic": "Lateral Movement",
				"record": { "source": { "ip": 167772165, "name": "web-1", "namespace": "shop" } }
			}
		}))
		.unwrap();

		assert_eq!(event.tactic(), Some("Lateral Movement"));
		let source = event.source().unwrap();
		assert_eq!(source.ip, None);
		assert_eq!(source.name.as_deref(), Some("web-1"));
		assert_eq!(source.namespace.as_deref(), Some("shop"));
	}

	#[test]
	fn mistyped_fields_read_as_absent() {
		let event: DetectionEvent = serde_json::from_value(json!({
			"detail": { "mitre_tactic": ["Initial Access"], "record": "redacted" }
		}))
		.unwrap();
		assert_eq!(event.tactic(), None);
		assert!(event.source().is_none());

		let event: DetectionEvent =
			serde_json::from_value(json!({ "detail": "Initial Access" })).unwrap();
		assert!(event.detail.is_none());

		let event: DetectionEvent =
			serde_json::from_value(json!({ "detail": { "mitre_tactic": null } })).unwrap();
		assert_eq!(event.tactic(), None);
	}
}
