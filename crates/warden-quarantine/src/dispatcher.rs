// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Detection event entry point.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use warden_config::{CapturePort, CaptureProtocol, QuarantineConfig};
use warden_k8s::{
	is_dns1123_label, is_dns1123_subdomain, PacketCaptureFilter, PacketCaptureSpec, Port, Protocol,
};

use crate::actions::{self, CaptureOutcome};
use crate::connector::ClusterConnector;
use crate::error::{QuarantineError, QuarantineResult};
use crate::event::DetectionEvent;

pub const SUCCESS_BODY: &str = "Event processed successfully.";

/// What happened to one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
	Quarantined {
		namespace: String,
		pod: String,
		capture: CaptureOutcome,
	},
	NotTriggered {
		tactic: Option<String>,
	},
	Failed(String),
}

impl Outcome {
	pub fn is_success(&self) -> bool {
		!matches!(self, Outcome::Failed(_))
	}

	pub fn response(&self) -> Response {
		match self {
			Outcome::Quarantined { .. } | Outcome::NotTriggered { .. } => Response {
				status_code: 200,
				body: SUCCESS_BODY.to_string(),
			},
			Outcome::Failed(reason) => Response {
				status_code: 500,
				body: format!("Event processing failed: {reason}"),
			},
		}
	}
}

/// Invocation result in the `{statusCode, body}` shape callers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	pub status_code: u16,
	pub body: String,
}

/// Namespace and pod to quarantine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
	pub namespace: String,
	pub pod: String,
}

impl Target {
	/// `None` unless both names are valid Kubernetes object names.
	pub fn new(namespace: &str, pod: &str) -> Option<Self> {
		if is_dns1123_label(namespace) && is_dns1123_subdomain(pod) {
			Some(Self {
				namespace: namespace.to_string(),
				pod: pod.to_string(),
			})
		} else {
			None
		}
	}
}

pub struct Dispatcher {
	config: QuarantineConfig,
	connector: Arc<dyn ClusterConnector>,
}

impl Dispatcher {
	pub fn new(config: QuarantineConfig, connector: Arc<dyn ClusterConnector>) -> Self {
		Self { config, connector }
	}

	pub fn is_triggered(&self, event: &DetectionEvent) -> bool {
		event.tactic() == Some(self.config.trigger_tactic.as_str())
	}

	#[instrument(skip_all, fields(tactic = event.tactic().unwrap_or_default()))]
	pub async fn handle(&self, event: &DetectionEvent) -> Outcome {
		if !self.is_triggered(event) {
			info!("Event does not match quarantine trigger");
			return Outcome::NotTriggered {
				tactic: event.tactic().map(str::to_string),
			};
		}

		match self.quarantine(event).await {
			Ok(outcome) => outcome,
			Err(e) => {
				error!(error = %e, "Event processing failed");
				Outcome::Failed(e.to_string())
			}
		}
	}

	async fn quarantine(&self, event: &DetectionEvent) -> QuarantineResult<Outcome> {
		let source = event.source();
		info!(
			source_ip = source.and_then(|s| s.ip.as_deref()).unwrap_or("unknown"),
			source_name = source.and_then(|s| s.name.as_deref()).unwrap_or("unknown"),
			source_namespace = source.and_then(|s| s.namespace.as_deref()).unwrap_or("unknown"),
			"Initial access detected, quarantining source"
		);

		let target = self.target(event)?;
		let client = self.connector.connect().await?;

		let key = &self.config.label_key;
		let value = &self.config.label_value;
		actions::label_namespace(client.as_ref(), &target.namespace, key, value).await?;
		actions::label_pod(client.as_ref(), &target.namespace, &target.pod, key, value).await?;
		let capture = actions::create_packet_capture(
			client.as_ref(),
			&target.namespace,
			&self.config.capture_name,
			self.capture_spec(Utc::now()),
		)
		.await?;

		info!(
			namespace = %target.namespace,
			pod = %target.pod,
			capture_created = capture.was_created(),
			"Quarantine complete"
		);
		Ok(Outcome::Quarantined {
			namespace: target.namespace,
			pod: target.pod,
			capture,
		})
	}

	/// The namespace and pod named by the event, else the configured fallback.
	///
	/// Names are checked against Kubernetes naming rules before use, since
	/// they become API path segments.
	pub fn target(&self, event: &DetectionEvent) -> QuarantineResult<Target> {
		let source = event.source();
		let namespace = source.and_then(|s| non_empty(s.namespace.as_deref()));
		let pod = source.and_then(|s| non_empty(s.name.as_deref()));

		if let (Some(namespace), Some(pod)) = (namespace, pod) {
			match Target::new(namespace, pod) {
				Some(target) => return Ok(target),
				None => warn!(
					namespace = %namespace,
					pod = %pod,
					"Event source is not a valid Kubernetes name"
				),
			}
		}

		match (&self.config.fallback_namespace, &self.config.fallback_pod) {
			(Some(namespace), Some(pod)) => {
				let target = Target::new(namespace, pod).ok_or_else(|| {
					QuarantineError::MissingTarget(format!(
						"fallback {namespace}/{pod} is not a valid Kubernetes name"
					))
				})?;
				info!(namespace = %namespace, pod = %pod, "Using fallback target");
				Ok(target)
			}
			_ => Err(QuarantineError::MissingTarget(
				"event has no valid source namespace and name, and no fallback is configured"
					.to_string(),
			)),
		}
	}

	/// Packet capture spec as of `now`.
	pub fn capture_spec(&self, now: DateTime<Utc>) -> PacketCaptureSpec {
		let mut spec = PacketCaptureSpec::new(self.config.capture_selector.clone()).filters(
			self.config
				.capture_filters
				.iter()
				.map(|f| PacketCaptureFilter {
					protocol: f.protocol.as_ref().map(|p| match p {
						CaptureProtocol::Number(n) => Protocol::Number(*n),
						CaptureProtocol::Name(name) => Protocol::Name(name.clone()),
					}),
					ports: f
						.ports
						.iter()
						.map(|p| match p {
							CapturePort::Number(n) => Port::Number(*n),
							CapturePort::Range(range) => Port::Range(range.clone()),
						})
						.collect(),
				})
				.collect(),
		);
		if let Some(secs) = self.config.capture_duration_secs {
			let secs = i64::try_from(secs).unwrap_or(i64::MAX);
			let end = Duration::try_seconds(secs)
				.and_then(|d| now.checked_add_signed(d))
				.unwrap_or(DateTime::<Utc>::MAX_UTC);
			spec = spec.window(now, end);
		}
		spec
	}
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use chrono::TimeZone;
	use serde_json::json;
	use warden_config::CaptureFilterConfig;
	use warden_k8s::QuarantineClient;

	struct UnreachableConnector;

	#[async_trait]
	impl ClusterConnector for UnreachableConnector {
		async fn connect(&self) -> QuarantineResult<Arc<dyn QuarantineClient>> {
			panic!("connector must not be used");
		}
	}

	fn dispatcher(config: QuarantineConfig) -> Dispatcher {
		Dispatcher::new(config, Arc::new(UnreachableConnector))
	}

	fn event(value: serde_json::Value) -> DetectionEvent {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn responses_match_outcomes() {
		let ok = Outcome::NotTriggered { tactic: None }.response();
		assert_eq!(
			serde_json::to_value(&ok).unwrap(),
			json!({ "statusCode": 200, "body": "Event processed successfully." })
		);

		let failed = Outcome::Failed("boom".to_string()).response();
		assert_eq!(failed.status_code, 500);
		assert_eq!(failed.body, "Event processing failed: boom");
	}

	#[test]
	fn trigger_is_exact_match() {
		let d = dispatcher(QuarantineConfig::default());
		assert!(d.is_triggered(&event(json!({ "detail": { "mitre_tactic": "Initial Access" } }))));
		assert!(!d.is_triggered(&event(json!({ "detail": { "mitre_tactic": "initial access" } }))));
		assert!(!d.is_triggered(&event(json!({ "detail": { "mitre_tactic": "Initial Access " } }))));
		assert!(!d.is_triggered(&event(json!({}))));
	}

	#[test]
	fn target_comes_from_source() {
		let d = dispatcher(QuarantineConfig::default());
		let target = d
			.target(&event(json!({
				"detail": { "record": { "source": { "name": "web-1", "namespace": "shop" } } }
			})))
			.unwrap();
		assert_eq!(
			target,
			Target {
				namespace: "shop".to_string(),
				pod: "web-1".to_string()
			}
		);
	}

	#[test]
	fn incomplete_source_uses_fallback() {
		let d = dispatcher(QuarantineConfig {
			fallback_namespace: Some("attack".to_string()),
			fallback_pod: Some("attack".to_string()),
			..Default::default()
		});
		let target = d
			.target(&event(json!({
				"detail": { "record": { "source": { "namespace": "shop", "name": "" } } }
			})))
			.unwrap();
		assert_eq!(target.namespace, "attack");
		assert_eq!(target.pod, "attack");
	}

	#[test]
	fn no_source_and_no_fallback_is_missing_target() {
		let d = dispatcher(QuarantineConfig::default());
		let err = d.target(&event(json!({}))).unwrap_err();
		assert!(matches!(err, QuarantineError::MissingTarget(_)));
	}

	#[test]
	fn path_like_source_falls_back() {
		let d = dispatcher(QuarantineConfig {
			fallback_namespace: Some("quarantine-zone".to_string()),
			fallback_pod: Some("decoy".to_string()),
			..Default::default()
		});
		let target = d
			.target(&event(json!({
				"detail": { "record": { "source": { "name": "b", "namespace": "a/pods/b" } } }
			})))
			.unwrap();
		assert_eq!(target.namespace, "quarantine-zone");
		assert_eq!(target.pod, "decoy");
	}

	#[test]
	fn invalid_source_without_fallback_is_missing_target() {
		let d = dispatcher(QuarantineConfig::default());
		for (namespace, name) in [("a/pods/b", "b"), ("attack", "../etc"), ("Attack", "web")] {
			let err = d
				.target(&event(json!({
					"detail": { "record": { "source": { "name": name, "namespace": namespace } } }
				})))
				.unwrap_err();
			assert!(matches!(err, QuarantineError::MissingTarget(_)));
		}
	}

	#[test]
	fn invalid_fallback_is_rejected() {
		let d = dispatcher(QuarantineConfig {
			fallback_namespace: Some("bad/ns".to_string()),
			fallback_pod: Some("decoy".to_string()),
			..Default::default()
		});
		let err = d.target(&event(json!({}))).unwrap_err();
		assert!(err.to_string().contains("bad/ns"));
	}

	#[test]
	fn default_capture_spec_is_selector_only() {
		let d = dispatcher(QuarantineConfig::default());
		let spec = d.capture_spec(Utc::now());
		assert_eq!(spec, PacketCaptureSpec::new("all()"));
	}

	#[test]
	fn configured_duration_and_filters_shape_the_capture() {
		let d = dispatcher(QuarantineConfig {
			capture_duration_secs: Some(600),
			capture_filters: vec![
				CaptureFilterConfig {
					protocol: Some(CaptureProtocol::Name("TCP".to_string())),
					ports: vec![CapturePort::Number(443)],
				},
				CaptureFilterConfig {
					protocol: Some(CaptureProtocol::Number(6)),
					ports: vec![CapturePort::Range("8080:8090".to_string())],
				},
			],
			..Default::default()
		});
		let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

		let spec = d.capture_spec(now);
		assert_eq!(spec.start_time, Some(now));
		assert_eq!(
			spec.end_time,
			Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 10, 0).unwrap())
		);
		assert_eq!(
			spec.filters,
			Some(vec![
				PacketCaptureFilter {
					protocol: Some(Protocol::Name("TCP".to_string())),
					ports: vec![Port::Number(443)],
				},
				PacketCaptureFilter {
					protocol: Some(Protocol::Number(6)),
					ports: vec![Port::Range("8080:8090".to_string())],
				},
			])
		);
	}
}
