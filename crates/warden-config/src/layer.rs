// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	AwsConfigLayer, ClusterConfigLayer, HttpConfigLayer, LoggingConfigLayer, QuarantineConfigLayer,
};

/// One source's view of the configuration; every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WardenConfigLayer {
	#[serde(default)]
	pub aws: Option<AwsConfigLayer>,
	#[serde(default)]
	pub cluster: Option<ClusterConfigLayer>,
	#[serde(default)]
	pub quarantine: Option<QuarantineConfigLayer>,
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl WardenConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: WardenConfigLayer) {
		merge_option(&mut self.aws, other.aws, AwsConfigLayer::merge);
		merge_option(&mut self.cluster, other.cluster, ClusterConfigLayer::merge);
		merge_option(
			&mut self.quarantine,
			other.quarantine,
			QuarantineConfigLayer::merge,
		);
		merge_option(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_empty_layers() {
		let mut base = WardenConfigLayer::default();
		base.merge(WardenConfigLayer::default());
		assert!(base.aws.is_none());
		assert!(base.quarantine.is_none());
	}

	#[test]
	fn test_merge_fills_missing_section() {
		let mut base = WardenConfigLayer::default();
		base.merge(WardenConfigLayer {
			cluster: Some(ClusterConfigLayer {
				name: Some("prod".to_string()),
			}),
			..Default::default()
		});
		assert_eq!(base.cluster.unwrap().name, Some("prod".to_string()));
	}

	#[test]
	fn test_merge_field_level_precedence() {
		let mut base = WardenConfigLayer {
			http: Some(HttpConfigLayer {
				host: Some("127.0.0.1".to_string()),
				port: Some(9000),
			}),
			..Default::default()
		};
		base.merge(WardenConfigLayer {
			http: Some(HttpConfigLayer {
				host: None,
				port: Some(9443),
			}),
			..Default::default()
		});

		let http = base.http.unwrap();
		assert_eq!(http.host, Some("127.0.0.1".to_string()));
		assert_eq!(http.port, Some(9443));
	}
}
