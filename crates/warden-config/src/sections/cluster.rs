// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Target EKS cluster section.

use serde::Deserialize;

fn default_name() -> String {
	"demo".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ClusterConfigLayer {
	pub name: Option<String>,
}

impl ClusterConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.name.is_some() {
			self.name = other.name;
		}
	}

	pub fn finalize(self) -> ClusterConfig {
		ClusterConfig {
			name: self.name.unwrap_or_else(default_name),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
	pub name: String,
}

impl Default for ClusterConfig {
	fn default() -> Self {
		Self {
			name: default_name(),
		}
	}
}
