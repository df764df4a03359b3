// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use warden_common_secret::SecretString;

/// Everything needed to talk to one cluster for one invocation.
///
/// Lives only in memory; nothing here is ever written to a kubeconfig file.
#[derive(Debug, Clone)]
pub struct ClusterConnection {
	pub endpoint: String,
	/// Base64-encoded PEM CA bundle, as returned by EKS.
	pub ca_data: String,
	pub bearer_token: SecretString,
}
