// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod aws;
mod cluster;
mod http;
mod logging;
mod quarantine;

pub use aws::{AwsConfig, AwsConfigLayer};
pub use cluster::{ClusterConfig, ClusterConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use quarantine::{
	CaptureFilterConfig, CapturePort, CaptureProtocol, QuarantineConfig, QuarantineConfigLayer,
};
