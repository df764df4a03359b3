// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! K8s client abstraction for Warden quarantine actions.
//!
//! This crate provides:
//! - A trait-based client covering label patches and packet captures
//! - A production implementation built from an in-memory cluster connection
//! - The Calico `PacketCapture` custom resource type
//! - RFC 1123 name checks for untrusted object names
//! - An in-memory mock for tests (`mock` feature)

mod client;
mod connection;
mod error;
mod kube_client;
mod labels;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod names;
mod packet_capture;

pub use client::QuarantineClient;
pub use connection::ClusterConnection;
pub use error::{K8sError, K8sResult};
pub use k8s_openapi::api::core::v1::{Namespace, Pod};
pub use kube_client::{build_config, decode_ca_bundle, KubeClient};
pub use labels::label_patch;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockOperation, MockQuarantineClient, RecordedCall};
pub use names::{is_dns1123_label, is_dns1123_subdomain};
pub use packet_capture::{
	PacketCapture, PacketCaptureFilter, PacketCaptureSpec, Port, Protocol, PACKET_CAPTURE_KIND,
};
