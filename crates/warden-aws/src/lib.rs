// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! AWS plumbing for Warden.
//!
//! This crate provides:
//! - SigV4 request signing (presigned URLs and `Authorization` headers)
//! - EKS bearer token generation from explicit credentials
//! - EKS `DescribeCluster` lookup of API endpoint and CA data

mod credentials;
mod eks;
mod error;
mod http;
pub mod sigv4;
mod token;

pub use credentials::AwsCredentials;
pub use eks::{ClusterInfo, EksClusterResolver};
pub use error::{AwsError, AwsResult};
pub use token::{BearerToken, TokenSigner, CLUSTER_ID_HEADER, TOKEN_EXPIRY_SECS, TOKEN_PREFIX};
