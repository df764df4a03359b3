// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;
use warden_aws::AwsError;
use warden_k8s::K8sError;

pub type QuarantineResult<T> = Result<T, QuarantineError>;

#[derive(Debug, Error)]
pub enum QuarantineError {
	#[error(transparent)]
	Aws(#[from] AwsError),

	#[error(transparent)]
	K8s(#[from] K8sError),

	#[error("no quarantine target: {0}")]
	MissingTarget(String),
}
