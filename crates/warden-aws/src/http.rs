// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP client used for AWS control-plane calls.

use std::time::Duration;

use reqwest::Client;

use crate::error::AwsResult;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Format: `warden/{version}`
pub fn user_agent() -> String {
	format!("warden/{}", env!("CARGO_PKG_VERSION"))
}

pub fn new_client() -> AwsResult<Client> {
	let client = Client::builder()
		.user_agent(user_agent())
		.timeout(DEFAULT_TIMEOUT)
		.redirect(reqwest::redirect::Policy::none())
		.build()?;
	Ok(client)
}
