// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-shot event handling for `warden handle`.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use warden_quarantine::{DetectionEvent, Dispatcher, Response};

/// Parse an event from `source`, a file path or `-` for stdin.
pub fn read_event(source: &str) -> anyhow::Result<DetectionEvent> {
	let raw = if source == "-" {
		let mut buf = String::new();
		std::io::stdin()
			.read_to_string(&mut buf)
			.context("failed to read event from stdin")?;
		buf
	} else {
		std::fs::read_to_string(Path::new(source))
			.with_context(|| format!("failed to read event file {source}"))?
	};

	serde_json::from_str(&raw).with_context(|| format!("event in {source} is not valid JSON"))
}

/// Dispatch one event and render the response.
pub async fn handle_event(dispatcher: &Dispatcher, event: &DetectionEvent) -> Response {
	dispatcher.handle(event).await.response()
}
