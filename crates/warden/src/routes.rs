// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP surface for `warden serve`.

use std::sync::Arc;

use axum::{
	extract::State,
	http::StatusCode,
	routing::{get, post},
	Json, Router,
};
use tower_http::trace::TraceLayer;
use warden_quarantine::{DetectionEvent, Dispatcher, Response};

#[derive(Clone)]
pub struct AppState {
	pub dispatcher: Arc<Dispatcher>,
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/events", post(handle_event))
		.route("/health", get(health))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

async fn handle_event(
	State(state): State<AppState>,
	Json(event): Json<DetectionEvent>,
) -> (StatusCode, Json<Response>) {
	let response = state.dispatcher.handle(&event).await.response();
	let status =
		StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
	(status, Json(response))
}

async fn health() -> &'static str {
	"ok"
}
