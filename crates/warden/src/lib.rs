// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Warden: quarantines EKS workloads flagged by initial access detections.

pub mod handle;
pub mod logging;
pub mod routes;
pub mod version;

pub use handle::{handle_event, read_event};
pub use routes::{create_router, AppState};
