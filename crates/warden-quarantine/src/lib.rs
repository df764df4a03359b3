// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Quarantine response to detection events.
//!
//! [`Dispatcher::handle`] checks an event against the trigger tactic and, on a
//! match, connects to the cluster, labels the source namespace and pod, and
//! ensures a packet capture is running in that namespace.

pub mod actions;
mod connector;
mod dispatcher;
mod error;
mod event;

pub use actions::CaptureOutcome;
pub use connector::{ClusterConnector, EksConnector};
pub use dispatcher::{Dispatcher, Outcome, Response, Target, SUCCESS_BODY};
pub use error::{QuarantineError, QuarantineResult};
pub use event::{DetectionEvent, EventDetail, EventRecord, EventSource};
