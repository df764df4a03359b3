// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::{json, Value};

/// Merge-patch body setting exactly one label.
///
/// Other labels on the object are left untouched by merge-patch semantics.
pub fn label_patch(key: &str, value: &str) -> Value {
	json!({
		"metadata": {
			"labels": {
				key: value
			}
		}
	})
}
