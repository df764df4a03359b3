// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Kubernetes object name rules (RFC 1123).
//!
//! Names end up as URL path segments, so anything that fails these checks
//! must never reach the API client.

const DNS1123_LABEL_MAX: usize = 63;
const DNS1123_SUBDOMAIN_MAX: usize = 253;

fn is_label_part(part: &str) -> bool {
	let bytes = part.as_bytes();
	match (bytes.first(), bytes.last()) {
		(Some(first), Some(last)) => {
			first.is_ascii_alphanumeric()
				&& last.is_ascii_alphanumeric()
				&& bytes
					.iter()
					.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
		}
		_ => false,
	}
}

/// Namespace names: lowercase alphanumerics and `-`, at most 63 chars,
/// starting and ending alphanumeric.
pub fn is_dns1123_label(name: &str) -> bool {
	name.len() <= DNS1123_LABEL_MAX && is_label_part(name)
}

/// Pod names: dot-separated labels, at most 253 chars overall.
pub fn is_dns1123_subdomain(name: &str) -> bool {
	name.len() <= DNS1123_SUBDOMAIN_MAX && name.split('.').all(is_label_part)
}
