// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for namespace discovery and filtering.

pub mod namespaces;

pub use namespaces::{is_namespace_excluded, list_namespaces};
