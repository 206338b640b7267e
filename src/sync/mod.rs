// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation loop over all namespaces.

pub mod manager;

pub use manager::{NamespaceOutcome, PassSummary, SyncManager};
