// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-namespace reconcilers for the managed secret and service accounts.

pub mod secret;
pub mod service_account;

pub use secret::{reconcile_secret, SecretAction};
pub use service_account::{reconcile_service_accounts, ServiceAccountOutcome};
