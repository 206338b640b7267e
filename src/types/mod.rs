// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pure checks and builders for the objects the patcher manages.

pub mod secret;
pub mod service_account;

pub use secret::SecretStatus;
pub use service_account::ServiceAccountPatch;
