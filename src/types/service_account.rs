// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Image pull secret references on service accounts

use k8s_openapi::api::core::v1::{LocalObjectReference, ServiceAccount};
use serde::{Deserialize, Serialize};

/// Merge patch body touching only `imagePullSecrets`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountPatch {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<LocalObjectReference>,
}

/// Check if the service account already references the named secret
pub fn has_secret_ref(sa: &ServiceAccount, secret_name: &str) -> bool {
    sa.image_pull_secrets
        .as_ref()
        .is_some_and(|refs| refs.iter().any(|r| r.name == secret_name))
}

/// Build a patch whose list is the current list, with `secret_name` appended if missing
pub fn build_patch(sa: &ServiceAccount, secret_name: &str) -> ServiceAccountPatch {
    let mut image_pull_secrets = sa.image_pull_secrets.clone().unwrap_or_default();
    if !has_secret_ref(sa, secret_name) {
        image_pull_secrets.push(LocalObjectReference {
            name: secret_name.to_string(),
        });
    }
    ServiceAccountPatch { image_pull_secrets }
}
