// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Verification and construction of the managed image pull secret

use crate::constants::{annotations, secret::*};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use std::fmt;

/// Result of comparing an existing secret with the expected payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretStatus {
    Ok,
    WrongType,
    NoKey,
    DataMismatch,
}

impl SecretStatus {
    pub fn is_ok(self) -> bool {
        self == SecretStatus::Ok
    }
}

impl fmt::Display for SecretStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SecretStatus::Ok => "SecretOk",
            SecretStatus::WrongType => "SecretWrongType",
            SecretStatus::NoKey => "SecretNoKey",
            SecretStatus::DataMismatch => "SecretDataNotMatch",
        };
        f.write_str(s)
    }
}

/// Check type, then key, then content; the first failing check wins
pub fn verify(secret: &Secret, payload: &str) -> SecretStatus {
    if secret.type_.as_deref() != Some(TYPE_DOCKER_CONFIG_JSON) {
        return SecretStatus::WrongType;
    }

    let Some(data) = secret
        .data
        .as_ref()
        .and_then(|d| d.get(DOCKER_CONFIG_JSON_KEY))
    else {
        return SecretStatus::NoKey;
    };

    if data.0 != payload.as_bytes() {
        return SecretStatus::DataMismatch;
    }

    SecretStatus::Ok
}

/// Check if a secret carries our managed-by annotation
pub fn is_managed(secret: &Secret) -> bool {
    secret
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::MANAGED_BY))
        .is_some_and(|v| v == annotations::APP_NAME)
}

/// Build the managed secret for a namespace
pub fn build(namespace: &str, secret_name: &str, payload: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(secret_name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations: Some(BTreeMap::from([(
                annotations::MANAGED_BY.to_string(),
                annotations::APP_NAME.to_string(),
            )])),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            DOCKER_CONFIG_JSON_KEY.to_string(),
            ByteString(payload.as_bytes().to_vec()),
        )])),
        type_: Some(TYPE_DOCKER_CONFIG_JSON.to_string()),
        ..Default::default()
    }
}
