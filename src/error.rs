// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::secret::SecretStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatcherError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to load docker config json: {0}")]
    CredentialError(String),

    #[error("Failed to list namespaces: {0}")]
    NamespaceListError(String),

    #[error("[{namespace}] Secret operation failed: {message}")]
    SecretError { namespace: String, message: String },

    #[error("[{namespace}] Secret is present but unmanaged")]
    SecretUnmanaged { namespace: String },

    #[error("[{namespace}] Secret is not valid ({status}), set --force to true to overwrite")]
    SecretInvalid {
        namespace: String,
        status: SecretStatus,
    },

    #[error("[{namespace}] Service account operation failed: {message}")]
    ServiceAccountError { namespace: String, message: String },

    #[error("Failed to serialize patch: {0}")]
    PatchError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PatcherError>;
