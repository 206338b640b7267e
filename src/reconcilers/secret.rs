// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret reconciler - makes sure the managed pull secret exists and matches the payload.

use crate::config::Config;
use crate::error::{PatcherError, Result};
use crate::types::secret::{build, is_managed, verify};
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{DeleteParams, PostParams},
    Api, Client,
};
use tracing::{debug, info, instrument, warn};

/// What the reconciler did with the namespace's secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretAction {
    Created,
    Recreated,
    Unchanged,
}

/// Create, keep or replace the managed secret in one namespace
#[instrument(skip(client, config, payload), fields(secret = %config.secret_name))]
pub async fn reconcile_secret(
    client: &Client,
    namespace: &str,
    config: &Config,
    payload: &str,
) -> Result<SecretAction> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);

    let existing = match secrets.get(&config.secret_name).await {
        Ok(secret) => secret,
        Err(kube::Error::Api(err)) if err.code == 404 => {
            create_secret(&secrets, namespace, config, payload).await?;
            return Ok(SecretAction::Created);
        }
        Err(e) => {
            return Err(PatcherError::SecretError {
                namespace: namespace.to_string(),
                message: format!("failed to GET secret: {}", e),
            })
        }
    };

    let status = verify(&existing, payload);
    if status.is_ok() {
        debug!("[{}] Secret is valid", namespace);
        return Ok(SecretAction::Unchanged);
    }

    if config.managed_only && !is_managed(&existing) {
        return Err(PatcherError::SecretUnmanaged {
            namespace: namespace.to_string(),
        });
    }

    if !config.force {
        return Err(PatcherError::SecretInvalid {
            namespace: namespace.to_string(),
            status,
        });
    }

    warn!("[{}] Secret is not valid ({}), overwriting now", namespace, status);
    secrets
        .delete(&config.secret_name, &DeleteParams::default())
        .await
        .map_err(|e| PatcherError::SecretError {
            namespace: namespace.to_string(),
            message: format!("failed to delete secret [{}]: {}", config.secret_name, e),
        })?;
    warn!("[{}] Deleted secret [{}]", namespace, config.secret_name);

    create_secret(&secrets, namespace, config, payload).await?;
    Ok(SecretAction::Recreated)
}

async fn create_secret(
    secrets: &Api<Secret>,
    namespace: &str,
    config: &Config,
    payload: &str,
) -> Result<()> {
    let secret = build(namespace, &config.secret_name, payload);
    secrets
        .create(&PostParams::default(), &secret)
        .await
        .map_err(|e| PatcherError::SecretError {
            namespace: namespace.to_string(),
            message: format!("failed to create secret: {}", e),
        })?;
    info!("[{}] Created secret", namespace);
    Ok(())
}
