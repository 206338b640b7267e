// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Service account reconciler - adds the managed secret to imagePullSecrets.

use crate::config::Config;
use crate::error::{PatcherError, Result};
use crate::types::service_account::{build_patch, has_secret_ref};
use k8s_openapi::api::core::v1::ServiceAccount;
use kube::{
    api::{ListParams, Patch, PatchParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, error, info, instrument};

/// Result of reconciling one service account
#[derive(Debug)]
pub enum ServiceAccountOutcome {
    NotTargeted { name: String },
    AlreadyReferenced { name: String },
    Patched { name: String },
    Failed { name: String, error: PatcherError },
}

impl ServiceAccountOutcome {
    pub fn name(&self) -> &str {
        match self {
            ServiceAccountOutcome::NotTargeted { name }
            | ServiceAccountOutcome::AlreadyReferenced { name }
            | ServiceAccountOutcome::Patched { name }
            | ServiceAccountOutcome::Failed { name, .. } => name,
        }
    }
}

/// Patch every targeted service account in a namespace.
///
/// Only listing the service accounts can fail the namespace; a failed patch
/// is recorded in that account's outcome and the others are still processed.
#[instrument(skip(client, config), fields(secret = %config.secret_name))]
pub async fn reconcile_service_accounts(
    client: &Client,
    namespace: &str,
    config: &Config,
) -> Result<Vec<ServiceAccountOutcome>> {
    let service_accounts: Api<ServiceAccount> = Api::namespaced(client.clone(), namespace);

    let list = service_accounts
        .list(&ListParams::default())
        .await
        .map_err(|e| PatcherError::ServiceAccountError {
            namespace: namespace.to_string(),
            message: format!("failed to list service accounts: {}", e),
        })?;

    let mut outcomes = Vec::with_capacity(list.items.len());
    for sa in &list.items {
        let name = sa.name_any();

        if !config.is_target_service_account(&name) {
            debug!("[{}] Skip service account [{}]", namespace, name);
            outcomes.push(ServiceAccountOutcome::NotTargeted { name });
            continue;
        }

        if has_secret_ref(sa, &config.secret_name) {
            debug!("[{}] ImagePullSecrets found on [{}]", namespace, name);
            outcomes.push(ServiceAccountOutcome::AlreadyReferenced { name });
            continue;
        }

        match patch_service_account(&service_accounts, namespace, sa, &config.secret_name).await {
            Ok(()) => {
                info!(
                    "[{}] Patched imagePullSecrets to service account [{}]",
                    namespace, name
                );
                outcomes.push(ServiceAccountOutcome::Patched { name });
            }
            Err(e) => {
                error!("{}", e);
                outcomes.push(ServiceAccountOutcome::Failed { name, error: e });
            }
        }
    }

    Ok(outcomes)
}

async fn patch_service_account(
    service_accounts: &Api<ServiceAccount>,
    namespace: &str,
    sa: &ServiceAccount,
    secret_name: &str,
) -> Result<()> {
    let name = sa.name_any();
    let patch = serde_json::to_value(build_patch(sa, secret_name))?;

    service_accounts
        .patch(&name, &PatchParams::default(), &Patch::Strategic(&patch))
        .await
        .map_err(|e| PatcherError::ServiceAccountError {
            namespace: namespace.to_string(),
            message: format!(
                "failed to patch imagePullSecrets to service account [{}]: {}",
                name, e
            ),
        })?;

    Ok(())
}
