// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Drives reconciliation passes over all namespaces.

use crate::config::Config;
use crate::error::{PatcherError, Result};
use crate::kubernetes::{is_namespace_excluded, list_namespaces};
use crate::reconcilers::{
    reconcile_secret, reconcile_service_accounts, SecretAction, ServiceAccountOutcome,
};
use kube::{Client, ResourceExt};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

/// What happened to one namespace during a pass
#[derive(Debug)]
pub enum NamespaceOutcome {
    Excluded,
    SecretFailed(PatcherError),
    ServiceAccountsFailed {
        secret: SecretAction,
        error: PatcherError,
    },
    Reconciled {
        secret: SecretAction,
        service_accounts: Vec<ServiceAccountOutcome>,
    },
}

/// Counters for one reconciliation pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub namespaces: usize,
    pub excluded: usize,
    pub secrets_created: usize,
    pub secrets_recreated: usize,
    pub service_accounts_patched: usize,
    pub failures: usize,
}

impl PassSummary {
    fn record(&mut self, outcome: &NamespaceOutcome) {
        self.namespaces += 1;

        let secret = match outcome {
            NamespaceOutcome::Excluded => {
                self.excluded += 1;
                return;
            }
            NamespaceOutcome::SecretFailed(_) => {
                self.failures += 1;
                return;
            }
            NamespaceOutcome::ServiceAccountsFailed { secret, .. } => {
                self.failures += 1;
                secret
            }
            NamespaceOutcome::Reconciled {
                secret,
                service_accounts,
            } => {
                for sa in service_accounts {
                    match sa {
                        ServiceAccountOutcome::Patched { .. } => {
                            self.service_accounts_patched += 1
                        }
                        ServiceAccountOutcome::Failed { .. } => self.failures += 1,
                        _ => {}
                    }
                }
                secret
            }
        };

        match secret {
            SecretAction::Created => self.secrets_created += 1,
            SecretAction::Recreated => self.secrets_recreated += 1,
            SecretAction::Unchanged => {}
        }
    }
}

/// Runs reconciliation passes until stopped, or once in run-once mode
pub struct SyncManager<'a> {
    client: Client,
    config: &'a Config,
}

impl<'a> SyncManager<'a> {
    pub fn new(client: Client, config: &'a Config) -> Self {
        Self { client, config }
    }

    /// Loop forever, pausing between passes. Returns after one pass in run-once mode.
    pub async fn run(&self) -> Result<()> {
        loop {
            debug!("Loop started");
            self.run_pass().await?;

            if self.config.run_once {
                info!("Exiting after single loop per CONFIG_RUNONCE");
                return Ok(());
            }

            sleep(self.config.loop_duration).await;
        }
    }

    /// Reconcile every namespace once.
    ///
    /// Fails only when the credential cannot be loaded or namespaces cannot be
    /// listed; per-namespace problems end up in the summary.
    #[instrument(skip(self))]
    pub async fn run_pass(&self) -> Result<PassSummary> {
        let payload = self.config.load_credential().await?;
        let namespaces = list_namespaces(&self.client).await?;

        let mut summary = PassSummary::default();
        for ns in &namespaces {
            let namespace = ns.name_any();
            let outcome = if is_namespace_excluded(ns, self.config) {
                info!("[{}] Namespace skipped", namespace);
                NamespaceOutcome::Excluded
            } else {
                self.reconcile_namespace(&namespace, &payload).await
            };
            summary.record(&outcome);
        }

        info!(
            namespaces = summary.namespaces,
            excluded = summary.excluded,
            secrets_created = summary.secrets_created,
            secrets_recreated = summary.secrets_recreated,
            service_accounts_patched = summary.service_accounts_patched,
            failures = summary.failures,
            "Reconciliation pass complete"
        );

        Ok(summary)
    }

    async fn reconcile_namespace(&self, namespace: &str, payload: &str) -> NamespaceOutcome {
        debug!("[{}] Start processing", namespace);

        let secret = match reconcile_secret(&self.client, namespace, self.config, payload).await {
            Ok(action) => action,
            Err(e) => {
                error!("{}", e);
                return NamespaceOutcome::SecretFailed(e);
            }
        };

        match reconcile_service_accounts(&self.client, namespace, self.config).await {
            Ok(service_accounts) => NamespaceOutcome::Reconciled {
                secret,
                service_accounts,
            },
            Err(e) => {
                error!("{}", e);
                NamespaceOutcome::ServiceAccountsFailed { secret, error: e }
            }
        }
    }
}
