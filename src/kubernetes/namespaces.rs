// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace listing and exclusion rules

use crate::config::Config;
use crate::constants::annotations;
use crate::error::{PatcherError, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{api::ListParams, Api, Client, ResourceExt};
use tracing::{debug, instrument};

/// List every namespace in the cluster
#[instrument(skip(client))]
pub async fn list_namespaces(client: &Client) -> Result<Vec<Namespace>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let list = namespaces
        .list(&ListParams::default())
        .await
        .map_err(|e| PatcherError::NamespaceListError(e.to_string()))?;

    debug!("Got {} namespaces", list.items.len());
    Ok(list.items)
}

/// Check if a namespace is opted out by annotation or listed in the exclusion config
pub fn is_namespace_excluded(ns: &Namespace, config: &Config) -> bool {
    let annotated = ns
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::EXCLUDE))
        .is_some_and(|v| v == "true");

    annotated || config.is_namespace_listed_excluded(&ns.name_any())
}
