// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for faking the Kubernetes API server.

use crate::config::{Config, CredentialSource};
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::{LocalObjectReference, Namespace, Secret, ServiceAccount};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

pub const PAYLOAD: &str = r#"{"auths":{"registry.example.com":{"auth":"dXNlcjpwYXNz"}}}"#;

/// Configuration used by reconciler tests: inline payload, force on, default service account
pub fn make_config() -> Config {
    Config {
        force: true,
        debug: false,
        managed_only: false,
        run_once: true,
        all_service_accounts: false,
        credential: CredentialSource::Inline(PAYLOAD.to_string()),
        secret_name: "image-pull-secret".to_string(),
        excluded_namespaces: vec![],
        service_accounts: vec!["default".to_string()],
        loop_duration: Duration::from_millis(10),
    }
}

pub fn make_opaque_secret(namespace: &str, name: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

pub fn make_service_account(namespace: &str, name: &str, refs: &[&str]) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        image_pull_secrets: if refs.is_empty() {
            None
        } else {
            Some(
                refs.iter()
                    .map(|r| LocalObjectReference {
                        name: r.to_string(),
                    })
                    .collect(),
            )
        },
        ..Default::default()
    }
}

#[derive(Default)]
struct State {
    namespaces: Vec<Namespace>,
    secrets: BTreeMap<(String, String), Secret>,
    service_accounts: BTreeMap<(String, String), ServiceAccount>,
    failures: HashMap<(String, String), u16>,
    requests: Vec<(String, String)>,
}

/// An in-memory API server for namespaces, secrets and service accounts.
///
/// Every request is recorded; `fail_on` makes an exact method/path pair return an error status.
#[derive(Clone, Default)]
pub struct FakeApiServer {
    state: Arc<Mutex<State>>,
}

impl FakeApiServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(self, name: &str) -> Self {
        self.with_namespace_object(Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    pub fn with_namespace_object(self, namespace: Namespace) -> Self {
        self.state.lock().unwrap().namespaces.push(namespace);
        self
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        let key = (secret.namespace().unwrap_or_default(), secret.name_any());
        self.state.lock().unwrap().secrets.insert(key, secret);
        self
    }

    pub fn with_service_account(self, sa: ServiceAccount) -> Self {
        let key = (sa.namespace().unwrap_or_default(), sa.name_any());
        self.state.lock().unwrap().service_accounts.insert(key, sa);
        self
    }

    /// Make requests with this exact method and path fail with `status`
    pub fn fail_on(self, method: &str, path: &str, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((method.to_string(), path.to_string()), status);
        self
    }

    /// Build a kube Client backed by this server
    pub fn client(&self) -> Client {
        Client::new(self.clone(), "default")
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.state
            .lock()
            .unwrap()
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn service_account(&self, namespace: &str, name: &str) -> Option<ServiceAccount> {
        self.state
            .lock()
            .unwrap()
            .service_accounts
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Names referenced by a service account's imagePullSecrets, in order
    pub fn image_pull_secrets(&self, namespace: &str, name: &str) -> Vec<String> {
        self.service_account(namespace, name)
            .and_then(|sa| sa.image_pull_secrets)
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.name)
            .collect()
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests that touched resources inside the given namespace
    pub fn requests_in_namespace(&self, namespace: &str) -> Vec<(String, String)> {
        let prefix = format!("/api/v1/namespaces/{}/", namespace);
        self.requests()
            .into_iter()
            .filter(|(_, path)| path.starts_with(&prefix))
            .collect()
    }
}

impl State {
    fn handle(&mut self, method: &str, path: &str, body: &[u8]) -> (u16, String) {
        self.requests.push((method.to_string(), path.to_string()));

        if let Some(status) = self.failures.get(&(method.to_string(), path.to_string())) {
            return (*status, status_json(*status, "InternalError", "injected failure"));
        }

        let segments: Vec<&str> = path
            .trim_start_matches("/api/v1/")
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match (method, segments.as_slice()) {
            ("GET", ["namespaces"]) => (200, list_json("NamespaceList", &self.namespaces)),
            ("GET", ["namespaces", ns, "secrets", name]) => {
                match self.secrets.get(&key(ns, name)) {
                    Some(secret) => (200, to_json(secret)),
                    None => not_found("secrets", name),
                }
            }
            ("POST", ["namespaces", ns, "secrets"]) => {
                let mut secret: Secret = match serde_json::from_slice(body) {
                    Ok(s) => s,
                    Err(e) => return (400, status_json(400, "BadRequest", &e.to_string())),
                };
                secret.metadata.namespace = Some(ns.to_string());
                let k = key(ns, &secret.name_any());
                if self.secrets.contains_key(&k) {
                    return (
                        409,
                        status_json(409, "AlreadyExists", "secret already exists"),
                    );
                }
                let json = to_json(&secret);
                self.secrets.insert(k, secret);
                (201, json)
            }
            ("DELETE", ["namespaces", ns, "secrets", name]) => {
                match self.secrets.remove(&key(ns, name)) {
                    Some(secret) => (200, to_json(&secret)),
                    None => not_found("secrets", name),
                }
            }
            ("GET", ["namespaces", ns, "serviceaccounts"]) => {
                let items: Vec<ServiceAccount> = self
                    .service_accounts
                    .iter()
                    .filter(|((n, _), _)| n == ns)
                    .map(|(_, sa)| sa.clone())
                    .collect();
                (200, list_json("ServiceAccountList", &items))
            }
            ("GET", ["namespaces", ns, "serviceaccounts", name]) => {
                match self.service_accounts.get(&key(ns, name)) {
                    Some(sa) => (200, to_json(sa)),
                    None => not_found("serviceaccounts", name),
                }
            }
            ("PATCH", ["namespaces", ns, "serviceaccounts", name]) => {
                let patch: serde_json::Value = match serde_json::from_slice(body) {
                    Ok(v) => v,
                    Err(e) => return (400, status_json(400, "BadRequest", &e.to_string())),
                };
                let Some(sa) = self.service_accounts.get_mut(&key(ns, name)) else {
                    return not_found("serviceaccounts", name);
                };
                if let Some(refs) = patch.get("imagePullSecrets") {
                    match serde_json::from_value::<Vec<LocalObjectReference>>(refs.clone()) {
                        Ok(refs) => sa.image_pull_secrets = Some(refs),
                        Err(e) => return (400, status_json(400, "BadRequest", &e.to_string())),
                    }
                }
                (200, to_json(&*sa))
            }
            _ => (
                404,
                status_json(404, "NotFound", &format!("no route for {} {}", method, path)),
            ),
        }
    }
}

fn key(namespace: &str, name: &str) -> (String, String) {
    (namespace.to_string(), name.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap()
}

fn list_json<T: serde::Serialize>(kind: &str, items: &[T]) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": kind,
        "metadata": {"resourceVersion": "1"},
        "items": items,
    })
    .to_string()
}

fn not_found(resource: &str, name: &str) -> (u16, String) {
    (
        404,
        status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name)),
    )
}

fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

impl Service<Request<Body>> for FakeApiServer {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);

        Box::pin(async move {
            let method = req.method().to_string();
            let path = req.uri().path().to_string();
            let body = req.into_body().collect().await?.to_bytes();

            let (status, json) = {
                let mut state = state.lock().unwrap();
                state.handle(&method, &path, &body)
            };

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(json.into_bytes()))
                .unwrap())
        })
    }
}
