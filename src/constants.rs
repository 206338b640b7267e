// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys and values used by the patcher
pub mod annotations {
    /// Marks a secret as created by this tool
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
    /// Value of [`MANAGED_BY`] on secrets we own
    pub const APP_NAME: &str = "imagepullsecret-patcher";
    /// When set to "true" on a namespace, the namespace is skipped entirely
    pub const EXCLUDE: &str = "k8s.titansoft.com/imagepullsecret-patcher-exclude";
}

/// Secret type and data key for docker registry credentials
pub mod secret {
    pub const TYPE_DOCKER_CONFIG_JSON: &str = "kubernetes.io/dockerconfigjson";
    pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";
}

/// Configuration defaults
pub mod defaults {
    pub const SECRET_NAME: &str = "image-pull-secret";
    pub const SERVICE_ACCOUNT: &str = "default";
    pub const LOOP_DURATION: &str = "10s";
}
