// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Command-line flags, environment overrides and the validated runtime configuration.

use crate::constants::defaults;
use crate::error::{PatcherError, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;

/// Distributes an image pull secret to every namespace and patches service accounts to use it
#[derive(Parser, Debug, Clone)]
#[command(name = "imagepullsecret-patcher", version, about, long_about = None)]
pub struct Cli {
    /// Force to overwrite secrets when they do not match
    #[arg(
        long,
        env = "CONFIG_FORCE",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub force: bool,

    /// Show DEBUG logs
    #[arg(
        long,
        env = "CONFIG_DEBUG",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,

    /// Only modify secrets which are annotated as managed by imagepullsecret-patcher
    #[arg(
        long,
        env = "CONFIG_MANAGEDONLY",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub managedonly: bool,

    /// Run a single update and exit instead of looping
    #[arg(
        long,
        env = "CONFIG_RUNONCE",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub runonce: bool,

    /// If false, patch only the configured service accounts; if true, patch all service accounts
    #[arg(
        long,
        env = "CONFIG_ALLSERVICEACCOUNT",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub allserviceaccount: bool,

    /// JSON credential for authenticating the container registry, exclusive with --dockerconfigjsonpath
    #[arg(long, env = "CONFIG_DOCKERCONFIGJSON", hide_env_values = true)]
    pub dockerconfigjson: Option<String>,

    /// Path to a JSON file containing the registry credentials, exclusive with --dockerconfigjson
    #[arg(long, env = "CONFIG_DOCKERCONFIGJSONPATH")]
    pub dockerconfigjsonpath: Option<PathBuf>,

    /// Name of the managed secrets
    #[arg(long, env = "CONFIG_SECRETNAME", default_value = defaults::SECRET_NAME)]
    pub secretname: String,

    /// Comma-separated namespaces excluded from processing
    #[arg(long, env = "CONFIG_EXCLUDED_NAMESPACES", default_value = "")]
    pub excluded_namespaces: String,

    /// Comma-separated list of service accounts to patch
    #[arg(long, env = "CONFIG_SERVICEACCOUNTS", default_value = defaults::SERVICE_ACCOUNT)]
    pub serviceaccounts: String,

    /// Pause between two reconciliation passes (e.g. 10s, 1m30s)
    #[arg(
        long,
        env = "CONFIG_LOOP_DURATION",
        default_value = defaults::LOOP_DURATION,
        value_parser = parse_duration
    )]
    pub loop_duration: Duration,
}

/// Where the docker config json payload comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Inline(String),
    File(PathBuf),
}

/// Patcher configuration, fixed after startup
#[derive(Debug, Clone)]
pub struct Config {
    pub force: bool,
    pub debug: bool,
    pub managed_only: bool,
    pub run_once: bool,
    pub all_service_accounts: bool,
    pub credential: CredentialSource,
    pub secret_name: String,
    pub excluded_namespaces: Vec<String>,
    pub service_accounts: Vec<String>,
    pub loop_duration: Duration,
}

impl Config {
    /// Validate parsed flags and turn them into a configuration
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let inline = cli.dockerconfigjson.filter(|s| !s.is_empty());
        let path = cli
            .dockerconfigjsonpath
            .filter(|p| !p.as_os_str().is_empty());

        let credential = match (inline, path) {
            (Some(_), Some(_)) => {
                return Err(PatcherError::ConfigError(
                    "cannot specify both --dockerconfigjson and --dockerconfigjsonpath".to_string(),
                ))
            }
            (Some(json), None) => CredentialSource::Inline(json),
            (None, Some(path)) => CredentialSource::File(path),
            (None, None) => {
                return Err(PatcherError::ConfigError(
                    "one of --dockerconfigjson or --dockerconfigjsonpath is required".to_string(),
                ))
            }
        };

        if cli.secretname.is_empty() {
            return Err(PatcherError::ConfigError(
                "--secretname must not be empty".to_string(),
            ));
        }

        Ok(Config {
            force: cli.force,
            debug: cli.debug,
            managed_only: cli.managedonly,
            run_once: cli.runonce,
            all_service_accounts: cli.allserviceaccount,
            credential,
            secret_name: cli.secretname,
            excluded_namespaces: split_list(&cli.excluded_namespaces),
            service_accounts: split_list(&cli.serviceaccounts),
            loop_duration: cli.loop_duration,
        })
    }

    /// Resolve the docker config json payload.
    ///
    /// The file is read again on every call so a rotated credential is picked
    /// up on the next pass without restarting.
    pub async fn load_credential(&self) -> Result<String> {
        match &self.credential {
            CredentialSource::Inline(json) => Ok(json.clone()),
            CredentialSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                PatcherError::CredentialError(format!("failed to read {}: {}", path.display(), e))
            }),
        }
    }

    /// Whether the named service account should carry the managed secret
    pub fn is_target_service_account(&self, name: &str) -> bool {
        self.all_service_accounts || self.service_accounts.iter().any(|sa| sa == name)
    }

    /// Whether the namespace name appears verbatim in the exclusion list
    pub fn is_namespace_listed_excluded(&self, name: &str) -> bool {
        self.excluded_namespaces.iter().any(|ns| ns == name)
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Parse a Go-style duration such as `10s`, `1.5m`, `300us` or `2h45m0.5s`.
///
/// A bare `0` is accepted; every other value needs a unit on each part.
pub fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("duration cannot be empty".to_string());
    }
    if trimmed.starts_with('-') {
        return Err(format!("invalid duration '{}': must not be negative", trimmed));
    }

    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned == "0" {
        return Ok(Duration::ZERO);
    }

    let full = Regex::new(r"^(?:(?:\d+\.?\d*|\.\d+)(?:ns|us|µs|μs|ms|s|m|h))+$")
        .map_err(|e| e.to_string())?;
    if !full.is_match(unsigned) {
        return Err(format!(
            "invalid duration '{}': expected <number><unit> pairs with unit ns, us, ms, s, m or h",
            trimmed
        ));
    }

    let overflow = || format!("invalid duration '{}': value is too large", trimmed);

    let part = Regex::new(r"(?P<int>\d*)(?:\.(?P<frac>\d*))?(?P<unit>ns|us|µs|μs|ms|s|m|h)")
        .map_err(|e| e.to_string())?;
    let mut total: u64 = 0;
    for captures in part.captures_iter(unsigned) {
        let unit_nanos = match &captures["unit"] {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            unit => return Err(format!("invalid duration unit: {}", unit)),
        };

        let whole: u64 = match &captures["int"] {
            "" => 0,
            digits => digits.parse().map_err(|_| overflow())?,
        };
        let mut nanos = whole.checked_mul(unit_nanos).ok_or_else(overflow)?;
        if let Some(frac) = captures.name("frac") {
            nanos = nanos
                .checked_add(fraction_nanos(frac.as_str(), unit_nanos))
                .ok_or_else(overflow)?;
        }
        total = total.checked_add(nanos).ok_or_else(overflow)?;
    }

    Ok(Duration::from_nanos(total))
}

/// Nanoseconds contributed by the fractional digits of one part, truncated
fn fraction_nanos(digits: &str, unit_nanos: u64) -> u64 {
    let mut value: u128 = 0;
    let mut scale: u128 = 1;
    // digits past 10^-18 of a unit cannot change the result
    for d in digits.bytes().take(18) {
        value = value * 10 + u128::from(d - b'0');
        scale *= 10;
    }
    u64::try_from(value * u128::from(unit_nanos) / scale).unwrap_or(u64::MAX)
}
