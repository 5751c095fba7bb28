//! CLI configuration: thin wrapper around `meshward_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --token, --timeout, --insecure).

use secrecy::SecretString;

use meshward_config::Profile;
use meshward_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use meshward_config::{Config, config_path, load_config_or_default};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// Build a `ClientConfig` from the config file, profile, and CLI overrides.
///
/// Flags win over profile values. Without a matching profile, `--api-url`
/// and `--token` (or their env vars) must both be present.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg, global);
    }

    let api_url = global.api_url.clone().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let token = global
        .token
        .clone()
        .map(SecretString::from)
        .ok_or(CliError::NoCredentials {
            profile: profile_name,
        })?;

    let adhoc = Profile {
        api_url,
        timeout: global.timeout,
        insecure: Some(global.insecure),
        ..Profile::default()
    };
    Ok(meshward_config::client_config_with_token(&adhoc, token, &cfg.defaults)?)
}

/// Translate a `Profile` + global flags into a `ClientConfig`.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<ClientConfig, CliError> {
    let effective = with_flag_overrides(profile, global);

    // --token bypasses the profile's credential chain
    let config = match global.token {
        Some(ref token) => meshward_config::client_config_with_token(
            &effective,
            SecretString::from(token.clone()),
            &cfg.defaults,
        )?,
        None => {
            meshward_config::profile_to_client_config(&effective, profile_name, &cfg.defaults)?
        }
    };
    Ok(config)
}

/// Profile with `--api-url`, `--timeout` and `--insecure` applied.
/// `--insecure` can only turn certificate checks off.
fn with_flag_overrides(profile: &Profile, global: &GlobalOpts) -> Profile {
    let mut effective = profile.clone();
    if let Some(ref url) = global.api_url {
        effective.api_url.clone_from(url);
    }
    effective.timeout = global.timeout.or(profile.timeout);
    effective.insecure = Some(global.insecure || profile.insecure.unwrap_or(false));
    effective
}
