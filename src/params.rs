//! Request parameter resolution.
//!
//! Every resolver walks a fixed priority chain and stops at the first source
//! that supplies a non-empty (or, for durations, non-zero) value. Each result
//! carries the [`ParameterSource`] it came from so callers can show it.

use std::{env, fmt, str::FromStr};

use clap::ValueEnum;
use tracing::debug;

use crate::{
    constants::{
        ENV_AWS_DEFAULT_REGION, ENV_AWS_PROFILE, ENV_AWS_REGION, KEY_DURATION_SECONDS,
        KEY_ENDPOINT_REGION, KEY_MFA_SERIAL, KEY_MODE, KEY_PROFILE, KEY_REGION, KEY_ROLE_ARN,
        KEY_ROLE_SESSION_NAME, SECTION_DEFAULT_VALUE,
    },
    error::{Error, Result},
    profile::Profile,
    source::ParameterSource,
    store::ConfigStore,
};

/// Which STS API awsmfa calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    GetSessionToken,
    AssumeRole,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetSessionToken => "get-session-token",
            Self::AssumeRole => "assume-role",
        }
    }

    pub fn api_name(self) -> &'static str {
        match self {
            Self::GetSessionToken => "AWS STS GetSessionToken",
            Self::AssumeRole => "AWS STS AssumeRole",
        }
    }

    /// Key in awsmfa's configuration file holding the duration for this mode.
    fn duration_key(self) -> &'static str {
        match self {
            Self::GetSessionToken => "duration_seconds_get_session_token",
            Self::AssumeRole => "duration_seconds_assume_role",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "get-session-token" => Ok(Self::GetSessionToken),
            "assume-role" => Ok(Self::AssumeRole),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved value and the layer that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ParameterSource,
}

impl<T: fmt::Debug> Resolved<T> {
    pub fn new(value: T, source: ParameterSource) -> Self {
        Self { value, source }
    }

    fn logged(self, parameter: &'static str) -> Self {
        debug!(parameter, value = ?self.value, source = %self.source, "Resolved request parameter");
        self
    }
}

fn text(value: &str, source: ParameterSource) -> Resolved<String> {
    Resolved::new(value.to_string(), source)
}

/// The three INI files the resolvers read. awsmfa's own configuration file is optional.
#[derive(Debug, Clone, Copy)]
pub struct Stores<'a> {
    pub credentials: &'a ConfigStore,
    pub config: &'a ConfigStore,
    pub app: Option<&'a ConfigStore>,
}

impl<'a> Stores<'a> {
    fn app_default(&self, key: &str) -> Option<&'a str> {
        self.app
            .and_then(|app| app.get_string(SECTION_DEFAULT_VALUE, key))
    }

    fn app_default_int(&self, key: &str) -> Option<i32> {
        self.app
            .and_then(|app| app.get_int(SECTION_DEFAULT_VALUE, key))
    }

    /// Comma separated list of the files that were consulted, for error messages.
    fn describe(&self, include_app: bool) -> String {
        let mut paths = vec![
            self.credentials.path().display().to_string(),
            self.config.path().display().to_string(),
        ];
        if let Some(app) = self.app.filter(|_| include_app) {
            paths.push(app.path().display().to_string());
        }
        paths.join(", ")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Resolves the action mode.
///
/// 1. `--mode`, which must name a valid mode
/// 2. `awsmfa_role_arn` present under the before-MFA profile (credentials, then config)
/// 3. awsmfa's configuration file
/// 4. the built-in default, which must also be valid
pub fn resolve_mode(
    cli: Option<&str>,
    default: &str,
    profile: &Profile,
    stores: Stores<'_>,
) -> Result<Resolved<Mode>> {
    if let Some(cli) = non_empty(cli) {
        let mode = cli.parse::<Mode>()?;
        return Ok(Resolved::new(mode, ParameterSource::CliOption).logged("mode"));
    }

    let resolved = if stores.credentials.has_key(profile.before_mfa(), KEY_ROLE_ARN) {
        Resolved::new(Mode::AssumeRole, ParameterSource::SharedCredentials)
    } else if stores.config.has_key(profile.before_mfa(), KEY_ROLE_ARN) {
        Resolved::new(Mode::AssumeRole, ParameterSource::SharedConfig)
    } else if let Some(mode) = stores
        .app_default(KEY_MODE)
        .and_then(|v| v.parse::<Mode>().ok())
    {
        Resolved::new(mode, ParameterSource::AppConfig)
    } else {
        Resolved::new(default.parse::<Mode>()?, ParameterSource::BuiltIn)
    };

    Ok(resolved.logged("mode"))
}

/// Resolves the target profile: `--profile`, `AWS_PROFILE`, configuration file, built-in.
pub fn resolve_profile(
    cli: Option<&str>,
    default: &str,
    app: Option<&ConfigStore>,
) -> Resolved<String> {
    non_empty(cli)
        .map(|v| text(v, ParameterSource::CliOption))
        .or_else(|| {
            env_value(ENV_AWS_PROFILE).map(|v| Resolved::new(v, ParameterSource::EnvAwsProfile))
        })
        .or_else(|| {
            app.and_then(|app| app.get_string(SECTION_DEFAULT_VALUE, KEY_PROFILE))
                .map(|v| text(v, ParameterSource::AppConfig))
        })
        .unwrap_or_else(|| text(default, ParameterSource::BuiltIn))
        .logged("profile")
}

/// Resolves the token lifetime in seconds. A zero `--duration-seconds` counts as not given.
///
/// awsmfa's configuration file is checked for the mode-specific key first,
/// then the plain `duration_seconds` key.
pub fn resolve_duration_seconds(
    cli: Option<i32>,
    default: i32,
    mode: Mode,
    profile: &Profile,
    stores: Stores<'_>,
) -> Resolved<i32> {
    let section = profile.before_mfa();

    cli.filter(|d| *d != 0)
        .map(|d| Resolved::new(d, ParameterSource::CliOption))
        .or_else(|| {
            stores
                .credentials
                .get_int(section, KEY_DURATION_SECONDS)
                .map(|d| Resolved::new(d, ParameterSource::SharedCredentials))
        })
        .or_else(|| {
            stores
                .config
                .get_int(section, KEY_DURATION_SECONDS)
                .map(|d| Resolved::new(d, ParameterSource::SharedConfig))
        })
        .or_else(|| {
            stores
                .app_default_int(mode.duration_key())
                .or_else(|| stores.app_default_int(KEY_DURATION_SECONDS))
                .map(|d| Resolved::new(d, ParameterSource::AppConfig))
        })
        .unwrap_or_else(|| Resolved::new(default, ParameterSource::BuiltIn))
        .logged("duration_seconds")
}

/// Resolves the MFA device serial. There is no built-in fallback.
pub fn resolve_mfa_serial(
    cli: Option<&str>,
    profile: &Profile,
    stores: Stores<'_>,
) -> Result<Resolved<String>> {
    let section = profile.before_mfa();

    non_empty(cli)
        .map(|v| text(v, ParameterSource::CliOption))
        .or_else(|| {
            stores
                .credentials
                .get_string(section, KEY_MFA_SERIAL)
                .map(|v| text(v, ParameterSource::SharedCredentials))
        })
        .or_else(|| {
            stores
                .config
                .get_string(section, KEY_MFA_SERIAL)
                .map(|v| text(v, ParameterSource::SharedConfig))
        })
        .or_else(|| {
            stores
                .app_default(KEY_MFA_SERIAL)
                .map(|v| text(v, ParameterSource::AppConfig))
        })
        .map(|resolved| resolved.logged("mfa_serial"))
        .ok_or_else(|| Error::MissingMfaSerial {
            sources: stores.describe(true),
        })
}

/// Resolves the role to assume. There is no built-in fallback.
///
/// Only awsmfa's own `awsmfa_role_arn` key is read. The SDK's `role_arn`
/// would make the SDK chain roles by itself when loading the before-MFA profile.
pub fn resolve_role_arn(
    cli: Option<&str>,
    profile: &Profile,
    stores: Stores<'_>,
) -> Result<Resolved<String>> {
    let section = profile.before_mfa();

    non_empty(cli)
        .map(|v| text(v, ParameterSource::CliOption))
        .or_else(|| {
            stores
                .credentials
                .get_string(section, KEY_ROLE_ARN)
                .map(|v| text(v, ParameterSource::SharedCredentials))
        })
        .or_else(|| {
            stores
                .config
                .get_string(section, KEY_ROLE_ARN)
                .map(|v| text(v, ParameterSource::SharedConfig))
        })
        .map(|resolved| resolved.logged("role_arn"))
        .ok_or_else(|| Error::MissingRoleArn {
            sources: stores.describe(false),
        })
}

pub fn resolve_role_session_name(
    cli: Option<&str>,
    default: &str,
    profile: &Profile,
    stores: Stores<'_>,
) -> Resolved<String> {
    let section = profile.before_mfa();

    non_empty(cli)
        .map(|v| text(v, ParameterSource::CliOption))
        .or_else(|| {
            stores
                .credentials
                .get_string(section, KEY_ROLE_SESSION_NAME)
                .map(|v| text(v, ParameterSource::SharedCredentials))
        })
        .or_else(|| {
            stores
                .config
                .get_string(section, KEY_ROLE_SESSION_NAME)
                .map(|v| text(v, ParameterSource::SharedConfig))
        })
        .or_else(|| {
            stores
                .app_default(KEY_ROLE_SESSION_NAME)
                .map(|v| text(v, ParameterSource::AppConfig))
        })
        .unwrap_or_else(|| text(default, ParameterSource::BuiltIn))
        .logged("role_session_name")
}

/// Resolves the region of the STS endpoint.
///
/// 1. `--endpoint-region`
/// 2. `AWS_REGION`, then `AWS_DEFAULT_REGION`
/// 3. `region` of the before-MFA profile (credentials, then config)
/// 4. `region` of the bare profile (credentials, then config)
/// 5. awsmfa's configuration file (`endpoint_region`, then `region`)
/// 6. the built-in default
pub fn resolve_endpoint_region(
    cli: Option<&str>,
    default: &str,
    profile: &Profile,
    stores: Stores<'_>,
) -> Resolved<String> {
    let profile_region = |store: &ConfigStore, section: &str, source| {
        store
            .get_string(section, KEY_REGION)
            .map(|v| text(v, source))
    };

    non_empty(cli)
        .map(|v| text(v, ParameterSource::CliOption))
        .or_else(|| {
            env_value(ENV_AWS_REGION).map(|v| Resolved::new(v, ParameterSource::EnvAwsRegion))
        })
        .or_else(|| {
            env_value(ENV_AWS_DEFAULT_REGION)
                .map(|v| Resolved::new(v, ParameterSource::EnvAwsDefaultRegion))
        })
        .or_else(|| {
            profile_region(
                stores.credentials,
                profile.before_mfa(),
                ParameterSource::SharedCredentialsBeforeMfaProfile,
            )
        })
        .or_else(|| {
            profile_region(
                stores.config,
                profile.before_mfa(),
                ParameterSource::SharedConfigBeforeMfaProfile,
            )
        })
        .or_else(|| {
            profile_region(
                stores.credentials,
                profile.bare(),
                ParameterSource::SharedCredentialsAfterMfaProfile,
            )
        })
        .or_else(|| {
            profile_region(
                stores.config,
                profile.bare(),
                ParameterSource::SharedConfigAfterMfaProfile,
            )
        })
        .or_else(|| {
            stores
                .app_default(KEY_ENDPOINT_REGION)
                .or_else(|| stores.app_default(KEY_REGION))
                .map(|v| text(v, ParameterSource::AppConfig))
        })
        .unwrap_or_else(|| text(default, ParameterSource::BuiltIn))
        .logged("endpoint_region")
}
