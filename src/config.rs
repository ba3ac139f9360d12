use std::{
    env, fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    constants::{
        self, DEFAULT_BEFORE_MFA_SUFFIX, DEFAULT_DURATION_SECONDS_ASSUME_ROLE,
        DEFAULT_DURATION_SECONDS_GET_SESSION_TOKEN, DEFAULT_ENDPOINT_REGION, DEFAULT_MODE,
        DEFAULT_PROFILE, DEFAULT_ROLE_SESSION_NAME, ENV_AWS_CONFIG_FILE,
        ENV_AWS_SHARED_CREDENTIALS_FILE, KEY_BEFORE_MFA_SUFFIX, KEY_CONFIG_FILE_PATH,
        KEY_CREDENTIALS_FILE_PATH, SECTION_DEFAULT_VALUE, SECTION_FILEPATH,
    },
    error::{Error, Result},
    params::Mode,
    store::ConfigStore,
};

/// Content written by `--generate-configuration-file`.
pub const CONFIGURATION_TEMPLATE: &str = "\
[filepath]
credentials_file_path = ${HOME}/.aws/credentials
config_file_path      = ${HOME}/.aws/config

[default-value]
suffix_of_before_mfa_profile       = -before-mfa
mode                               = get-session-token
profile                            = default
# mfa_serial                       = YOUR_SERIAL_HERE!!!
endpoint_region                    = aws-global
duration_seconds_get_session_token = 43200
duration_seconds_assume_role       = 3600
role_session_name                  = awsmfa-session
";

/// Built-in defaults, with file locations and the before-MFA suffix taken
/// from awsmfa's configuration file when it sets them.
///
/// Built once at startup and passed by reference afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub credentials_file: PathBuf,
    pub config_file: PathBuf,
    pub before_mfa_suffix: String,
    pub mode: String,
    pub profile: String,
    pub endpoint_region: String,
    pub duration_seconds_get_session_token: i32,
    pub duration_seconds_assume_role: i32,
    pub role_session_name: String,
}

impl Defaults {
    /// Built-in values only. File locations follow the AWS CLI conventions.
    pub fn built_in() -> Self {
        let home = dirs::home_dir().unwrap_or_default();

        Self {
            credentials_file: constants::get_aws_credentials_path()
                .unwrap_or_else(|| home.join(".aws").join("credentials")),
            config_file: constants::get_aws_config_path()
                .unwrap_or_else(|| home.join(".aws").join("config")),
            before_mfa_suffix: DEFAULT_BEFORE_MFA_SUFFIX.to_string(),
            mode: DEFAULT_MODE.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            endpoint_region: DEFAULT_ENDPOINT_REGION.to_string(),
            duration_seconds_get_session_token: DEFAULT_DURATION_SECONDS_GET_SESSION_TOKEN,
            duration_seconds_assume_role: DEFAULT_DURATION_SECONDS_ASSUME_ROLE,
            role_session_name: DEFAULT_ROLE_SESSION_NAME.to_string(),
        }
    }

    /// Merges the overrides found in awsmfa's configuration file.
    ///
    /// `AWS_SHARED_CREDENTIALS_FILE` and `AWS_CONFIG_FILE` take precedence over
    /// the `[filepath]` section.
    pub fn load(app: Option<&ConfigStore>) -> Self {
        let mut defaults = Self::built_in();
        let Some(app) = app else {
            return defaults;
        };

        if env::var_os(ENV_AWS_SHARED_CREDENTIALS_FILE).is_none()
            && let Some(path) = app.get_string(SECTION_FILEPATH, KEY_CREDENTIALS_FILE_PATH)
        {
            defaults.credentials_file = expand_path(path);
        }
        if env::var_os(ENV_AWS_CONFIG_FILE).is_none()
            && let Some(path) = app.get_string(SECTION_FILEPATH, KEY_CONFIG_FILE_PATH)
        {
            defaults.config_file = expand_path(path);
        }
        if let Some(suffix) = app.get_string(SECTION_DEFAULT_VALUE, KEY_BEFORE_MFA_SUFFIX) {
            defaults.before_mfa_suffix = suffix.to_string();
        }

        debug!("Defaults: {:?}", defaults);
        defaults
    }

    pub fn duration_seconds(&self, mode: Mode) -> i32 {
        match mode {
            Mode::GetSessionToken => self.duration_seconds_get_session_token,
            Mode::AssumeRole => self.duration_seconds_assume_role,
        }
    }
}

/// Expands a leading `~`, `$HOME` or `${HOME}` to the home directory.
pub fn expand_path(raw: &str) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(raw);
    };

    ["${HOME}", "$HOME", "~"]
        .iter()
        .find_map(|prefix| raw.strip_prefix(prefix))
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .map_or_else(
            || PathBuf::from(raw),
            |rest| home.join(rest.trim_start_matches('/')),
        )
}

/// Writes [`CONFIGURATION_TEMPLATE`] to `path`, refusing to overwrite an existing file.
pub fn generate_configuration_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(Error::ConfigurationExists {
            path: path.to_path_buf(),
        });
    }

    let save_error = |source| Error::Save {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(save_error)?;
    }
    fs::write(path, CONFIGURATION_TEMPLATE).map_err(save_error)?;

    info!("Created configuration file: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SectionLayout;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_without_configuration_file() {
        temp_env::with_vars_unset([ENV_AWS_SHARED_CREDENTIALS_FILE, ENV_AWS_CONFIG_FILE], || {
            let defaults = Defaults::load(None);
            assert_eq!(defaults, Defaults::built_in());
            assert_eq!(defaults.before_mfa_suffix, "-before-mfa");
            assert_eq!(defaults.mode, "get-session-token");
            assert_eq!(defaults.profile, "default");
            assert!(defaults.credentials_file.ends_with(".aws/credentials"));
            assert!(defaults.config_file.ends_with(".aws/config"));
        });
    }

    #[test]
    #[serial]
    fn test_load_overrides_paths_and_suffix() {
        let app = ConfigStore::from_content(
            "[filepath]\ncredentials_file_path = /tmp/creds\nconfig_file_path = /tmp/conf\n\
             [default-value]\nsuffix_of_before_mfa_profile = -long-term\n",
            SectionLayout::Plain,
        );

        temp_env::with_vars_unset([ENV_AWS_SHARED_CREDENTIALS_FILE, ENV_AWS_CONFIG_FILE], || {
            let defaults = Defaults::load(Some(&app));
            assert_eq!(defaults.credentials_file, PathBuf::from("/tmp/creds"));
            assert_eq!(defaults.config_file, PathBuf::from("/tmp/conf"));
            assert_eq!(defaults.before_mfa_suffix, "-long-term");
            assert_eq!(defaults.role_session_name, "awsmfa-session");
        });
    }

    #[test]
    #[serial]
    fn test_env_paths_beat_configuration_file() {
        let app = ConfigStore::from_content(
            "[filepath]\ncredentials_file_path = /tmp/creds\nconfig_file_path = /tmp/conf\n",
            SectionLayout::Plain,
        );

        temp_env::with_vars(
            [
                (ENV_AWS_SHARED_CREDENTIALS_FILE, Some("/env/creds")),
                (ENV_AWS_CONFIG_FILE, Some("/env/conf")),
            ],
            || {
                let defaults = Defaults::load(Some(&app));
                assert_eq!(defaults.credentials_file, PathBuf::from("/env/creds"));
                assert_eq!(defaults.config_file, PathBuf::from("/env/conf"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_empty_suffix_keeps_built_in() {
        let app = ConfigStore::from_content(
            "[default-value]\nsuffix_of_before_mfa_profile =\n",
            SectionLayout::Plain,
        );
        assert_eq!(Defaults::load(Some(&app)).before_mfa_suffix, "-before-mfa");
    }

    #[test]
    #[serial]
    fn test_duration_seconds_per_mode() {
        let defaults = Defaults::built_in();
        assert_eq!(defaults.duration_seconds(Mode::GetSessionToken), 43200);
        assert_eq!(defaults.duration_seconds(Mode::AssumeRole), 3600);
    }

    #[test]
    fn test_expand_path() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_path("${HOME}/.aws/credentials"), home.join(".aws/credentials"));
        assert_eq!(expand_path("$HOME/.aws/config"), home.join(".aws/config"));
        assert_eq!(expand_path("~/.aws/config"), home.join(".aws/config"));
        assert_eq!(expand_path("/etc/aws/config"), PathBuf::from("/etc/aws/config"));
        assert_eq!(expand_path("$HOMEDIR/x"), PathBuf::from("$HOMEDIR/x"));
    }

    #[test]
    fn test_generate_configuration_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".awsmfa").join("configuration");

        generate_configuration_file(&path).unwrap();
        let app = ConfigStore::load(&path, SectionLayout::Plain).unwrap();
        assert_eq!(app.get_string(SECTION_DEFAULT_VALUE, "mode"), Some("get-session-token"));
        assert_eq!(app.get_string(SECTION_DEFAULT_VALUE, "mfa_serial"), None);

        let err = generate_configuration_file(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigurationExists { .. }));
    }
}
