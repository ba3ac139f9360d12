use std::{env, path::PathBuf};

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS shared config file name
pub const AWS_CONFIG_FILE_NAME: &str = "config";

/// AWS shared credentials file name
pub const AWS_CREDENTIALS_FILE_NAME: &str = "credentials";

/// Directory of awsmfa's own configuration file, under the home directory
pub const APP_CONFIG_DIR_NAME: &str = ".awsmfa";

/// awsmfa's configuration file name
pub const APP_CONFIG_FILE_NAME: &str = "configuration";

pub const ENV_AWS_PROFILE: &str = "AWS_PROFILE";
pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const ENV_AWS_CONFIG_FILE: &str = "AWS_CONFIG_FILE";
pub const ENV_AWS_SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";

/// Sections of awsmfa's configuration file
pub const SECTION_FILEPATH: &str = "filepath";
pub const SECTION_DEFAULT_VALUE: &str = "default-value";

/// Keys read from the shared credentials/config files
pub const KEY_ROLE_ARN: &str = "awsmfa_role_arn";
pub const KEY_MFA_SERIAL: &str = "mfa_serial";
pub const KEY_DURATION_SECONDS: &str = "duration_seconds";
pub const KEY_ROLE_SESSION_NAME: &str = "role_session_name";
pub const KEY_REGION: &str = "region";

/// Keys written by the credential persister
pub const KEY_ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const KEY_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const KEY_SESSION_TOKEN: &str = "aws_session_token";
pub const KEY_EXPIRATION: &str = "expiration";

/// Keys of awsmfa's configuration file
pub const KEY_CREDENTIALS_FILE_PATH: &str = "credentials_file_path";
pub const KEY_CONFIG_FILE_PATH: &str = "config_file_path";
pub const KEY_BEFORE_MFA_SUFFIX: &str = "suffix_of_before_mfa_profile";
pub const KEY_MODE: &str = "mode";
pub const KEY_PROFILE: &str = "profile";
pub const KEY_ENDPOINT_REGION: &str = "endpoint_region";

/// Suffix appended to a profile to name its long-term credentials
pub const DEFAULT_BEFORE_MFA_SUFFIX: &str = "-before-mfa";

pub const DEFAULT_MODE: &str = "get-session-token";

pub const DEFAULT_PROFILE: &str = "default";

/// Resolves to the global STS endpoint (sts.amazonaws.com)
pub const DEFAULT_ENDPOINT_REGION: &str = "aws-global";

/// GetSessionToken accepts up to 129600 seconds (36h)
pub const DEFAULT_DURATION_SECONDS_GET_SESSION_TOKEN: i32 = 43200;

/// AssumeRole accepts up to 43200 seconds (12h)
pub const DEFAULT_DURATION_SECONDS_ASSUME_ROLE: i32 = 3600;

/// Recorded in CloudTrail for AssumeRole calls
pub const DEFAULT_ROLE_SESSION_NAME: &str = "awsmfa-session";

/// Get the AWS config file path
/// Respects AWS_CONFIG_FILE environment variable if set
pub fn get_aws_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(ENV_AWS_CONFIG_FILE) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME).join(AWS_CONFIG_FILE_NAME))
}

/// Get the AWS credentials file path
/// Respects AWS_SHARED_CREDENTIALS_FILE environment variable if set
pub fn get_aws_credentials_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(ENV_AWS_SHARED_CREDENTIALS_FILE) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(AWS_CONFIG_DIR_NAME)
            .join(AWS_CREDENTIALS_FILE_NAME)
    })
}

/// Get awsmfa's configuration file path: ~/.awsmfa/configuration
pub fn get_app_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_CONFIG_DIR_NAME).join(APP_CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_get_aws_config_path_with_env() {
        temp_env::with_var(ENV_AWS_CONFIG_FILE, Some("/custom/aws/config"), || {
            let path = get_aws_config_path();
            assert_eq!(path, Some(PathBuf::from("/custom/aws/config")));
        });
    }

    #[test]
    #[serial]
    fn test_get_aws_config_path_default() {
        temp_env::with_var_unset(ENV_AWS_CONFIG_FILE, || {
            if let Some(p) = get_aws_config_path() {
                let path_str = p.to_string_lossy();
                assert!(path_str.contains(AWS_CONFIG_DIR_NAME));
                assert!(path_str.ends_with(AWS_CONFIG_FILE_NAME));
            }
        });
    }

    #[test]
    #[serial]
    fn test_get_aws_credentials_path_with_env() {
        temp_env::with_var(
            ENV_AWS_SHARED_CREDENTIALS_FILE,
            Some("/custom/path/credentials"),
            || {
                let path = get_aws_credentials_path();
                assert_eq!(path, Some(PathBuf::from("/custom/path/credentials")));
            },
        );
    }

    #[test]
    #[serial]
    fn test_get_aws_credentials_path_default() {
        temp_env::with_var_unset(ENV_AWS_SHARED_CREDENTIALS_FILE, || {
            if let Some(p) = get_aws_credentials_path() {
                let path_str = p.to_string_lossy();
                assert!(path_str.contains(AWS_CONFIG_DIR_NAME));
                assert!(path_str.ends_with(AWS_CREDENTIALS_FILE_NAME));
            }
        });
    }

    #[test]
    fn test_get_app_config_path() {
        if let Some(p) = get_app_config_path() {
            assert!(p.ends_with(".awsmfa/configuration"));
        }
    }
}
