use std::path::PathBuf;

use aws_smithy_types::date_time::DateTimeFormatError;
use thiserror::Error;

/// Errors raised while resolving parameters or touching the INI files.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid action mode '{0}': action mode should be \"get-session-token\" or \"assume-role\"")]
    InvalidMode(String),

    #[error("no mfa_serial specified. You can set it in {sources} or pass --serial-number")]
    MissingMfaSerial { sources: String },

    #[error("no awsmfa_role_arn specified. You can set it in {sources} or pass --role-arn")]
    MissingRoleArn { sources: String },

    #[error(
        "profile \"{profile}\" is not set in {path}. Print a template with '{flag} get-session-token' or '{flag} assume-role'"
    )]
    ProfileNotConfigured {
        profile: String,
        path: PathBuf,
        flag: &'static str,
    },

    #[error("failed to load {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to save {path}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("the file already exists: {path}")]
    ConfigurationExists { path: PathBuf },

    #[error("failed to format expiration time")]
    FormatExpiration(#[from] DateTimeFormatError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
