use std::fmt;

/// Where a resolved request parameter came from.
///
/// Only used for display; control flow never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterSource {
    CliOption,
    SharedCredentials,
    SharedCredentialsBeforeMfaProfile,
    SharedCredentialsAfterMfaProfile,
    SharedConfig,
    SharedConfigBeforeMfaProfile,
    SharedConfigAfterMfaProfile,
    AppConfig,
    BuiltIn,
    EnvAwsDefaultRegion,
    EnvAwsRegion,
    EnvAwsProfile,
}

impl ParameterSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CliOption => "cli option",
            Self::SharedCredentials => "shared credentials file",
            Self::SharedCredentialsBeforeMfaProfile => {
                "shared credentials file (before-mfa profile)"
            }
            Self::SharedCredentialsAfterMfaProfile => "shared credentials file (after-mfa profile)",
            Self::SharedConfig => "shared config file",
            Self::SharedConfigBeforeMfaProfile => "shared config file (before-mfa profile)",
            Self::SharedConfigAfterMfaProfile => "shared config file (after-mfa profile)",
            Self::AppConfig => "awsmfa configuration file",
            Self::BuiltIn => "awsmfa build in default",
            Self::EnvAwsDefaultRegion => "env AWS_DEFAULT_REGION",
            Self::EnvAwsRegion => "env AWS_REGION",
            Self::EnvAwsProfile => "env AWS_PROFILE",
        }
    }
}

impl fmt::Display for ParameterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
