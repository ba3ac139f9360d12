use std::fmt;

/// A target profile and the suffix naming its long-term ("before-MFA") variant.
///
/// The bare name receives the refreshed session credentials; the before-MFA
/// name holds the access keys, MFA serial and role settings used to get them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    before_mfa: String,
}

impl Profile {
    pub fn new(name: impl Into<String>, before_mfa_suffix: &str) -> Self {
        let name = name.into();
        let before_mfa = format!("{name}{before_mfa_suffix}");
        Self { name, before_mfa }
    }

    pub fn bare(&self) -> &str {
        &self.name
    }

    pub fn before_mfa(&self) -> &str {
        &self.before_mfa
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
