use crate::params::Mode;

const CREDENTIALS_SKELETON: &str = "\
[sample-before-mfa]
aws_access_key_id     = YOUR_ACCESS_KEY_ID_HERE!!!
aws_secret_access_key = YOUR_SECRET_ACCESS_KEY_HERE!!!
";

const CONFIG_SKELETON_GET_SESSION_TOKEN: &str = "\
[profile sample-before-mfa]
region     = REGION_TO_CONNECT_IN_EXECUTING_STS_GET_SESSION_TOKEN # Such as ap-northeast-1, us-east-1
output     = json
mfa_serial = YOUR_MFA_SERIAL_HERE!!! # Such as arn:aws:iam::XXXXXXXXXXX:mfa/YYYY

[profile sample]
region = REGION_TO_CONNECT_AFTER_MFA # Such as ap-northeast-1, us-east-1
output = json

# If you want to assume role (switch role), please uncomment below section.
# [profile switched-role]
# region         = REGION_TO_CONNECT_AFTER_ASSUMED_ROLE # Such as ap-northeast-1, us-east-1
# output         = json
# role_arn       = YOUR_ROLE_TO_ASSUME_HERE!!! # Such as arn:aws:iam::XXXXXXXXXXX:role/ZZZZ
# source_profile = sample-before-mfa
";

const CONFIG_SKELETON_ASSUME_ROLE: &str = "\
[profile sample-before-mfa]
region          = REGION_TO_CONNECT_IN_EXECUTING_STS_ASSUME_ROLE # Such as ap-northeast-1, us-east-1
output          = json
mfa_serial      = YOUR_MFA_SERIAL_HERE!!! # Such as arn:aws:iam::XXXXXXXXXXX:mfa/YYYY
awsmfa_role_arn = YOUR_ROLE_TO_ASSUME_HERE!!! # Such as arn:aws:iam::XXXXXXXXXXX:role/ZZZZ

[profile sample]
region = REGION_TO_CONNECT_AFTER_MFA # Such as ap-northeast-1, us-east-1
output = json
";

/// Template of the shared credentials file. Both modes only need the long-term keys.
pub fn credentials_skeleton(_mode: Mode) -> &'static str {
    CREDENTIALS_SKELETON
}

/// Template of the shared config file for `mode`.
pub fn config_skeleton(mode: Mode) -> &'static str {
    match mode {
        Mode::GetSessionToken => CONFIG_SKELETON_GET_SESSION_TOKEN,
        Mode::AssumeRole => CONFIG_SKELETON_ASSUME_ROLE,
    }
}
