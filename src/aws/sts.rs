use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::{Client as StsClient, types::Credentials as StsCredentials};
use tracing::{debug, info};

use super::Credentials;

/// Parameters shared by GetSessionToken and AssumeRole.
#[derive(Debug, Clone)]
pub struct MfaRequest<'a> {
    /// Profile holding the long-term credentials (the before-MFA profile)
    pub profile: &'a str,
    pub region: &'a str,
    pub duration_seconds: i32,
    pub serial_number: &'a str,
    pub token_code: &'a str,
}

/// Build an STS client from the before-MFA profile.
///
/// The SDK's own loader picks the long-term credentials so that environment
/// variables and file settings follow the usual AWS precedence.
async fn client(request: &MfaRequest<'_>) -> StsClient {
    info!("Using region: {}", request.region);

    let config = aws_config::defaults(BehaviorVersion::latest())
        .profile_name(request.profile)
        .region(Region::new(request.region.to_string()))
        .load()
        .await;

    StsClient::new(&config)
}

fn into_credentials(sts_creds: &StsCredentials) -> Credentials {
    Credentials {
        access_key_id: sts_creds.access_key_id().to_string(),
        secret_access_key: sts_creds.secret_access_key().to_string(),
        session_token: sts_creds.session_token().to_string(),
        expiration: *sts_creds.expiration(),
    }
}

pub async fn get_session_token(request: &MfaRequest<'_>) -> Result<Credentials> {
    info!("Calling AWS STS GetSessionToken");
    debug!("Profile: {}", request.profile);
    debug!("Serial number: {}", request.serial_number);
    debug!("Duration: {} seconds", request.duration_seconds);

    let response = client(request)
        .await
        .get_session_token()
        .duration_seconds(request.duration_seconds)
        .serial_number(request.serial_number)
        .token_code(request.token_code)
        .send()
        .await
        .context("Something occurred in calling AWS STS GetSessionToken API")?;

    let sts_creds = response
        .credentials()
        .context("AWS STS returned no credentials")?;

    info!("Successfully obtained AWS credentials");
    Ok(into_credentials(sts_creds))
}

pub async fn assume_role(
    request: &MfaRequest<'_>,
    role_arn: &str,
    role_session_name: &str,
) -> Result<Credentials> {
    info!("Calling AWS STS AssumeRole");
    debug!("Profile: {}", request.profile);
    debug!("Role ARN: {}", role_arn);
    debug!("Role session name: {}", role_session_name);
    debug!("Serial number: {}", request.serial_number);
    debug!("Duration: {} seconds", request.duration_seconds);

    let response = client(request)
        .await
        .assume_role()
        .role_arn(role_arn)
        .role_session_name(role_session_name)
        .duration_seconds(request.duration_seconds)
        .serial_number(request.serial_number)
        .token_code(request.token_code)
        .send()
        .await
        .context("Something occurred in calling AWS STS AssumeRole API")?;

    let sts_creds = response
        .credentials()
        .context("AWS STS returned no credentials")?;

    info!("Successfully obtained AWS credentials");
    Ok(into_credentials(sts_creds))
}
