use anyhow::{Context, Result};
use clap::Args;
use dialoguer::{Input, theme::ColorfulTheme};
use tracing::info;

use crate::{
    aws::{
        self, Credentials,
        credentials::{active_token_expiration_now, format_expiration},
        sts::MfaRequest,
    },
    commands::skeleton,
    config::{self, Defaults},
    constants,
    display::{ParamTable, describe_duration},
    error::Error,
    params::{self, Mode, Resolved, Stores},
    profile::Profile,
    source::ParameterSource,
    store::{ConfigStore, SectionLayout},
};

const CREDENTIALS_SKELETON_FLAG: &str = "--generate-credentials-skeleton";
const CONFIG_SKELETON_FLAG: &str = "--generate-config-skeleton";

#[derive(Debug, Clone, Default, Args)]
pub struct TokenCommand {
    #[arg(
        short = 'm',
        long,
        help = "Action mode, get-session-token or assume-role. Turns to assume-role when awsmfa_role_arn is set for the profile"
    )]
    pub mode: Option<String>,

    #[arg(
        short = 'p',
        long,
        help = "Profile to refresh. Its long-term credentials are read from '<PROFILE>-before-mfa'"
    )]
    pub profile: Option<String>,

    #[arg(
        short = 'd',
        long,
        help = "Lifetime of the temporary credentials in seconds (GetSessionToken: 900-129600, AssumeRole: 900-43200)"
    )]
    pub duration_seconds: Option<i32>,

    #[arg(long, help = "Serial number or ARN of the MFA device")]
    pub serial_number: Option<String>,

    #[arg(short = 'e', long, help = "Region of the STS endpoint, such as ap-northeast-1")]
    pub endpoint_region: Option<String>,

    #[arg(short = 'r', long, help = "ARN of the IAM role to assume")]
    pub role_arn: Option<String>,

    #[arg(long, help = "Session name recorded in AWS CloudTrail for AssumeRole")]
    pub role_session_name: Option<String>,

    #[arg(
        short = 'f',
        long,
        help = "Refresh the temporary credentials even if they are still active"
    )]
    pub force: bool,

    #[arg(short = 's', long, help = "Hide where each request parameter came from")]
    pub silent: bool,

    #[arg(
        long,
        value_enum,
        value_name = "MODE",
        help = "Print a template of the shared credentials file"
    )]
    pub generate_credentials_skeleton: Option<Mode>,

    #[arg(
        long,
        value_enum,
        value_name = "MODE",
        help = "Print a template of the shared config file"
    )]
    pub generate_config_skeleton: Option<Mode>,

    #[arg(long, help = "Create awsmfa's configuration file at ~/.awsmfa/configuration")]
    pub generate_configuration_file: bool,
}

/// Role settings, only resolved in assume-role mode.
#[derive(Debug, Clone)]
struct RoleParams {
    role_arn: Resolved<String>,
    role_session_name: Resolved<String>,
}

/// Everything needed to call STS, with the source of each value.
#[derive(Debug, Clone)]
struct RequestParams {
    profile: Profile,
    profile_source: ParameterSource,
    mode: Resolved<Mode>,
    duration_seconds: Resolved<i32>,
    mfa_serial: Resolved<String>,
    endpoint_region: Resolved<String>,
    role: Option<RoleParams>,
}

impl TokenCommand {
    pub async fn execute(self) -> Result<()> {
        if let Some(mode) = self.generate_credentials_skeleton {
            print!("{}", skeleton::credentials_skeleton(mode));
            return Ok(());
        }
        if let Some(mode) = self.generate_config_skeleton {
            print!("{}", skeleton::config_skeleton(mode));
            return Ok(());
        }

        let app_config_path =
            constants::get_app_config_path().context("Failed to determine home directory")?;

        if self.generate_configuration_file {
            config::generate_configuration_file(&app_config_path)
                .context("Failed to initialize awsmfa's configuration file")?;
            println!(
                "Successfully created awsmfa's configuration file at {}",
                app_config_path.display()
            );
            return Ok(());
        }

        let app = ConfigStore::load_optional(&app_config_path, SectionLayout::Plain)
            .context("Failed to load awsmfa's configuration file")?;
        if app.is_none() {
            println!(
                "[Tips] Default values can be set in {}. Create it with 'awsmfa --generate-configuration-file'",
                app_config_path.display()
            );
        }

        let defaults = Defaults::load(app.as_ref());
        let credentials = ConfigStore::load(&defaults.credentials_file, SectionLayout::Plain)
            .context("Failed to load credentials file")?;
        let config = ConfigStore::load(&defaults.config_file, SectionLayout::Prefixed)
            .context("Failed to load config file")?;
        let stores = Stores {
            credentials: &credentials,
            config: &config,
            app: app.as_ref(),
        };

        let profile_name =
            params::resolve_profile(self.profile.as_deref(), &defaults.profile, app.as_ref());
        let profile = Profile::new(profile_name.value, &defaults.before_mfa_suffix);
        ensure_profile_configured(&profile, stores)?;

        if !self.force
            && let Some(expiration) = active_token_expiration_now(profile.bare(), &credentials)
        {
            println!(
                "Your temporary token is still active. Expires at {}",
                format_expiration(&expiration)?
            );
            return Ok(());
        }

        let request = self.resolve(&defaults, profile, profile_name.source, stores)?;

        println!("Try to get temporary token with following params ...");
        print!("{}", request.table(!self.silent));

        let token_code = prompt_token_code()?;
        let issued = request.call(&token_code).await?;

        aws::credentials::save_credentials(
            &defaults.credentials_file,
            request.profile.bare(),
            &issued,
        )
        .context("Failed to save temporary credentials to file")?;

        println!(
            "\nSuccess! New temporary credentials are saved as profile: {}",
            request.profile
        );
        println!(
            "Credentials will expire at: {}",
            format_expiration(&issued.expiration)?
        );

        Ok(())
    }

    /// Resolves the mode and the parameters that mode needs.
    fn resolve(
        &self,
        defaults: &Defaults,
        profile: Profile,
        profile_source: ParameterSource,
        stores: Stores<'_>,
    ) -> crate::Result<RequestParams> {
        let mode = params::resolve_mode(self.mode.as_deref(), &defaults.mode, &profile, stores)?;

        let duration_seconds = params::resolve_duration_seconds(
            self.duration_seconds,
            defaults.duration_seconds(mode.value),
            mode.value,
            &profile,
            stores,
        );
        let mfa_serial = params::resolve_mfa_serial(
            self.serial_number.as_deref(),
            &profile,
            stores,
        )?;
        let endpoint_region = params::resolve_endpoint_region(
            self.endpoint_region.as_deref(),
            &defaults.endpoint_region,
            &profile,
            stores,
        );

        let role = match mode.value {
            Mode::GetSessionToken => None,
            Mode::AssumeRole => Some(RoleParams {
                role_arn: params::resolve_role_arn(self.role_arn.as_deref(), &profile, stores)?,
                role_session_name: params::resolve_role_session_name(
                    self.role_session_name.as_deref(),
                    &defaults.role_session_name,
                    &profile,
                    stores,
                ),
            }),
        };

        Ok(RequestParams {
            profile,
            profile_source,
            mode,
            duration_seconds,
            mfa_serial,
            endpoint_region,
            role,
        })
    }
}

impl RequestParams {
    fn table(&self, show_source: bool) -> ParamTable {
        let mut table = ParamTable::new(show_source);

        table.row(
            "Profile to exec MFA",
            self.profile.before_mfa(),
            Some(self.profile_source),
        );
        if let Some(role) = &self.role {
            table.resolved("Role arn to assume", &role.role_arn);
            table.resolved("Role session name", &role.role_session_name);
        }
        table.row(
            "Duration of token",
            describe_duration(self.duration_seconds.value),
            Some(self.duration_seconds.source),
        );
        table.resolved("MFA device's serial", &self.mfa_serial);
        table.resolved("Region", &self.endpoint_region);
        table.row("API Type", self.mode.value.api_name(), Some(self.mode.source));

        table
    }

    async fn call(&self, token_code: &str) -> Result<Credentials> {
        let request = MfaRequest {
            profile: self.profile.before_mfa(),
            region: &self.endpoint_region.value,
            duration_seconds: self.duration_seconds.value,
            serial_number: &self.mfa_serial.value,
            token_code,
        };

        match &self.role {
            None => aws::sts::get_session_token(&request)
                .await
                .context("Failed to get-session-token"),
            Some(role) => aws::sts::assume_role(
                &request,
                &role.role_arn.value,
                &role.role_session_name.value,
            )
            .await
            .context("Failed to assume-role"),
        }
    }
}

/// The before-MFA profile must exist in both shared files before anything is resolved.
fn ensure_profile_configured(profile: &Profile, stores: Stores<'_>) -> crate::Result<()> {
    let checks = [
        (stores.credentials, CREDENTIALS_SKELETON_FLAG),
        (stores.config, CONFIG_SKELETON_FLAG),
    ];

    for (store, flag) in checks {
        if !store.has_section(profile.before_mfa()) {
            return Err(Error::ProfileNotConfigured {
                profile: profile.before_mfa().to_string(),
                path: store.path().to_path_buf(),
                flag,
            });
        }
    }

    info!("Profile {} is configured", profile.before_mfa());
    Ok(())
}

fn is_valid_token_code(input: &str) -> bool {
    input.len() == 6 && input.chars().all(|c| c.is_ascii_digit())
}

fn prompt_token_code() -> Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Input your MFA token code")
        .validate_with(|input: &String| {
            if is_valid_token_code(input) {
                Ok(())
            } else {
                Err("MFA token code must be 6 digits")
            }
        })
        .interact_text()
        .context("Failed to read MFA token code")
}
