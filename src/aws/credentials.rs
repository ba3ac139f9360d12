use std::{path::Path, time::SystemTime};

use aws_smithy_types::{DateTime, date_time::Format};
use tracing::{debug, info};

use super::Credentials;
use crate::{
    constants::{KEY_ACCESS_KEY_ID, KEY_EXPIRATION, KEY_SECRET_ACCESS_KEY, KEY_SESSION_TOKEN},
    error::Result,
    store::{ConfigStore, SectionLayout},
};

/// Returns the expiration of the session stored under `profile` if it is still usable.
///
/// A missing section, a missing expiration or one that doesn't parse all mean
/// the session has to be refreshed.
pub fn active_token_expiration(
    profile: &str,
    credentials: &ConfigStore,
    now: DateTime,
) -> Option<DateTime> {
    let raw = credentials.get_string(profile, KEY_EXPIRATION)?;

    let expiration = match parse_expiration(raw) {
        Some(expiration) => expiration,
        None => {
            debug!("Ignoring unparseable expiration for {}: {}", profile, raw);
            return None;
        }
    };

    (!is_expired(expiration, now)).then_some(expiration)
}

/// Convenience wrapper over [`active_token_expiration`] using the current time.
pub fn active_token_expiration_now(profile: &str, credentials: &ConfigStore) -> Option<DateTime> {
    active_token_expiration(profile, credentials, DateTime::from(SystemTime::now()))
}

/// A token expiring exactly at `now` is still active.
pub fn is_expired(expiration: DateTime, now: DateTime) -> bool {
    (now.secs(), now.subsec_nanos()) > (expiration.secs(), expiration.subsec_nanos())
}

pub fn format_expiration(expiration: &DateTime) -> Result<String> {
    Ok(expiration.fmt(Format::DateTime)?)
}

/// Parse expiration time - RFC 3339, in UTC or with an offset
pub fn parse_expiration(raw: &str) -> Option<DateTime> {
    DateTime::from_str(raw, Format::DateTime)
        .or_else(|_| DateTime::from_str(raw, Format::DateTimeWithOffset))
        .ok()
}

/// Save credentials to the shared credentials file under `profile`.
///
/// Only the four credential keys of that section change; comments, quoting
/// and every other section are written back as they were. The file is read
/// again right before writing so edits made since awsmfa started are kept.
/// Nothing locks the file; a concurrent writer between the reload and the
/// rename loses its change.
pub fn save_credentials(path: &Path, profile: &str, creds: &Credentials) -> Result<()> {
    let mut store = ConfigStore::load(path, SectionLayout::Plain)?;
    let expiration = format_expiration(&creds.expiration)?;

    store.set(profile, KEY_ACCESS_KEY_ID, &creds.access_key_id);
    store.set(profile, KEY_SECRET_ACCESS_KEY, &creds.secret_access_key);
    store.set(profile, KEY_SESSION_TOKEN, &creds.session_token);
    store.set(profile, KEY_EXPIRATION, &expiration);

    store.save()?;

    info!("Credentials saved to profile: {}", profile);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;

    const STORED: &str = r#"
[active]
aws_access_key_id = ASIAACTIVE
expiration = 2999-11-23T14:15:16Z

[expired]
aws_access_key_id = ASIAEXPIRED
expiration = 2021-11-23T14:15:16Z

[offset]
expiration = 2999-11-23T14:15:16+09:00

[garbage]
expiration = next tuesday

[no-expiration]
region = us-east-1
"#;

    fn at(raw: &str) -> DateTime {
        parse_expiration(raw).unwrap()
    }

    fn new_credentials() -> Credentials {
        Credentials {
            access_key_id: "NEWACCESSKEYID1111".to_string(),
            secret_access_key: "NEWSECRETACCESSKEY1111".to_string(),
            session_token: "NEWSESSIONTOKEN1111".to_string(),
            expiration: at("2999-11-23T14:15:16Z"),
        }
    }

    #[test]
    fn test_is_expired() {
        let due = DateTime::from_secs_and_nanos(1_637_676_916, 10);
        let earlier = DateTime::from_secs_and_nanos(1_606_140_916, 10);
        let later = DateTime::from_secs_and_nanos(1_669_212_916, 10);

        assert!(!is_expired(due, earlier));
        assert!(is_expired(due, later));
        assert!(!is_expired(due, due), "expiring exactly now is still active");
        assert!(is_expired(due, DateTime::from_secs_and_nanos(1_637_676_916, 11)));
    }

    #[test]
    fn test_active_token() {
        let store = ConfigStore::from_content(STORED, SectionLayout::Plain);
        let now = at("2024-01-01T00:00:00Z");

        assert_eq!(
            active_token_expiration("active", &store, now),
            Some(at("2999-11-23T14:15:16Z"))
        );
        assert_eq!(
            active_token_expiration("offset", &store, now),
            Some(at("2999-11-23T05:15:16Z")),
        );
    }

    #[test]
    fn test_inactive_token() {
        let store = ConfigStore::from_content(STORED, SectionLayout::Plain);
        let now = at("2024-01-01T00:00:00Z");

        for profile in ["expired", "garbage", "no-expiration", "missing"] {
            assert_eq!(active_token_expiration(profile, &store, now), None, "profile {profile}");
        }
    }

    #[test]
    fn test_token_expiring_now_is_active() {
        let store = ConfigStore::from_content(STORED, SectionLayout::Plain);
        let now = at("2021-11-23T14:15:16Z");
        assert_eq!(active_token_expiration("expired", &store, now), Some(now));
    }

    #[test]
    fn test_format_matches_parse() {
        let formatted = format_expiration(&at("2999-11-23T14:15:16Z")).unwrap();
        assert_eq!(formatted, "2999-11-23T14:15:16Z");
        assert_eq!(parse_expiration(&formatted), Some(at("2999-11-23T14:15:16Z")));
    }

    const EXISTING: &str = "\
# long-term keys, rotated quarterly
[existing-before-mfa]
aws_access_key_id = AKIALONGTERM
aws_secret_access_key = secret
mfa_serial = arn:aws:iam::123456789012:mfa/me

[existing]
region = ap-northeast-1
aws_access_key_id = OLD
aws_secret_access_key = OLD
aws_session_token = OLD
expiration = 2021-11-23T14:15:16Z

[tooling]
; managed by hand
credential_process = C:\\tools\\xtool.exe --profile tooling
description = \"team shared\"

[profile stray]
region = us-west-2
";

    #[test]
    fn test_save_credentials_into_existing_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, EXISTING).unwrap();

        save_credentials(&path, "existing", &new_credentials()).unwrap();

        let store = ConfigStore::load(&path, SectionLayout::Plain).unwrap();
        let expected = [
            ("aws_access_key_id", "NEWACCESSKEYID1111"),
            ("aws_secret_access_key", "NEWSECRETACCESSKEY1111"),
            ("aws_session_token", "NEWSESSIONTOKEN1111"),
            ("expiration", "2999-11-23T14:15:16Z"),
            ("region", "ap-northeast-1"),
        ];
        for (key, value) in expected {
            assert_eq!(store.get_string("existing", key), Some(value), "{key}");
        }
        assert_eq!(
            store.get_string("existing-before-mfa", "mfa_serial"),
            Some("arn:aws:iam::123456789012:mfa/me")
        );
    }

    #[test]
    fn test_save_credentials_keeps_rest_of_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, EXISTING).unwrap();

        save_credentials(&path, "existing", &new_credentials()).unwrap();

        let expected = EXISTING
            .replace("aws_access_key_id = OLD", "aws_access_key_id = NEWACCESSKEYID1111")
            .replace(
                "aws_secret_access_key = OLD",
                "aws_secret_access_key = NEWSECRETACCESSKEY1111",
            )
            .replace("aws_session_token = OLD", "aws_session_token = NEWSESSIONTOKEN1111")
            .replace("2021-11-23T14:15:16Z", "2999-11-23T14:15:16Z");
        assert_eq!(fs::read_to_string(&path).unwrap(), expected);
    }

    #[test]
    fn test_save_credentials_with_windows_paths_and_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, EXISTING).unwrap();

        save_credentials(&path, "fresh", &new_credentials()).unwrap();

        let store = ConfigStore::load(&path, SectionLayout::Plain).unwrap();
        assert_eq!(
            store.get_string("tooling", "credential_process"),
            Some("C:\\tools\\xtool.exe --profile tooling")
        );
        assert_eq!(store.get_string("tooling", "description"), Some("\"team shared\""));
        assert_eq!(store.get_string("profile stray", "region"), Some("us-west-2"));
        assert_eq!(store.get_string("fresh", "aws_session_token"), Some("NEWSESSIONTOKEN1111"));

        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.starts_with(EXISTING));
        assert!(saved.contains("# long-term keys, rotated quarterly\n"));
        assert!(saved.contains("; managed by hand\n"));
    }

    #[test]
    fn test_save_credentials_creates_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, "[new-before-mfa]\naws_access_key_id = AKIALONGTERM\n").unwrap();

        save_credentials(&path, "new", &new_credentials()).unwrap();

        let store = ConfigStore::load(&path, SectionLayout::Plain).unwrap();
        assert_eq!(store.get_string("new", "aws_access_key_id"), Some("NEWACCESSKEYID1111"));
        assert_eq!(
            active_token_expiration("new", &store, at("2024-01-01T00:00:00Z")),
            Some(at("2999-11-23T14:15:16Z"))
        );
    }

    #[test]
    fn test_save_credentials_rereads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, "[p-before-mfa]\naws_access_key_id = AKIALONGTERM\n").unwrap();

        let stale = ConfigStore::load(&path, SectionLayout::Plain).unwrap();
        fs::write(
            &path,
            "[p-before-mfa]\naws_access_key_id = AKIALONGTERM\n\n[edited]\nregion = eu-west-1\n",
        )
        .unwrap();

        save_credentials(&path, "p", &new_credentials()).unwrap();

        let store = ConfigStore::load(&path, SectionLayout::Plain).unwrap();
        assert!(!stale.has_section("edited"));
        assert_eq!(store.get_string("edited", "region"), Some("eu-west-1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_credentials_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, "").unwrap();

        save_credentials(&path, "p", &new_credentials()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_save_credentials_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_credentials(&dir.path().join("nope"), "p", &new_credentials()).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }
}
