//! Thin typed accessor over the INI files awsmfa reads and writes.
//!
//! Absence of a section or key is never an error here; callers decide what a
//! missing value means.
//!
//! Reads go through `rust-ini` with quote and escape processing off, since the
//! AWS files are raw text (`credential_process = C:\tools\x.exe` is valid).
//! Writes edit the loaded text line by line so comments, spacing and sections
//! awsmfa never touches come back out unchanged.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use ini::{Ini, ParseOption, Properties};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};

/// How a profile name maps onto a section name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionLayout {
    /// `[name]`, as in the shared credentials file and awsmfa's configuration file.
    Plain,
    /// `[profile name]`, as in the shared config file. `default` stays unprefixed.
    Prefixed,
}

impl SectionLayout {
    pub fn section_name(self, profile: &str) -> String {
        match self {
            Self::Plain => profile.to_string(),
            Self::Prefixed if profile == "default" => profile.to_string(),
            Self::Prefixed => format!("profile {profile}"),
        }
    }
}

/// One loaded INI file together with the path it came from.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    ini: Ini,
    /// The file content, with every [`ConfigStore::set`] applied.
    text: String,
    path: PathBuf,
    layout: SectionLayout,
}

fn parse(text: &str) -> std::result::Result<Ini, ini::ParseError> {
    let option = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    Ini::load_from_str_opt(text, option)
}

impl ConfigStore {
    pub fn load(path: impl Into<PathBuf>, layout: SectionLayout) -> Result<Self> {
        let path = path.into();
        let load_error = |source| Error::Load {
            path: path.clone(),
            source,
        };

        let text = fs::read_to_string(&path).map_err(|e| load_error(ini::Error::Io(e)))?;
        let ini = parse(&text).map_err(|e| load_error(ini::Error::Parse(e)))?;
        debug!("Loaded {}", path.display());

        Ok(Self {
            ini,
            text,
            path,
            layout,
        })
    }

    /// Like [`ConfigStore::load`], but a missing file yields `None`.
    pub fn load_optional(path: impl Into<PathBuf>, layout: SectionLayout) -> Result<Option<Self>> {
        let path = path.into();
        if !path.exists() {
            debug!("{} does not exist", path.display());
            return Ok(None);
        }
        Self::load(path, layout).map(Some)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn section_name(&self, profile: &str) -> String {
        self.layout.section_name(profile)
    }

    pub fn section(&self, profile: &str) -> Option<&Properties> {
        self.ini.section(Some(self.section_name(profile)))
    }

    pub fn has_section(&self, profile: &str) -> bool {
        self.section(profile).is_some()
    }

    pub fn has_key(&self, profile: &str, key: &str) -> bool {
        self.section(profile)
            .is_some_and(|section| section.contains_key(key))
    }

    /// Returns the value of `key`, treating an empty value as absent.
    pub fn get_string(&self, profile: &str, key: &str) -> Option<&str> {
        self.section(profile)
            .and_then(|section| section.get(key))
            .filter(|value| !value.is_empty())
    }

    /// Returns the value of `key` parsed as an integer. Unparseable values are absent.
    pub fn get_int(&self, profile: &str, key: &str) -> Option<i32> {
        self.get_string(profile, key)
            .and_then(|value| value.trim().parse().ok())
    }

    pub fn set(&mut self, profile: &str, key: &str, value: &str) {
        let section = self.section_name(profile);
        self.text = set_in_text(&self.text, &section, key, value);
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Writes the store back to the path it was loaded from.
    ///
    /// The content goes to a private temporary file in the same directory,
    /// which is then renamed over the target. The temporary file is removed
    /// if any step fails.
    pub fn save(&self) -> Result<()> {
        let save_error = |source| Error::Save {
            path: self.path.clone(),
            source,
        };

        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut temp = NamedTempFile::new_in(dir).map_err(save_error)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(save_error)?;
        }

        temp.write_all(self.text.as_bytes()).map_err(save_error)?;
        temp.as_file().sync_all().map_err(save_error)?;
        temp.persist(&self.path)
            .map_err(|e| save_error(e.error))?;

        debug!("Saved {}", self.path.display());
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn from_content(content: &str, layout: SectionLayout) -> Self {
        Self {
            ini: parse(content).expect("test fixture should parse"),
            text: content.to_string(),
            path: PathBuf::from("memory"),
            layout,
        }
    }

    #[cfg(test)]
    pub(crate) fn text(&self) -> &str {
        &self.text
    }
}

/// Name inside `[...]` when `line` is a section header.
fn header_name(line: &str) -> Option<&str> {
    let line = line.trim();
    let inner = line.strip_prefix('[')?;
    let end = inner.find(']')?;
    Some(inner[..end].trim())
}

/// Key of a `key = value` line. Comments and blank lines have none.
fn key_name(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with(';') || line.starts_with('#') {
        return None;
    }
    line.split_once('=').map(|(key, _)| key.trim())
}

/// Sets `key` under `[section]` in raw INI text. Every other line is kept as is.
///
/// An existing key line is replaced in place. A new key goes right after the
/// last key of the section, and a new section is appended at the end.
fn set_in_text(text: &str, section: &str, key: &str, value: &str) -> String {
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    let entry = format!("{key} = {value}");

    let start = lines
        .iter()
        .position(|line| header_name(line) == Some(section));

    match start {
        Some(start) => {
            let end = lines[start + 1..]
                .iter()
                .position(|line| header_name(line).is_some())
                .map_or(lines.len(), |offset| start + 1 + offset);

            let existing = (start + 1..end).find(|&i| key_name(&lines[i]) == Some(key));
            match existing {
                Some(i) => lines[i] = entry,
                None => {
                    let last_key = (start + 1..end)
                        .rev()
                        .find(|&i| key_name(&lines[i]).is_some())
                        .unwrap_or(start);
                    lines.insert(last_key + 1, entry);
                }
            }
        }
        None => {
            if lines.last().is_some_and(|line| !line.trim().is_empty()) {
                lines.push(String::new());
            }
            lines.push(format!("[{section}]"));
            lines.push(entry);
        }
    }

    let mut out = lines.join(newline);
    out.push_str(newline);
    out
}
