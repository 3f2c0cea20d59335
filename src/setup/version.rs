//! Config version checks.
//!
//! The first line of the config file records the version that wrote it;
//! comparing it with the running binary decides whether setup runs.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Why setup has to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupReason {
    /// No config file yet.
    Missing,
    /// Config written by an older version, or carrying no version at all.
    Outdated(String),
}

/// A semantic version (major.minor.patch)
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    /// Parses a version string like "0.1.0".
    fn parse(version_str: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = version_str.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(anyhow!(
                "Invalid version format: '{}'. Expected 'major.minor.patch'",
                version_str
            ));
        }

        let number = |part: &str, name: &str| {
            part.parse::<u32>()
                .map_err(|_| anyhow!("Invalid {name} version: '{part}'"))
        };

        Ok(SemanticVersion {
            major: number(parts[0], "major")?,
            minor: number(parts[1], "minor")?,
            patch: number(parts[2], "patch")?,
        })
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Reads the version from the first line of the config file.
///
/// Expects `config_version = "X.Y.Z"`; a comment or any other key yields `None`.
///
/// # Errors
/// - If the file cannot be read
fn read_config_version_from_file(config_path: &Path) -> anyhow::Result<Option<String>> {
    let content = std::fs::read_to_string(config_path)?;
    let Some(first_line) = content.lines().next() else {
        return Ok(None);
    };

    let regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?;
    Ok(regex
        .captures(first_line)
        .map(|caps| caps[1].to_string()))
}

/// Determines whether setup is needed for the config at `config_path`.
///
/// # Errors
/// - If the file exists but cannot be read
/// - If either version cannot be parsed
pub fn check_setup_needed(config_path: &Path) -> anyhow::Result<Option<SetupReason>> {
    if !config_path.exists() {
        return Ok(Some(SetupReason::Missing));
    }

    let Some(config_version) = read_config_version_from_file(config_path)? else {
        return Ok(Some(SetupReason::Outdated("unknown".to_string())));
    };

    let config_parsed = SemanticVersion::parse(&config_version)?;
    let current_parsed = SemanticVersion::parse(CURRENT_VERSION)?;

    match config_parsed.cmp(&current_parsed) {
        Ordering::Less => Ok(Some(SetupReason::Outdated(config_version))),
        Ordering::Equal => Ok(None),
        Ordering::Greater => {
            tracing::warn!(
                "Config version {} is newer than app version {}",
                config_parsed,
                CURRENT_VERSION
            );
            Ok(None)
        }
    }
}

/// Writes the current version as the first line of the config file,
/// replacing any existing version line and keeping everything else.
///
/// # Errors
/// - If the file cannot be read or written
pub fn update_config_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;

    let lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().starts_with("config_version"))
        .collect();

    let version_line = format!(r#"config_version = "{CURRENT_VERSION}""#);
    let new_content = if lines.is_empty() {
        version_line
    } else {
        format!("{}\n{}", version_line, lines.join("\n"))
    };

    std::fs::write(config_path, new_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_version_parse() {
        let v = SemanticVersion::parse("0.1.5").unwrap();
        assert_eq!(v.major, 0);
        assert_eq!(v.minor, 1);
        assert_eq!(v.patch, 5);
        assert_eq!(v.to_string(), "0.1.5");
    }

    #[test]
    fn test_semantic_version_comparison() {
        let v1 = SemanticVersion::parse("0.0.4").unwrap();
        let v2 = SemanticVersion::parse("0.0.5").unwrap();
        let v3 = SemanticVersion::parse("0.1.0").unwrap();

        assert!(v1 < v2);
        assert!(v2 < v3);
        assert_eq!(v1, v1.clone());
    }

    #[test]
    fn test_invalid_version_format() {
        assert!(SemanticVersion::parse("0.0").is_err());
        assert!(SemanticVersion::parse("0.0.5.1").is_err());
        assert!(SemanticVersion::parse("invalid").is_err());
    }

    #[test]
    fn test_check_setup_needed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wavr.toml");
        assert_eq!(check_setup_needed(&path).unwrap(), Some(SetupReason::Missing));

        std::fs::write(&path, "[render]\n").unwrap();
        assert_eq!(
            check_setup_needed(&path).unwrap(),
            Some(SetupReason::Outdated("unknown".to_string()))
        );

        std::fs::write(&path, "config_version = \"0.0.1\"\n").unwrap();
        assert_eq!(
            check_setup_needed(&path).unwrap(),
            Some(SetupReason::Outdated("0.0.1".to_string()))
        );

        update_config_version(&path).unwrap();
        assert_eq!(check_setup_needed(&path).unwrap(), None);
    }
}
