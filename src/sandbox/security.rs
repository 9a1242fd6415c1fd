//! Policy for package names handed to the in-container installer.
//!
//! # Security Model
//!
//! Module names arrive from the caller and end up inside a `sh -c` command
//! line, so they are treated as untrusted twice:
//!
//! 1. **Allowlist validation** before any workspace exists: only characters
//!    that can appear in a pip requirement (name, extras, version specifier)
//!    are accepted, and the name must start with an alphanumeric so it can
//!    never be read as a pip option such as `--index-url`.
//! 2. **Shell quoting** when the command line is assembled: anything outside
//!    the plain `[A-Za-z0-9._/-]` set is single-quoted, so `numpy>=1.26`
//!    stays a specifier instead of becoming a redirection.

use std::fmt;

use tracing::{debug, warn};

use crate::error::ExecError;

/// Longest accepted module specifier.
pub const MAX_MODULE_NAME_LEN: usize = 200;

/// Most modules a single request may install.
pub const MAX_MODULES: usize = 32;

/// Punctuation allowed after the leading alphanumeric.
const ALLOWED_PUNCTUATION: &[char] = &['.', '_', '-', '[', ']', '=', '<', '>', '~', '!'];

/// Characters that never need quoting in a POSIX shell word.
const SHELL_SAFE_PUNCTUATION: &[char] = &['.', '_', '-', '/'];

/// A package specifier that passed [`validate_module_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleName(String);

impl ModuleName {
    /// Returns the specifier as given by the caller.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the specifier as a single shell word.
    #[must_use]
    pub fn shell_word(&self) -> String {
        shell_quote(&self.0)
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates one module specifier against the allowlist.
///
/// # Errors
///
/// Returns `ExecError::InvalidModuleName` if the name is empty, too long,
/// starts with a non-alphanumeric character, or contains a character
/// outside the allowlist.
pub fn validate_module_name(raw: &str) -> Result<ModuleName, ExecError> {
    let reject = || {
        warn!(module = %raw.escape_debug(), "Rejected module name");
        ExecError::InvalidModuleName(raw.to_string())
    };

    if raw.is_empty() || raw.len() > MAX_MODULE_NAME_LEN {
        return Err(reject());
    }

    let mut chars = raw.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return Err(reject());
    }

    if !chars.all(|c| c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(&c)) {
        return Err(reject());
    }

    debug!(module = %raw, "Module name accepted");
    Ok(ModuleName(raw.to_string()))
}

/// Splits a comma-separated module list and validates each entry.
///
/// Entries are trimmed and empty entries are dropped, so `"requests, numpy,"`
/// yields two modules.
///
/// # Errors
///
/// Returns `ExecError::TooManyModules` if more than [`MAX_MODULES`] remain,
/// or the first `ExecError::InvalidModuleName` encountered.
pub fn parse_module_list(raw: &str) -> Result<Vec<ModuleName>, ExecError> {
    let entries: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if entries.len() > MAX_MODULES {
        return Err(ExecError::TooManyModules {
            count: entries.len(),
            max: MAX_MODULES,
        });
    }

    entries.into_iter().map(validate_module_name).collect()
}

/// Quotes `word` for a POSIX shell, leaving plain words untouched.
#[must_use]
pub fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || SHELL_SAFE_PUNCTUATION.contains(&c));

    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_names() {
        for name in ["requests", "numpy", "scikit-learn", "zope.interface", "typing_extensions"] {
            assert!(validate_module_name(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn test_accepts_specifiers_and_extras() {
        for name in ["numpy>=1.26", "requests[socks]", "pandas==2.2.2", "attrs~=23.1", "six!=1.0"] {
            assert!(validate_module_name(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn test_rejects_shell_metacharacters() {
        for name in [
            "requests;rm",
            "numpy&&curl",
            "$(whoami)",
            "a`id`",
            "pkg|sh",
            "pkg name",
            "pkg\nname",
            "pkg'quote",
        ] {
            let err = validate_module_name(name).unwrap_err();
            assert!(matches!(err, ExecError::InvalidModuleName(_)), "{name}");
        }
    }

    #[test]
    fn test_rejects_option_injection() {
        assert!(validate_module_name("--index-url=http://evil").is_err());
        assert!(validate_module_name("-r").is_err());
    }

    #[test]
    fn test_rejects_overlong_name() {
        let name = "a".repeat(MAX_MODULE_NAME_LEN + 1);
        assert!(validate_module_name(&name).is_err());
        let name = "a".repeat(MAX_MODULE_NAME_LEN);
        assert!(validate_module_name(&name).is_ok());
    }

    #[test]
    fn test_parse_module_list_splits_and_trims() {
        let modules = parse_module_list("requests, numpy ,,").unwrap();
        let names: Vec<&str> = modules.iter().map(ModuleName::as_str).collect();
        assert_eq!(names, ["requests", "numpy"]);
    }

    #[test]
    fn test_parse_module_list_empty_string() {
        assert!(parse_module_list("").unwrap().is_empty());
        assert!(parse_module_list(" , ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_module_list_limit() {
        let raw = vec!["pkg"; MAX_MODULES + 1].join(",");
        let err = parse_module_list(&raw).unwrap_err();
        assert!(matches!(err, ExecError::TooManyModules { count, .. } if count == MAX_MODULES + 1));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("requests"), "requests");
        assert_eq!(shell_quote("numpy>=1.26"), "'numpy>=1.26'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}
