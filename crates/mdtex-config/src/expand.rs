//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use std::borrow::Cow;
use std::convert::Infallible;

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    if let Some(name) = required_vars(value).find(|name| std::env::var_os(name).is_none()) {
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{name}}} not set"),
        });
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, Infallible> {
        Ok(std::env::var(var).ok())
    })
    .map(Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: e.to_string(),
    })
}

/// Names of `${VAR}` references that have no `:-default`.
fn required_vars(value: &str) -> impl Iterator<Item = &str> {
    value.match_indices("${").filter_map(move |(start, _)| {
        let inner = &value[start + 2..];
        let expr = &inner[..inner.find('}')?];
        (!expr.contains(":-")).then_some(expr)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDTEX_TEST_VAR_SIMPLE", "hello");
        }
        let result = expand_env("${MDTEX_TEST_VAR_SIMPLE}", "test.field").unwrap();
        assert_eq!(result, "hello");
        unsafe {
            std::env::remove_var("MDTEX_TEST_VAR_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_value() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDTEX_TEST_VAR_DEFAULT", "hello");
        }
        let result = expand_env("${MDTEX_TEST_VAR_DEFAULT:-world}", "test.field").unwrap();
        assert_eq!(result, "hello");
        unsafe {
            std::env::remove_var("MDTEX_TEST_VAR_DEFAULT");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDTEX_UNSET_VAR_TEST");
        }
        let result = expand_env("${MDTEX_UNSET_VAR_TEST:-default}", "test.field").unwrap();
        assert_eq!(result, "default");
    }

    #[test]
    fn test_expand_missing_var_errors() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDTEX_MISSING_VAR_TEST");
        }
        let err = expand_env("by ${MDTEX_MISSING_VAR_TEST}", "document.author").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("MDTEX_MISSING_VAR_TEST"));
        assert!(message.contains("document.author"));
    }

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(expand_env("0.8\\linewidth", "f").unwrap(), "0.8\\linewidth");
        assert_eq!(expand_env("cost $5", "f").unwrap(), "cost $5");
    }

    #[test]
    fn test_required_vars() {
        let names: Vec<_> = required_vars("${A} ${B:-x} ${C}").collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
