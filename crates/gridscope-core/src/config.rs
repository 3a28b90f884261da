//! Decoder configuration.
//!
//! ## Environment Variables
//!
//! - `GRIDSCOPE_SCALAR_FALLBACKS`: comma separated scalar type names tried as
//!   substrings of the container's type name when the element type cannot be
//!   looked up by its exact name (default: `double,float`)

use std::env;

/// Environment variable holding the scalar fallback list
pub const SCALAR_FALLBACKS_ENV: &str = "GRIDSCOPE_SCALAR_FALLBACKS";

/// Knobs for the best-effort parts of decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions
{
    /// Scalar names matched as substrings of the full type name, first match wins.
    ///
    /// Order matters: put longer or more specific names first.
    pub scalar_fallbacks: Vec<String>,
    /// Member name of the single-field wrapper around runtime dimensions
    pub wrapper_member: String,
}

impl Default for DecodeOptions
{
    fn default() -> Self
    {
        Self {
            scalar_fallbacks: vec!["double".to_string(), "float".to_string()],
            wrapper_member: "m_value".to_string(),
        }
    }
}

impl DecodeOptions
{
    /// Defaults overridden by `GRIDSCOPE_SCALAR_FALLBACKS` when it is set and non-empty
    pub fn from_env() -> Self
    {
        let mut options = Self::default();
        if let Ok(raw) = env::var(SCALAR_FALLBACKS_ENV) {
            let parsed = parse_fallback_list(&raw);
            if !parsed.is_empty() {
                options.scalar_fallbacks = parsed;
            }
        }
        options
    }

    /// Replace the scalar fallback list
    #[must_use]
    pub fn with_scalar_fallbacks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scalar_fallbacks = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Split a comma separated list, dropping blanks
pub fn parse_fallback_list(raw: &str) -> Vec<String>
{
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_default_fallbacks_prefer_double()
    {
        let options = DecodeOptions::default();
        assert_eq!(options.scalar_fallbacks, vec!["double", "float"]);
        assert_eq!(options.wrapper_member, "m_value");
    }

    #[test]
    fn test_parse_fallback_list()
    {
        assert_eq!(parse_fallback_list(" double , ,float,int32_t "), vec!["double", "float", "int32_t"]);
        assert!(parse_fallback_list(" , ").is_empty());
    }

    #[test]
    fn test_with_scalar_fallbacks()
    {
        let options = DecodeOptions::default().with_scalar_fallbacks(["half"]);
        assert_eq!(options.scalar_fallbacks, vec!["half"]);
    }
}
