// src/cfg/modes.rs

use serde::de;
use serde::Deserialize;

/// How a completion is laid out when rendered as a flat argument list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallbackConvention {
    /// `(false, tag, ...args)` on response, `(err, "next")` on failure.
    #[default]
    ErrorFirst,
    /// `(tag, ...args)` on response, `("error", err)` on failure.
    TagFirst,
}

impl CallbackConvention {
    /// Recognised spellings only; `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "error-first" | "err-first" | "errorfirst" | "next" => Some(CallbackConvention::ErrorFirst),
            "tag-first" | "tagfirst" | "legacy" => Some(CallbackConvention::TagFirst),
            _ => None,
        }
    }

    /// Construct from a string. Unknown values fall back to the default.
    pub fn new(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            log::warn!("Unknown callback convention '{}', using error-first", raw);
            CallbackConvention::ErrorFirst
        })
    }

    /// Tag reported when the handler fails instead of responding.
    pub fn error_tag(&self) -> &'static str {
        match self {
            CallbackConvention::ErrorFirst => "next",
            CallbackConvention::TagFirst => "error",
        }
    }
}

/// What `auth(data)` does to the pending request's `user` section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Shallow-merge into `user`, creating it if needed.
    #[default]
    Merge,
    /// Replace `user` with `{ "points": data }`.
    Replace,
}

impl AuthMode {
    /// Key wrapping the auth data in replace mode.
    pub const REPLACE_KEY: &'static str = "points";

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "merge" => Some(AuthMode::Merge),
            "replace" | "points" => Some(AuthMode::Replace),
            _ => None,
        }
    }

    /// Construct from a string. Unknown values fall back to merge.
    pub fn new(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            log::warn!("Unknown auth mode '{}', using merge", raw);
            AuthMode::Merge
        })
    }
}

impl<'de> Deserialize<'de> for CallbackConvention {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        CallbackConvention::parse(&raw).ok_or_else(|| {
            de::Error::custom(format!(
                "unknown callback convention '{}', expected 'error-first' or 'tag-first'",
                raw
            ))
        })
    }
}

impl<'de> Deserialize<'de> for AuthMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        AuthMode::parse(&raw).ok_or_else(|| {
            de::Error::custom(format!("unknown auth mode '{}', expected 'merge' or 'replace'", raw))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convention_parsing_is_lenient() {
        assert_eq!(CallbackConvention::new("error-first"), CallbackConvention::ErrorFirst);
        assert_eq!(CallbackConvention::new("Err_First"), CallbackConvention::ErrorFirst);
        assert_eq!(CallbackConvention::new("tag-first"), CallbackConvention::TagFirst);
        assert_eq!(CallbackConvention::new(" legacy "), CallbackConvention::TagFirst);
        assert_eq!(CallbackConvention::new("bogus"), CallbackConvention::ErrorFirst);
    }

    #[test]
    fn test_error_tags() {
        assert_eq!(CallbackConvention::ErrorFirst.error_tag(), "next");
        assert_eq!(CallbackConvention::TagFirst.error_tag(), "error");
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(CallbackConvention::parse("tag-frist"), None);
        assert_eq!(CallbackConvention::parse("Tag_First"), Some(CallbackConvention::TagFirst));
        assert_eq!(AuthMode::parse("replcae"), None);
        assert_eq!(AuthMode::parse("Replace"), Some(AuthMode::Replace));
    }

    #[test]
    fn test_auth_mode_parsing() {
        assert_eq!(AuthMode::new("merge"), AuthMode::Merge);
        assert_eq!(AuthMode::new("REPLACE"), AuthMode::Replace);
        assert_eq!(AuthMode::new("points"), AuthMode::Replace);
        assert_eq!(AuthMode::new("whatever"), AuthMode::Merge);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(CallbackConvention::default(), CallbackConvention::ErrorFirst);
        assert_eq!(AuthMode::default(), AuthMode::Merge);
    }
}
