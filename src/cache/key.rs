//! Cache Key Module
//!
//! Builds keys following the `<entity>:<id>:<variant>` convention. The cache
//! itself treats keys as opaque strings; this only keeps call sites consistent.

use std::fmt;

const SEPARATOR: char = ':';

// == Cache Key ==
/// Structured cache key rendered as `entity[:id][:variant]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    entity: String,
    id: Option<String>,
    variant: Option<String>,
}

impl CacheKey {
    /// Starts a key for the given entity kind, e.g. `comments`.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            id: None,
            variant: None,
        }
    }

    pub fn id(mut self, id: impl fmt::Display) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Substring matching every key of `entity`, for use with `clear`.
    pub fn entity_prefix(entity: &str) -> String {
        format!("{}{}", entity, SEPARATOR)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entity)?;
        if let Some(id) = &self.id {
            write!(f, "{}{}", SEPARATOR, id)?;
        }
        if let Some(variant) = &self.variant {
            write!(f, "{}{}", SEPARATOR, variant)?;
        }
        Ok(())
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.to_string()
    }
}
