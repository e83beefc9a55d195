//! External value sources consulted when the input leaves a key without a value.

use async_trait::async_trait;
use std::collections::BTreeMap;

/// Error type returned by resolvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An external source of raw values.
///
/// Resolvers form a chain queried in registration order; the first one that
/// reports a key as existing supplies its value. Failures abort the whole
/// interpretation.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Identifier reported in value sources and errors.
    fn id(&self) -> &str;

    /// Whether this resolver can supply `key`.
    ///
    /// `user_provided_raw` is true when the input names the key but gives it
    /// no value.
    async fn key_exists(&self, key: &str, user_provided_raw: bool) -> Result<bool, BoxError>;

    /// Raw value for `key`.
    async fn resolve_key(&self, key: &str) -> Result<Option<String>, BoxError>;
}

/// Looks keys up as `{PREFIX}_{KEY}` environment variables, key uppercased.
///
/// Reads the process environment unless constructed with an explicit map.
#[derive(Debug, Clone)]
pub struct EnvResolver {
    prefix: String,
    vars: Option<BTreeMap<String, String>>,
}

impl EnvResolver {
    /// Resolve from the process environment.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: None,
        }
    }

    /// Resolve from `vars` instead of the process environment.
    pub fn with_vars(prefix: impl Into<String>, vars: BTreeMap<String, String>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: Some(vars),
        }
    }

    /// Variable name consulted for `key`.
    pub fn var_name(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key.to_uppercase())
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let name = self.var_name(key);
        match &self.vars {
            Some(vars) => vars.get(&name).cloned(),
            None => std::env::var(&name).ok(),
        }
    }
}

#[async_trait]
impl Resolver for EnvResolver {
    fn id(&self) -> &str {
        "env"
    }

    async fn key_exists(&self, key: &str, user_provided_raw: bool) -> Result<bool, BoxError> {
        if user_provided_raw {
            return Ok(false);
        }
        Ok(self.lookup(key).is_some())
    }

    async fn resolve_key(&self, key: &str) -> Result<Option<String>, BoxError> {
        Ok(self.lookup(key))
    }
}

/// A fixed key → value map.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    id: String,
    values: BTreeMap<String, String>,
}

impl StaticResolver {
    /// An empty resolver reporting itself as `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
        }
    }

    /// Add a value (builder pattern).
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    fn id(&self) -> &str {
        &self.id
    }

    async fn key_exists(&self, key: &str, _user_provided_raw: bool) -> Result<bool, BoxError> {
        Ok(self.values.contains_key(key))
    }

    async fn resolve_key(&self, key: &str) -> Result<Option<String>, BoxError> {
        Ok(self.values.get(key).cloned())
    }
}
