//! @acp:module "Sieve"
//! @acp:summary "Entry point: binds a value to active scopes and projects it"
//! @acp:domain serialization
//! @acp:layer api
//!
//! A [`Sieve`] is a one-shot projection request. It is itself
//! `Serialize`, so it can be handed to any serde serializer in place of the
//! wrapped value.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::config::SieveConfig;
use crate::error::Result;
use crate::node::Node;
use crate::project::{project, Context};
use crate::scope::ScopeSet;
use crate::value::Projectable;

/// @acp:summary "Wrap a value with the scopes it should be projected under"
pub fn sieve<T, I, S>(value: &T, scopes: I) -> Sieve<'_, T>
where
    T: Projectable + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Sieve::new(value).with_scopes(scopes)
}

/// @acp:summary "A value paired with a projection context"
#[derive(Debug)]
pub struct Sieve<'a, T: ?Sized> {
    value: &'a T,
    scopes: ScopeSet,
    config: SieveConfig,
}

impl<'a, T: Projectable + ?Sized> Sieve<'a, T> {
    /// No scopes active: only fields without a scope gate (or gated on `*`)
    /// are emitted.
    pub fn new(value: &'a T) -> Self {
        Self {
            value,
            scopes: ScopeSet::empty(),
            config: SieveConfig::default(),
        }
    }

    pub fn with_scopes<I, S>(self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_scope_set(ScopeSet::new(scopes))
    }

    pub fn with_scope_set(mut self, scopes: ScopeSet) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_config(mut self, config: SieveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    pub fn config(&self) -> &SieveConfig {
        &self.config
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    pub fn has_any_scope<I, R>(&self, scopes: I) -> bool
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        self.scopes.contains_any(scopes)
    }

    /// Root context for this request.
    pub fn context(&self) -> Context<'_> {
        Context::new(self.scopes.clone(), &self.config)
    }

    /// @acp:summary "Project the wrapped value into a tree"
    ///
    /// A value that collapses entirely (hidden, absent) projects to null.
    pub fn project(&self) -> Result<Node> {
        let context = self.context();
        let node = project(&self.value, Some(&context), &[])?;
        Ok(node.unwrap_or_default())
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.project()?)?)
    }

    pub fn to_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.project()?)?)
    }

    pub fn to_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.project()?)?)
    }

    /// Project and decode into a [`serde_json::Value`], parsing any raw
    /// hook output.
    pub fn to_value(&self) -> Result<Value> {
        Ok(self.project()?.to_value()?)
    }
}

impl<T: Projectable + ?Sized> Serialize for Sieve<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.project()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddedPolicy;
    use serde_json::json;

    #[test]
    fn test_scope_queries() {
        let value = 1u8;
        let sieve = sieve(&value, ["private", "public"]);
        assert!(sieve.has_scope("public"));
        assert!(sieve.has_scope("*"));
        assert!(!sieve.has_scope("admin"));
        assert!(sieve.has_any_scope(["admin", "private"]));
        assert_eq!(sieve.scopes().len(), 2);
    }

    #[test]
    fn test_unsized_values() {
        let items: &[u32] = &[1, 2];
        assert_eq!(sieve(items, ["x"]).to_string().unwrap(), "[1,2]");
        assert_eq!(sieve("hi", ["x"]).to_string().unwrap(), r#""hi""#);
    }

    #[test]
    fn test_hidden_root_projects_to_null() {
        let value = crate::value::Private(3);
        assert_eq!(Sieve::new(&value).to_string().unwrap(), "null");
    }

    #[test]
    fn test_serialize_through_serde() {
        let value = json!({"b": [true], "a": 1.5});
        let wrapped = serde_json::to_string(&sieve(&value, ["any"])).unwrap();
        assert_eq!(wrapped, r#"{"a":1.5,"b":[true]}"#);
    }

    #[test]
    fn test_config_is_carried_into_context() {
        let value = 0u8;
        let sieve = Sieve::new(&value)
            .with_config(SieveConfig::default().with_embedded(EmbeddedPolicy::Skip));
        assert_eq!(sieve.context().config().embedded, EmbeddedPolicy::Skip);
        assert!(sieve.context().scopes().is_empty());
    }

    #[test]
    fn test_to_value() {
        let value = vec!["a", "b"];
        assert_eq!(sieve(&value, ["x"]).to_value().unwrap(), json!(["a", "b"]));
    }
}
