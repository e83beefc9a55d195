//! Type coercers: raw strings → typed [`Value`]s.

use argot_schema::Value;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Converts raw text into a typed value for one named type.
///
/// Failure is an expected outcome, reported as a reason string rather than
/// an error type.
#[async_trait]
pub trait Coercer: Send + Sync {
    /// The type name declarations refer to.
    fn type_name(&self) -> &str;

    /// Convert `raw`, or explain why it cannot be.
    async fn coerce(&self, raw: &str) -> Result<Value, String>;
}

/// Accepts any text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCoercer;

#[async_trait]
impl Coercer for StringCoercer {
    fn type_name(&self) -> &str {
        "string"
    }

    async fn coerce(&self, raw: &str) -> Result<Value, String> {
        Ok(Value::String(raw.to_string()))
    }
}

/// Finite decimal numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberCoercer;

#[async_trait]
impl Coercer for NumberCoercer {
    fn type_name(&self) -> &str {
        "number"
    }

    async fn coerce(&self, raw: &str) -> Result<Value, String> {
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Number(n)),
            _ => Err(format!("'{raw}' is not a number")),
        }
    }
}

/// Whole numbers that a [`Value::Number`] holds exactly, at most 2^53 in magnitude.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCoercer;

const MAX_EXACT_INTEGER: i64 = 1 << 53;

#[async_trait]
impl Coercer for IntegerCoercer {
    fn type_name(&self) -> &str {
        "integer"
    }

    async fn coerce(&self, raw: &str) -> Result<Value, String> {
        match raw.trim().parse::<i64>() {
            Ok(n) if n.unsigned_abs() <= MAX_EXACT_INTEGER.unsigned_abs() => {
                Ok(Value::Number(n as f64))
            }
            Ok(_) => Err(format!("'{raw}' is too large to represent exactly")),
            Err(_) => Err(format!("'{raw}' is not an integer")),
        }
    }
}

/// `true` or `false`, any ASCII case.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanCoercer;

#[async_trait]
impl Coercer for BooleanCoercer {
    fn type_name(&self) -> &str {
        "boolean"
    }

    async fn coerce(&self, raw: &str) -> Result<Value, String> {
        if raw.eq_ignore_ascii_case("true") {
            Ok(Value::Boolean(true))
        } else if raw.eq_ignore_ascii_case("false") {
            Ok(Value::Boolean(false))
        } else {
            Err(format!("'{raw}' is not true or false"))
        }
    }
}

/// Any JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCoercer;

#[async_trait]
impl Coercer for JsonCoercer {
    fn type_name(&self) -> &str {
        "json"
    }

    async fn coerce(&self, raw: &str) -> Result<Value, String> {
        serde_json::from_str(raw)
            .map(Value::Json)
            .map_err(|e| e.to_string())
    }
}

/// Coercers by type name.
#[derive(Clone)]
pub struct CoercerRegistry {
    coercers: BTreeMap<String, Arc<dyn Coercer>>,
}

impl std::fmt::Debug for CoercerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.coercers.keys()).finish()
    }
}

impl Default for CoercerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl CoercerRegistry {
    /// A registry with no coercers.
    pub fn empty() -> Self {
        Self {
            coercers: BTreeMap::new(),
        }
    }

    /// A registry holding `string`, `number`, `integer`, `boolean` and `json`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(StringCoercer));
        registry.register(Arc::new(NumberCoercer));
        registry.register(Arc::new(IntegerCoercer));
        registry.register(Arc::new(BooleanCoercer));
        registry.register(Arc::new(JsonCoercer));
        registry
    }

    /// Register a coercer under its type name, replacing any previous one.
    pub fn register(&mut self, coercer: Arc<dyn Coercer>) -> &mut Self {
        self.coercers
            .insert(coercer.type_name().to_string(), coercer);
        self
    }

    /// Coercer for `type_name`.
    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn Coercer>> {
        self.coercers.get(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.coercers.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn number_rejects_non_finite_and_words() {
        assert_eq!(block_on(NumberCoercer.coerce("2.5")), Ok(Value::Number(2.5)));
        assert!(block_on(NumberCoercer.coerce("true")).is_err());
        assert!(block_on(NumberCoercer.coerce("inf")).is_err());
    }

    #[test]
    fn integer_rejects_fractions() {
        assert_eq!(block_on(IntegerCoercer.coerce("-3")), Ok(Value::Number(-3.0)));
        assert!(block_on(IntegerCoercer.coerce("1.5")).is_err());
    }

    #[test]
    fn integer_rejects_values_a_number_cannot_hold_exactly() {
        assert_eq!(
            block_on(IntegerCoercer.coerce("-9007199254740992")),
            Ok(Value::Number(-9_007_199_254_740_992.0))
        );
        assert_eq!(
            block_on(IntegerCoercer.coerce("9007199254740993")),
            Err("'9007199254740993' is too large to represent exactly".to_string())
        );
    }

    #[test]
    fn boolean_is_case_insensitive() {
        assert_eq!(block_on(BooleanCoercer.coerce("FALSE")), Ok(Value::Boolean(false)));
        assert!(block_on(BooleanCoercer.coerce("yes")).is_err());
    }

    #[test]
    fn builtins_are_registered() {
        let registry = CoercerRegistry::default();
        assert_eq!(
            registry.type_names().collect::<Vec<_>>(),
            vec!["boolean", "integer", "json", "number", "string"]
        );
    }
}
