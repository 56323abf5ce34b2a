//! Call descriptors and their conversion into argument vectors.
//!
//! A call descriptor arrives from the script context as an untyped array.
//! It is held as a sequence of [`DynamicValue`]s and only becomes a typed
//! [`ArgumentVector`] through [`CallDescriptor::to_argument_vector`], which
//! type-checks every element.

use crate::error::BridgeError;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::fmt;

/// A dynamically-typed value as supplied by the script context.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum DynamicValue {
    /// `null` or `undefined`
    Null,
    /// A boolean
    Bool(bool),
    /// Any numeric value
    Number(Number),
    /// A string
    String(String),
    /// A nested array
    Array(Vec<DynamicValue>),
    /// A nested object, in key order
    Object(Vec<(String, DynamicValue)>),
}

impl DynamicValue {
    /// Returns the string contents if this value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the script-side type name, used in log output.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl From<Value> for DynamicValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<DynamicValue> for Value {
    fn from(value: DynamicValue) -> Self {
        match value {
            DynamicValue::Null => Value::Null,
            DynamicValue::Bool(b) => Value::Bool(b),
            DynamicValue::Number(n) => Value::Number(n),
            DynamicValue::String(s) => Value::String(s),
            DynamicValue::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            DynamicValue::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl From<&str> for DynamicValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// The untyped request describing a command and its arguments.
///
/// The first element names the program; the rest are its arguments.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct CallDescriptor(Vec<DynamicValue>);

impl CallDescriptor {
    /// Creates a descriptor from already-decoded values.
    #[must_use]
    pub fn new(values: Vec<DynamicValue>) -> Self {
        Self(values)
    }

    /// Creates a descriptor where every element is a string.
    #[must_use]
    pub fn from_strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            items
                .into_iter()
                .map(|s| DynamicValue::String(s.into()))
                .collect(),
        )
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the descriptor has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw elements.
    #[must_use]
    pub fn values(&self) -> &[DynamicValue] {
        &self.0
    }

    /// Type-checks every element and splits off the program name.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCommand` when there are no elements, and
    /// `NonStringArgument` naming the first element that is not a string.
    pub fn to_argument_vector(&self) -> Result<ArgumentVector, BridgeError> {
        if self.0.is_empty() {
            return Err(BridgeError::empty_command());
        }

        let mut strings = Vec::with_capacity(self.0.len());
        for (index, value) in self.0.iter().enumerate() {
            let Some(s) = value.as_str() else {
                tracing::debug!(
                    index,
                    found = value.type_name(),
                    "rejecting descriptor with non-string element"
                );
                return Err(BridgeError::non_string_argument(index));
            };
            strings.push(s.to_string());
        }

        let program = strings.remove(0);
        Ok(ArgumentVector {
            program,
            args: strings,
        })
    }
}

impl From<Vec<DynamicValue>> for CallDescriptor {
    fn from(values: Vec<DynamicValue>) -> Self {
        Self(values)
    }
}

impl FromIterator<DynamicValue> for CallDescriptor {
    fn from_iter<T: IntoIterator<Item = DynamicValue>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CallDescriptor {
    /// Renders the descriptor as the JSON array the script sent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = Value::Array(self.0.iter().cloned().map(Value::from).collect());
        write!(f, "{}", raw)
    }
}

/// A validated program name plus positional arguments.
///
/// Only obtainable through [`CallDescriptor::to_argument_vector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector {
    program: String,
    args: Vec<String>,
}

impl ArgumentVector {
    /// The program to resolve on the search path.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Positional arguments, passed to the program verbatim.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeErrorKind;
    use serde_json::json;

    fn descriptor(value: Value) -> CallDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn converts_all_string_descriptor() {
        let argv = descriptor(json!(["echo", "hello", "world"]))
            .to_argument_vector()
            .unwrap();
        assert_eq!(argv.program(), "echo");
        assert_eq!(argv.args(), ["hello", "world"]);
    }

    #[test]
    fn program_only_has_no_args() {
        let argv = descriptor(json!(["true"])).to_argument_vector().unwrap();
        assert_eq!(argv.program(), "true");
        assert!(argv.args().is_empty());
    }

    #[test]
    fn empty_descriptor_is_rejected() {
        let err = descriptor(json!([])).to_argument_vector().unwrap_err();
        assert_eq!(err.kind, BridgeErrorKind::EmptyCommand);
    }

    #[test]
    fn first_non_string_index_is_reported() {
        let err = descriptor(json!(["ls", "-l", 3, null]))
            .to_argument_vector()
            .unwrap_err();
        assert_eq!(err.kind, BridgeErrorKind::NonStringArgument { index: 2 });
    }

    #[test]
    fn non_string_program_is_index_zero() {
        let err = descriptor(json!([{"cmd": "ls"}, "-l"]))
            .to_argument_vector()
            .unwrap_err();
        assert_eq!(err.to_string(), "argument 0 is not a string");
    }

    #[test]
    fn nested_array_is_not_a_string() {
        let err = descriptor(json!(["echo", ["a", "b"]]))
            .to_argument_vector()
            .unwrap_err();
        assert_eq!(err.kind, BridgeErrorKind::NonStringArgument { index: 1 });
    }

    #[test]
    fn shell_metacharacters_pass_through_untouched() {
        let argv = descriptor(json!(["echo", "$HOME", "*", "a b", "'q'"]))
            .to_argument_vector()
            .unwrap();
        assert_eq!(argv.args(), ["$HOME", "*", "a b", "'q'"]);
    }

    #[test]
    fn empty_string_arguments_are_strings() {
        let argv = descriptor(json!(["printf", ""])).to_argument_vector().unwrap();
        assert_eq!(argv.args(), [""]);
    }

    #[test]
    fn dynamic_value_type_names() {
        let values = descriptor(json!([null, true, 1.5, "s", [], {}]));
        let names: Vec<_> = values.values().iter().map(DynamicValue::type_name).collect();
        assert_eq!(
            names,
            ["null", "boolean", "number", "string", "array", "object"]
        );
    }

    #[test]
    fn display_renders_raw_json() {
        let d = descriptor(json!(["echo", 1, {"a": false}]));
        assert_eq!(d.to_string(), r#"["echo",1,{"a":false}]"#);
    }

    #[test]
    fn from_strings_builds_string_values() {
        let d = CallDescriptor::from_strings(["a", "b"]);
        assert_eq!(d.len(), 2);
        assert_eq!(d.values()[1], DynamicValue::from("b"));
    }
}
