//! Loosely-typed segment parameters.
//!
//! Callers send whatever JSON their bot framework produced, so numbers often
//! arrive as strings and booleans as `0`/`1`. Accessors accept those spellings
//! and fail with [`Error::InvalidParameter`] only when a value is present but
//! cannot be read as the requested type. A JSON `null` counts as absent.

use {
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    #[must_use]
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build from a JSON value; anything but an object yields empty params.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    fn raw(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    /// Fail with `MissingField` for the first absent name, in order.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|n| !self.contains(n)) {
            Some(missing) => Err(Error::missing_field(*missing)),
            None => Ok(()),
        }
    }

    /// Return the first present name; when none is present, fail naming the
    /// first one.
    pub fn require_any<'a>(&self, names: &[&'a str]) -> Result<&'a str> {
        if let Some(found) = names.iter().find(|n| self.contains(n)) {
            return Ok(*found);
        }
        Err(Error::missing_field(names.first().copied().unwrap_or_default()))
    }

    pub fn opt_str(&self, name: &str) -> Result<Option<String>> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => Err(Error::invalid_parameter(name)),
        }
    }

    pub fn str(&self, name: &str) -> Result<String> {
        self.opt_str(name)?.ok_or_else(|| Error::missing_field(name))
    }

    pub fn opt_i64(&self, name: &str) -> Result<Option<i64>> {
        let parsed = match self.raw(name) {
            None => return Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| Error::invalid_parameter(name))
    }

    pub fn i64(&self, name: &str) -> Result<i64> {
        self.opt_i64(name)?.ok_or_else(|| Error::missing_field(name))
    }

    pub fn i32(&self, name: &str) -> Result<i32> {
        i32::try_from(self.i64(name)?).map_err(|_| Error::invalid_parameter(name))
    }

    /// Unsigned id such as a QQ number.
    pub fn u64(&self, name: &str) -> Result<u64> {
        u64::try_from(self.i64(name)?).map_err(|_| Error::invalid_parameter(name))
    }

    pub fn f64(&self, name: &str) -> Result<f64> {
        let parsed = match self.raw(name) {
            None => return Err(Error::missing_field(name)),
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
        };
        parsed
            .filter(|f: &f64| f.is_finite())
            .ok_or_else(|| Error::invalid_parameter(name))
    }

    pub fn opt_bool(&self, name: &str) -> Result<Option<bool>> {
        let parsed = match self.raw(name) {
            None => return Ok(None),
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Some(Value::String(s)) => match s.trim() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            Some(_) => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| Error::invalid_parameter(name))
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
