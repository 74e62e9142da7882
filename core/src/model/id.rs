// catalog_kit/src/model/id.rs

//! Canonical identifier used for products, categories and brands.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Identifier in its normalized string form.
///
/// Sources disagree on whether ids are numbers or strings (`3`, `3.0`, `" 3 "`);
/// all of them normalize to `"3"`, so equality on `EntityId` is the only
/// comparison the rest of the crate needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
  pub fn new(raw: impl AsRef<str>) -> Self {
    EntityId(raw.as_ref().trim().to_string())
  }

  /// Builds an id from a JSON scalar. Blank strings, null, arrays and objects yield `None`.
  pub fn from_json(value: &Value) -> Option<Self> {
    let raw = match value {
      Value::String(s) => s.trim().to_string(),
      Value::Number(n) => number_to_string(n),
      _ => return None,
    };
    if raw.is_empty() {
      None
    } else {
      Some(EntityId(raw))
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

pub(crate) fn number_to_string(n: &Number) -> String {
  if let Some(i) = n.as_i64() {
    return i.to_string();
  }
  if let Some(u) = n.as_u64() {
    return u.to_string();
  }
  match n.as_f64() {
    Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
    _ => n.to_string(),
  }
}

impl fmt::Display for EntityId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for EntityId {
  fn from(raw: &str) -> Self {
    EntityId::new(raw)
  }
}

impl From<String> for EntityId {
  fn from(raw: String) -> Self {
    EntityId::new(raw)
  }
}

impl From<i64> for EntityId {
  fn from(raw: i64) -> Self {
    EntityId(raw.to_string())
  }
}

impl<'de> Deserialize<'de> for EntityId {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let value = Value::deserialize(deserializer)?;
    EntityId::from_json(&value).ok_or_else(|| de::Error::custom(format!("invalid identifier: {}", value)))
  }
}
