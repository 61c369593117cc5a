//! 配置快照
//!
//! 每次配置更新整体下发的一组键值属性，值只允许字符串、整数或布尔。

use crate::error::{ReloaderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GATEWAY_ID: &str = "gatewayID";
pub const CUSTOM_ID: &str = "customID";
pub const GATEWAY_MODEL: &str = "gateway.model";
pub const GATEWAY_VERSION: &str = "gateway.version";
pub const TRANSPORT_ENABLED: &str = "transport.enabled";
pub const TRANSPORT_ADDRESS: &str = "transport.address";
pub const TRANSPORT_PORT: &str = "transport.port";
pub const TRANSPORT_USER: &str = "transport.user";
pub const TRANSPORT_PASSWD: &str = "transport.passwd";
pub const TRANSPORT_SECURED: &str = "transport.secured";
pub const TRANSPORT_FILTERS: &str = "transport.filters";
pub const TRANSPORT_SCAN: &str = "transport.scan";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    properties: BTreeMap<String, PropertyValue>,
}

impl ConfigSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn string(&self, key: &str) -> Result<Option<&str>> {
        match self.get(key) {
            None => Ok(None),
            Some(PropertyValue::String(value)) => Ok(Some(value)),
            Some(other) => Err(mismatch(key, "string", other)),
        }
    }

    pub fn integer(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(PropertyValue::Integer(value)) => Ok(Some(*value)),
            Some(other) => Err(mismatch(key, "integer", other)),
        }
    }

    pub fn boolean(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(PropertyValue::Boolean(value)) => Ok(Some(*value)),
            Some(other) => Err(mismatch(key, "boolean", other)),
        }
    }

    pub fn required_string(&self, key: &str) -> Result<&str> {
        self.string(key)?.ok_or_else(|| ReloaderError::missing(key))
    }

    pub fn required_integer(&self, key: &str) -> Result<i64> {
        self.integer(key)?.ok_or_else(|| ReloaderError::missing(key))
    }

    pub fn required_boolean(&self, key: &str) -> Result<bool> {
        self.boolean(key)?.ok_or_else(|| ReloaderError::missing(key))
    }
}

fn mismatch(key: &str, expected: &'static str, found: &PropertyValue) -> ReloaderError {
    ReloaderError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_scalar_properties() {
        let snapshot: ConfigSnapshot = serde_json::from_str(
            r#"{"gatewayID":"custom","transport.port":8883,"transport.enabled":true}"#,
        )
        .unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.string(GATEWAY_ID).unwrap(), Some("custom"));
        assert_eq!(snapshot.integer(TRANSPORT_PORT).unwrap(), Some(8883));
        assert_eq!(snapshot.boolean(TRANSPORT_ENABLED).unwrap(), Some(true));
    }

    #[test]
    fn rejects_non_scalar_values() {
        assert!(serde_json::from_str::<ConfigSnapshot>(r#"{"transport.port":1.5}"#).is_err());
        assert!(serde_json::from_str::<ConfigSnapshot>(r#"{"transport.user":null}"#).is_err());
        assert!(serde_json::from_str::<ConfigSnapshot>(r#"{"transport.scan":{}}"#).is_err());
    }

    #[test]
    fn wrong_type_is_a_type_mismatch() {
        let snapshot = ConfigSnapshot::new().with(TRANSPORT_PORT, "8883");
        let err = snapshot.integer(TRANSPORT_PORT).unwrap_err();
        match err {
            ReloaderError::TypeMismatch {
                key,
                expected,
                found,
            } => {
                assert_eq!(key, TRANSPORT_PORT);
                assert_eq!(expected, "integer");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_optional_key_is_none() {
        let snapshot = ConfigSnapshot::new();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.string(TRANSPORT_USER).unwrap(), None);
        assert!(matches!(
            snapshot.required_boolean(TRANSPORT_SECURED),
            Err(ReloaderError::MissingProperty(_))
        ));
    }
}
