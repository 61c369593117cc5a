//! 解析后配置的验证模块
//!
//! 端口、地址错误以及字段中的换行符会写出损坏的 broker 配置，属于致命错误；
//! BLE 载荷不是合法 JSON 时只记录告警，由传输服务自行处理。

use crate::models::ResolvedGatewayConfig;
use crate::render::requote;

/// 验证错误类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 端口超出有效范围
    InvalidPort { port: i64 },

    /// broker 地址为空
    EmptyAddress,

    /// BLE 载荷替换引号后仍不是合法 JSON
    MalformedPayload { field: &'static str },

    /// 字段包含 CR/LF，写入后会多出一行配置
    LineBreak { field: &'static str },
}

impl ValidationError {
    /// 获取错误的详细描述
    pub fn description(&self) -> String {
        match self {
            Self::InvalidPort { port } => format!("invalid port {} (must be 1-65535)", port),
            Self::EmptyAddress => "broker address is empty".to_string(),
            Self::MalformedPayload { field } => format!("{} is not valid JSON", field),
            Self::LineBreak { field } => format!("{} contains a line break", field),
        }
    }

    /// 是否需要中止本次更新
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MalformedPayload { .. })
    }
}

/// 验证解析后的网关配置
pub fn validate_resolved(config: &ResolvedGatewayConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !(1..=65535).contains(&config.port) {
        errors.push(ValidationError::InvalidPort { port: config.port });
    }

    if config.address.trim().is_empty() {
        errors.push(ValidationError::EmptyAddress);
    }

    // 配置文件按行解析，任何字段都不能跨行
    for (field, value) in [
        ("mqtt_hostname", config.address.as_str()),
        ("mqtt_username", config.username.as_str()),
        ("mqtt_password", config.password.as_str()),
        ("gateway_id", config.gateway_id.as_deref().unwrap_or_default()),
        ("gateway_model", config.gateway_model.as_deref().unwrap_or_default()),
        ("gateway_version", config.gateway_version.as_deref().unwrap_or_default()),
        ("ble_filters", config.ble_filters.as_str()),
        ("ble_scan", config.ble_scan.as_str()),
    ] {
        if value.contains(['\r', '\n']) {
            errors.push(ValidationError::LineBreak { field });
        }
    }

    // 空载荷表示不下发默认配置
    for (field, payload) in [
        ("ble_filters", &config.ble_filters),
        ("ble_scan", &config.ble_scan),
    ] {
        if payload.is_empty() {
            continue;
        }
        if serde_json::from_str::<serde_json::Value>(&requote(payload)).is_err() {
            errors.push(ValidationError::MalformedPayload { field });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config() -> ResolvedGatewayConfig {
        ResolvedGatewayConfig {
            address: "broker.local".to_string(),
            port: 8883,
            username: String::new(),
            password: String::new(),
            force_unsecure: false,
            gateway_id: Some("gw-42".to_string()),
            gateway_model: None,
            gateway_version: None,
            ble_filters: "{'a':1}".to_string(),
            ble_scan: "{}".to_string(),
        }
    }

    #[test]
    fn test_valid_config_has_no_errors() {
        assert!(validate_resolved(&make_test_config()).is_empty());
    }

    #[test]
    fn test_port_range() {
        for port in [0, -1, 65536] {
            let config = ResolvedGatewayConfig {
                port,
                ..make_test_config()
            };
            let errors = validate_resolved(&config);
            assert_eq!(errors, vec![ValidationError::InvalidPort { port }]);
            assert!(errors[0].is_fatal());
        }
    }

    #[test]
    fn test_blank_address() {
        let config = ResolvedGatewayConfig {
            address: "  ".to_string(),
            ..make_test_config()
        };
        assert_eq!(validate_resolved(&config), vec![ValidationError::EmptyAddress]);
    }

    #[test]
    fn test_malformed_payload_is_not_fatal() {
        let config = ResolvedGatewayConfig {
            ble_scan: "{'period':".to_string(),
            ble_filters: String::new(),
            ..make_test_config()
        };
        let errors = validate_resolved(&config);
        assert_eq!(
            errors,
            vec![ValidationError::MalformedPayload { field: "ble_scan" }]
        );
        assert!(!errors[0].is_fatal());
        assert_eq!(errors[0].description(), "ble_scan is not valid JSON");
    }

    #[test]
    fn test_line_breaks_are_fatal() {
        let config = ResolvedGatewayConfig {
            password: "secret\r".to_string(),
            gateway_id: Some("gw\nmqtt_force_unsecure: True".to_string()),
            gateway_version: Some("1.0".to_string()),
            ..make_test_config()
        };
        let errors = validate_resolved(&config);
        assert_eq!(
            errors,
            vec![
                ValidationError::LineBreak { field: "mqtt_password" },
                ValidationError::LineBreak { field: "gateway_id" },
            ]
        );
        assert!(errors.iter().all(ValidationError::is_fatal));
        assert_eq!(errors[1].description(), "gateway_id contains a line break");
    }

    #[test]
    fn test_validation_error_description() {
        assert_eq!(
            ValidationError::InvalidPort { port: 99999 }.description(),
            "invalid port 99999 (must be 1-65535)"
        );
        assert_eq!(
            ValidationError::EmptyAddress.description(),
            "broker address is empty"
        );
    }
}
