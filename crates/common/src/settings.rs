//! 读取已渲染的传输服务配置文件

use crate::error::{ReloaderError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 传输服务启动时看到的配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportSettings {
    pub mqtt_hostname: Option<String>,
    pub mqtt_port: Option<i64>,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_force_unsecure: Option<bool>,
    pub gateway_id: Option<String>,
    pub gateway_model: Option<String>,
    pub gateway_version: Option<String>,
    pub ble_filters: Option<String>,
    pub ble_scan: Option<String>,
}

impl TransportSettings {
    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut settings = Self::default();

        for (index, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let (key, value) = raw.split_once(':').ok_or_else(|| {
                ReloaderError::invalid_settings(format!("line {}: expected key: value", index + 1))
            })?;
            // 只去掉冒号后的单个空格，保留值本身的首尾空白
            let value = value.strip_prefix(' ').unwrap_or(value);

            match key.trim() {
                "mqtt_hostname" => settings.mqtt_hostname = Some(value.to_string()),
                "mqtt_port" => {
                    let port = value.trim().parse::<i64>().map_err(|_| {
                        ReloaderError::invalid_settings(format!(
                            "line {}: invalid mqtt_port {}",
                            index + 1,
                            value
                        ))
                    })?;
                    settings.mqtt_port = Some(port);
                }
                "mqtt_username" => settings.mqtt_username = Some(value.to_string()),
                "mqtt_password" => settings.mqtt_password = Some(value.to_string()),
                "mqtt_force_unsecure" => {
                    let flag = match value.trim() {
                        "True" => true,
                        "False" => false,
                        other => {
                            return Err(ReloaderError::invalid_settings(format!(
                                "line {}: invalid mqtt_force_unsecure {}",
                                index + 1,
                                other
                            )));
                        }
                    };
                    settings.mqtt_force_unsecure = Some(flag);
                }
                "gateway_id" => settings.gateway_id = Some(value.to_string()),
                "gateway_model" => settings.gateway_model = Some(value.to_string()),
                "gateway_version" => settings.gateway_version = Some(value.to_string()),
                "ble_filters" => settings.ble_filters = Some(unquote(value, index)?),
                "ble_scan" => settings.ble_scan = Some(unquote(value, index)?),
                _ => {}
            }
        }

        Ok(settings)
    }
}

fn unquote(value: &str, index: usize) -> Result<String> {
    value
        .trim_end()
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .map(str::to_string)
        .ok_or_else(|| {
            ReloaderError::invalid_settings(format!(
                "line {}: expected single-quoted value",
                index + 1
            ))
        })
}
