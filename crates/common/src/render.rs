//! 传输服务配置文件的渲染与写入

use crate::error::Result;
use crate::models::ResolvedGatewayConfig;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// 目标格式以单引号作为字符串定界符，载荷内的单引号统一替换为双引号
pub fn requote(payload: &str) -> String {
    payload.replace('\'', "\"")
}

fn python_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// 按固定的分节顺序渲染配置文本
pub fn render(config: &ResolvedGatewayConfig) -> String {
    let mut out = String::new();

    out.push_str("# MQTT brocker Settings\n");
    out.push_str(&format!("mqtt_hostname: {}\n", config.address));
    out.push_str(&format!("mqtt_port: {}\n", config.port));
    out.push_str(&format!("mqtt_username: {}\n", config.username));
    out.push_str(&format!("mqtt_password: {}\n", config.password));
    out.push_str(&format!(
        "mqtt_force_unsecure: {}\n",
        python_bool(config.force_unsecure)
    ));
    out.push('\n');

    out.push_str("# Gateway settings\n");
    if let Some(gateway_id) = &config.gateway_id {
        out.push_str(&format!("gateway_id: {}\n", gateway_id));
    }
    if let Some(model) = &config.gateway_model {
        out.push_str(&format!("gateway_model: {}\n", model));
    }
    if let Some(version) = &config.gateway_version {
        out.push_str(&format!("gateway_version: {}\n", version));
    }
    out.push('\n');

    out.push_str("# BLE settings\n");
    out.push_str(&format!("ble_filters: '{}'\n", requote(&config.ble_filters)));
    out.push_str(&format!("ble_scan: '{}'\n", requote(&config.ble_scan)));
    out.push('\n');

    out
}

/// 将配置整体覆盖写入固定路径
#[derive(Debug, Clone)]
pub struct ConfigFileWriter {
    path: PathBuf,
}

impl ConfigFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 先写同目录临时文件再 rename，服务不会读到写了一半的文件
    pub fn write(&self, config: &ResolvedGatewayConfig) -> Result<()> {
        let contents = render(config);
        let tmp_path = self.tmp_path();

        let result = (|| -> Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config() -> ResolvedGatewayConfig {
        ResolvedGatewayConfig {
            address: "broker.local".to_string(),
            port: 8883,
            username: "user".to_string(),
            password: "secret".to_string(),
            force_unsecure: false,
            gateway_id: Some("gw-42".to_string()),
            gateway_model: None,
            gateway_version: None,
            ble_filters: "{'a':1}".to_string(),
            ble_scan: "{}".to_string(),
        }
    }

    #[test]
    fn renders_fixed_layout() {
        let expected = "\
# MQTT brocker Settings
mqtt_hostname: broker.local
mqtt_port: 8883
mqtt_username: user
mqtt_password: secret
mqtt_force_unsecure: False

# Gateway settings
gateway_id: gw-42

# BLE settings
ble_filters: '{\"a\":1}'
ble_scan: '{}'

";
        assert_eq!(render(&make_test_config()), expected);
    }

    #[test]
    fn unset_gateway_id_omits_line() {
        let config = ResolvedGatewayConfig {
            gateway_id: None,
            force_unsecure: true,
            ..make_test_config()
        };
        let text = render(&config);
        assert!(!text.contains("gateway_id"));
        assert!(text.contains("# Gateway settings\n\n# BLE settings"));
        assert!(text.contains("mqtt_force_unsecure: True\n"));
    }

    #[test]
    fn optional_gateway_metadata_follows_gateway_id() {
        let config = ResolvedGatewayConfig {
            gateway_model: Some("N6".to_string()),
            gateway_version: Some("2.1".to_string()),
            ..make_test_config()
        };
        assert!(render(&config).contains(
            "gateway_id: gw-42\ngateway_model: N6\ngateway_version: 2.1\n\n"
        ));
    }

    #[test]
    fn requote_replaces_every_single_quote() {
        assert_eq!(requote(""), "");
        assert_eq!(requote("{}"), "{}");
        assert_eq!(requote("'"), "\"");
        assert_eq!(
            requote("[{'type':'eddystone','name':'o\"k'}]"),
            "[{\"type\":\"eddystone\",\"name\":\"o\"k\"}]"
        );
    }

    #[test]
    fn ble_payload_wrapped_in_one_pair_of_single_quotes() {
        let config = ResolvedGatewayConfig {
            ble_filters: "''".to_string(),
            ble_scan: String::new(),
            ..make_test_config()
        };
        let text = render(&config);
        assert!(text.contains("ble_filters: '\"\"'\n"));
        assert!(text.contains("ble_scan: ''\n"));
    }

    #[test]
    fn write_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bleTransport.service.cfg");
        fs::write(&path, "stale content that is much longer than needed\n".repeat(50)).unwrap();

        let writer = ConfigFileWriter::new(&path);
        writer.write(&make_test_config()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), render(&make_test_config()));
        assert!(!dir.path().join("bleTransport.service.cfg.tmp").exists());
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ConfigFileWriter::new(dir.path().join("missing").join("x.cfg"));
        assert!(matches!(
            writer.write(&make_test_config()),
            Err(crate::error::ReloaderError::Io(_))
        ));
    }
}
