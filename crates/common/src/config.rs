use crate::reloader::WriteFailurePolicy;
use anyhow::{Result, anyhow};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_DIR: &str = "/data/solidsense/ble_gateway";
pub const DEFAULT_SERVICE_NAME: &str = "bleTransport.service";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_dir: PathBuf,
    pub service_name: String,
    pub systemctl_bin: String,
    pub device_name: Option<String>,
    pub control_addr: String,
    pub properties_file: Option<PathBuf>,
    pub write_failure_policy: WriteFailurePolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        // Load .env early so process env reads pick it up.
        let _ = dotenvy::dotenv();

        let base_dir = env::var("BASE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_BASE_DIR));
        let service_name =
            env::var("SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());
        if service_name.trim().is_empty() || service_name.contains('/') {
            return Err(anyhow!("SERVICE_NAME invalid: {:?}", service_name));
        }
        let systemctl_bin = env::var("SYSTEMCTL_BIN").unwrap_or_else(|_| "systemctl".to_string());
        let device_name = env_non_empty("DEVICE_NAME");
        let control_addr =
            env::var("CONTROL_ADDR").unwrap_or_else(|_| "0.0.0.0:9100".to_string());
        let properties_file = env_non_empty("PROPERTIES_FILE").map(PathBuf::from);

        let write_failure_policy = if env_bool("START_ON_WRITE_FAILURE", true) {
            WriteFailurePolicy::StartAnyway
        } else {
            WriteFailurePolicy::SkipStart
        };

        Ok(Self {
            base_dir,
            service_name,
            systemctl_bin,
            device_name,
            control_addr,
            properties_file,
            write_failure_policy,
        })
    }

    /// 传输服务读取的配置文件路径
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.cfg", self.service_name))
    }

    /// systemctl 输出追加写入的日志路径
    pub fn log_path(&self) -> PathBuf {
        self.base_dir.join("systemctl.log")
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"),
        Err(_) => default,
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
