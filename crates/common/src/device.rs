use crate::error::{ReloaderError, Result};
use std::fs;
use std::path::PathBuf;

/// 提供主机设备名称（仅在 `device` 选择器分支中使用）
pub trait DeviceNameProvider: Send + Sync {
    fn device_name(&self) -> Result<String>;
}

/// 固定的设备名称，通常来自 DEVICE_NAME 环境变量
#[derive(Debug, Clone)]
pub struct StaticDeviceName(pub String);

impl DeviceNameProvider for StaticDeviceName {
    fn device_name(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// 从内核读取主机名
#[derive(Debug, Clone)]
pub struct HostnameProvider {
    sources: Vec<PathBuf>,
}

impl Default for HostnameProvider {
    fn default() -> Self {
        Self {
            sources: vec![
                PathBuf::from("/proc/sys/kernel/hostname"),
                PathBuf::from("/etc/hostname"),
            ],
        }
    }
}

impl HostnameProvider {
    pub fn with_sources(sources: Vec<PathBuf>) -> Self {
        Self { sources }
    }
}

impl DeviceNameProvider for HostnameProvider {
    fn device_name(&self) -> Result<String> {
        for source in &self.sources {
            match fs::read_to_string(source) {
                Ok(raw) => {
                    let name = raw.trim();
                    if !name.is_empty() {
                        return Ok(name.to_string());
                    }
                }
                Err(err) => {
                    tracing::debug!("hostname source {} unavailable: {}", source.display(), err);
                }
            }
        }
        Err(ReloaderError::device_name("no hostname source available"))
    }
}
