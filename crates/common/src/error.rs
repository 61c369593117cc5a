//! 配置重载统一错误类型定义
//!
//! 全项目共享一个错误类型，区分致命的配置错误与运行期的 IO/服务控制错误。

use thiserror::Error;

/// 配置重载统一错误类型
#[derive(Error, Debug)]
pub enum ReloaderError {
    /// 缺少必需的属性 (400)
    #[error("缺少必需属性: {0}")]
    MissingProperty(String),

    /// 属性类型不匹配 (400)
    #[error("属性类型不匹配: {key} 期望 {expected}，实际 {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// 配置验证错误 (400)
    #[error("配置验证失败: {0}")]
    Validation(String),

    /// 设备名称获取失败 (500)
    #[error("设备名称获取失败: {0}")]
    DeviceName(String),

    /// 服务控制错误 (500)
    #[error("服务控制错误: {action} {service}: {reason}")]
    ServiceControl {
        action: String,
        service: String,
        reason: String,
    },

    /// 配置文件解析错误 (500)
    #[error("配置文件解析失败: {0}")]
    InvalidSettings(String),

    /// IO 错误 (500)
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误 (500)
    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 其他内部错误 (500)
    #[error("内部错误: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ReloaderError {
    /// 创建缺少属性错误
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingProperty(key.into())
    }

    /// 创建验证错误
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// 创建设备名称错误
    pub fn device_name(msg: impl Into<String>) -> Self {
        Self::DeviceName(msg.into())
    }

    /// 创建服务控制错误
    pub fn service_control(
        action: impl Into<String>,
        service: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ServiceControl {
            action: action.into(),
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// 创建配置文件解析错误
    pub fn invalid_settings(msg: impl Into<String>) -> Self {
        Self::InvalidSettings(msg.into())
    }

    /// 判断是否为配置错误（来自输入快照本身）
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingProperty(_) | Self::TypeMismatch { .. } | Self::Validation(_)
        )
    }

    /// 获取 HTTP 状态码
    pub fn http_status_code(&self) -> u16 {
        if self.is_config_error() { 400 } else { 500 }
    }
}

/// Reloader Result 类型别名
pub type Result<T> = std::result::Result<T, ReloaderError>;
