use crate::device::DeviceNameProvider;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 网关名称的派生方式（gatewayID 属性）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewaySelector {
    /// customID 前缀 + 设备名称
    Device,
    /// 仅使用 customID
    Custom,
    /// 未知或缺失的取值，不输出 gateway_id
    Unset,
}

impl GatewaySelector {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("device") => Self::Device,
            Some("custom") => Self::Custom,
            _ => Self::Unset,
        }
    }

    /// 由选择器派生最终的网关名称，`custom_id` 需已去除首尾空白
    pub fn gateway_id(
        self,
        custom_id: &str,
        device: &dyn DeviceNameProvider,
    ) -> Result<Option<String>> {
        match self {
            Self::Device => Ok(Some(format!("{}{}", custom_id, device.device_name()?))),
            Self::Custom => Ok(Some(custom_id.to_string())),
            Self::Unset => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGatewayConfig {
    pub address: String,
    pub port: i64,
    pub username: String,
    pub password: String,
    pub force_unsecure: bool,
    pub gateway_id: Option<String>,
    pub gateway_model: Option<String>,
    pub gateway_version: Option<String>,
    pub ble_filters: String,
    pub ble_scan: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EmptySnapshot,
    TransportDisabled,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptySnapshot => "empty_snapshot",
            Self::TransportDisabled => "transport_disabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum UpdateOutcome {
    Skipped(SkipReason),
    Applied,
    /// 写入失败且策略为 SkipStart，服务保持停止
    StartSuppressed,
    /// 配置错误，服务已停止且未写入文件
    Rejected,
}

impl UpdateOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped(reason) => reason.as_str(),
            Self::Applied => "applied",
            Self::StartSuppressed => "start_suppressed",
            Self::Rejected => "rejected",
        }
    }

    /// 本次更新是否尝试写入了配置文件
    pub fn attempted_write(&self) -> bool {
        matches!(self, Self::Applied | Self::StartSuppressed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Stop,
    Start,
}

impl ServiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Start => "start",
        }
    }
}

/// 单次 systemctl 调用的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub action: ServiceAction,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
}

impl ServiceCall {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.exit_code == Some(0)
    }
}

/// 一次更新事件的完整记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReport {
    pub update_id: Uuid,
    pub outcome: UpdateOutcome,
    pub stop: ServiceCall,
    pub start: Option<ServiceCall>,
    pub write_error: Option<String>,
    /// 配置被拒绝的原因
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}
