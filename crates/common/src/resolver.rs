use crate::device::DeviceNameProvider;
use crate::error::{ReloaderError, Result};
use crate::models::{GatewaySelector, ResolvedGatewayConfig, SkipReason};
use crate::snapshot::*;
use crate::validation::validate_resolved;
use std::sync::Arc;
use tracing::warn;

/// 解析结果：要么得到完整配置，要么本次更新跳过
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Skip(SkipReason),
    Resolved(ResolvedGatewayConfig),
}

/// 从配置快照中提取类型化字段并派生网关名称
#[derive(Clone)]
pub struct PropertyResolver {
    device: Arc<dyn DeviceNameProvider>,
}

impl PropertyResolver {
    pub fn new(device: Arc<dyn DeviceNameProvider>) -> Self {
        Self { device }
    }

    pub fn resolve(&self, snapshot: Option<&ConfigSnapshot>) -> Result<Resolution> {
        let snapshot = match snapshot {
            Some(snapshot) if !snapshot.is_empty() => snapshot,
            _ => return Ok(Resolution::Skip(SkipReason::EmptySnapshot)),
        };

        if !snapshot.required_boolean(TRANSPORT_ENABLED)? {
            return Ok(Resolution::Skip(SkipReason::TransportDisabled));
        }

        let selector = GatewaySelector::parse(snapshot.string(GATEWAY_ID)?);
        let custom_id = snapshot.string(CUSTOM_ID)?.unwrap_or_default().trim();
        let gateway_id = selector.gateway_id(custom_id, self.device.as_ref())?;

        let secured = snapshot.required_boolean(TRANSPORT_SECURED)?;

        let config = ResolvedGatewayConfig {
            address: snapshot.required_string(TRANSPORT_ADDRESS)?.to_string(),
            port: snapshot.required_integer(TRANSPORT_PORT)?,
            username: optional_string(snapshot, TRANSPORT_USER)?,
            password: optional_string(snapshot, TRANSPORT_PASSWD)?,
            force_unsecure: !secured,
            gateway_id,
            gateway_model: non_empty(snapshot, GATEWAY_MODEL)?,
            gateway_version: non_empty(snapshot, GATEWAY_VERSION)?,
            ble_filters: optional_string(snapshot, TRANSPORT_FILTERS)?,
            ble_scan: optional_string(snapshot, TRANSPORT_SCAN)?,
        };

        let mut fatal = Vec::new();
        for error in validate_resolved(&config) {
            if error.is_fatal() {
                fatal.push(error.description());
            } else {
                warn!("{}", error.description());
            }
        }
        if !fatal.is_empty() {
            return Err(ReloaderError::validation(fatal.join("; ")));
        }

        Ok(Resolution::Resolved(config))
    }
}

fn optional_string(snapshot: &ConfigSnapshot, key: &str) -> Result<String> {
    Ok(snapshot.string(key)?.unwrap_or_default().to_string())
}

fn non_empty(snapshot: &ConfigSnapshot, key: &str) -> Result<Option<String>> {
    Ok(snapshot
        .string(key)?
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string))
}
