//! 配置重载流程：停止服务 → 解析属性 → 写入配置文件 → 启动服务
//!
//! 前置条件：同一时刻最多只有一个更新在执行。配置文件和 systemctl.log
//! 都是进程外共享资源，这里不加锁，由调用方负责串行化。

use crate::error::ReloaderError;
use crate::models::{ServiceAction, UpdateOutcome, UpdateReport};
use crate::render::ConfigFileWriter;
use crate::resolver::{PropertyResolver, Resolution};
use crate::service::ServiceController;
use crate::snapshot::ConfigSnapshot;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 配置文件写入失败后是否仍然启动服务
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteFailurePolicy {
    /// 沿用旧文件（或无文件）启动服务
    #[default]
    StartAnyway,
    /// 服务保持停止
    SkipStart,
}

/// 配置错误导致的中止；报告中保留已经执行的停止调用
#[derive(Debug, Error)]
#[error("{error}")]
pub struct UpdateRejected {
    pub report: UpdateReport,
    #[source]
    pub error: ReloaderError,
}

#[derive(Clone)]
pub struct ConfigReloader {
    service_name: String,
    resolver: PropertyResolver,
    writer: ConfigFileWriter,
    controller: Arc<dyn ServiceController>,
    write_failure_policy: WriteFailurePolicy,
}

impl ConfigReloader {
    pub fn new(
        service_name: impl Into<String>,
        resolver: PropertyResolver,
        writer: ConfigFileWriter,
        controller: Arc<dyn ServiceController>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            resolver,
            writer,
            controller,
            write_failure_policy: WriteFailurePolicy::default(),
        }
    }

    pub fn with_write_failure_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.write_failure_policy = policy;
        self
    }

    pub fn resolver(&self) -> &PropertyResolver {
        &self.resolver
    }

    pub fn writer(&self) -> &ConfigFileWriter {
        &self.writer
    }

    /// 处理一次配置更新事件
    ///
    /// 只有配置错误（缺少属性、类型不匹配、验证失败、设备名称不可用）返回 `Err`，
    /// 此时服务已停止且不会重新启动，`UpdateRejected::report` 的结果为 `Rejected`。
    /// 服务调用和写文件的失败记录在报告中。
    pub fn update(
        &self,
        snapshot: Option<&ConfigSnapshot>,
    ) -> Result<UpdateReport, UpdateRejected> {
        let update_id = Uuid::new_v4();
        info!(%update_id, service = %self.service_name, "configuration update");

        let stop = self.controller.call(ServiceAction::Stop, &self.service_name);

        let resolution = match self.resolver.resolve(snapshot) {
            Ok(resolution) => resolution,
            Err(error) => {
                warn!(
                    %update_id,
                    error = %error,
                    stop_exit_code = ?stop.exit_code,
                    stop_error = ?stop.error,
                    "configuration rejected, service left stopped"
                );
                let report = UpdateReport {
                    update_id,
                    outcome: UpdateOutcome::Rejected,
                    stop,
                    start: None,
                    write_error: None,
                    error: Some(error.to_string()),
                    finished_at: Utc::now(),
                };
                return Err(UpdateRejected { report, error });
            }
        };

        let config = match resolution {
            Resolution::Skip(reason) => {
                info!(%update_id, reason = reason.as_str(), "update skipped, service left stopped");
                return Ok(UpdateReport {
                    update_id,
                    outcome: UpdateOutcome::Skipped(reason),
                    stop,
                    start: None,
                    write_error: None,
                    error: None,
                    finished_at: Utc::now(),
                });
            }
            Resolution::Resolved(config) => config,
        };

        debug!(%update_id, path = %self.writer.path().display(), "writing transport config");
        let write_error = self.writer.write(&config).err().map(|err| err.to_string());

        if let Some(err) = &write_error
            && self.write_failure_policy == WriteFailurePolicy::SkipStart
        {
            warn!(%update_id, error = %err, "config write failed, not starting service");
            return Ok(UpdateReport {
                update_id,
                outcome: UpdateOutcome::StartSuppressed,
                stop,
                start: None,
                write_error,
                error: None,
                finished_at: Utc::now(),
            });
        }

        let start = self.controller.call(ServiceAction::Start, &self.service_name);

        Ok(UpdateReport {
            update_id,
            outcome: UpdateOutcome::Applied,
            stop,
            start: Some(start),
            write_error,
            error: None,
            finished_at: Utc::now(),
        })
    }
}
