use crate::error::{ReloaderError, Result};
use crate::models::{ServiceAction, ServiceCall};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// 同步调用系统服务管理器
pub trait ServiceController: Send + Sync {
    /// 阻塞直到子进程退出，返回退出码（被信号终止时为 None）
    fn control(&self, action: ServiceAction, service: &str) -> Result<Option<i32>>;

    /// 调用服务管理器并把失败折叠为记录，不向上传播
    fn call(&self, action: ServiceAction, service: &str) -> ServiceCall {
        match self.control(action, service) {
            Ok(exit_code) => ServiceCall {
                action,
                exit_code,
                error: None,
            },
            Err(err) => ServiceCall {
                action,
                exit_code: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// `systemctl <stop|start> <service>`，stdout 与 stderr 一起追加到日志文件
#[derive(Debug, Clone)]
pub struct SystemctlController {
    binary: String,
    log_path: PathBuf,
}

impl SystemctlController {
    pub fn new(binary: impl Into<String>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            log_path: log_path.into(),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

impl ServiceController for SystemctlController {
    fn control(&self, action: ServiceAction, service: &str) -> Result<Option<i32>> {
        let fail = |reason: String| ReloaderError::service_control(action.as_str(), service, reason);

        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|err| fail(format!("open {}: {}", self.log_path.display(), err)))?;
        let log_err = log
            .try_clone()
            .map_err(|err| fail(format!("clone log handle: {}", err)))?;

        debug!("running {} {} {}", self.binary, action.as_str(), service);
        let status = Command::new(&self.binary)
            .arg(action.as_str())
            .arg(service)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .status()
            .map_err(|err| fail(format!("spawn {}: {}", self.binary, err)))?;

        Ok(status.code())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn appends_command_output_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("systemctl.log");
        fs::write(&log_path, "previous\n").unwrap();

        let controller = SystemctlController::new("echo", &log_path);
        let stop = controller.call(ServiceAction::Stop, "bleTransport.service");
        let start = controller.call(ServiceAction::Start, "bleTransport.service");

        assert!(stop.succeeded());
        assert!(start.succeeded());
        assert_eq!(
            fs::read_to_string(&log_path).unwrap(),
            "previous\nstop bleTransport.service\nstart bleTransport.service\n"
        );
    }

    #[test]
    fn non_zero_exit_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let controller = SystemctlController::new("false", dir.path().join("systemctl.log"));

        let exit = controller
            .control(ServiceAction::Stop, "bleTransport.service")
            .unwrap();
        assert_eq!(exit, Some(1));

        let call = controller.call(ServiceAction::Stop, "bleTransport.service");
        assert!(!call.succeeded());
        assert!(call.error.is_none());
    }

    #[test]
    fn missing_binary_is_a_service_control_error() {
        let dir = tempfile::tempdir().unwrap();
        let controller = SystemctlController::new(
            dir.path().join("no-such-systemctl").display().to_string(),
            dir.path().join("systemctl.log"),
        );

        assert!(matches!(
            controller.control(ServiceAction::Start, "bleTransport.service"),
            Err(ReloaderError::ServiceControl { .. })
        ));
        let call = controller.call(ServiceAction::Start, "bleTransport.service");
        assert_eq!(call.exit_code, None);
        assert!(call.error.unwrap().contains("spawn"));
    }

    #[test]
    fn unwritable_log_is_a_service_control_error() {
        let dir = tempfile::tempdir().unwrap();
        let controller =
            SystemctlController::new("echo", dir.path().join("missing").join("systemctl.log"));
        let call = controller.call(ServiceAction::Stop, "bleTransport.service");
        assert!(call.error.unwrap().contains("open"));
    }
}
