pub mod config;
pub mod device;
pub mod error;
pub mod models;
pub mod reloader;
pub mod render;
pub mod resolver;
pub mod service;
pub mod settings;
pub mod snapshot;
pub mod state;
pub mod validation;

// ============ 重新导出常用类型 ============

// 错误处理
pub use error::{ReloaderError, Result as ReloaderResult};

// 配置相关
pub use config::AppConfig;

// 状态管理
pub use state::SnapshotStore;

// 验证相关
pub use validation::{ValidationError, validate_resolved};

// 快照与模型
pub use models::{GatewaySelector, ResolvedGatewayConfig, UpdateOutcome, UpdateReport};
pub use snapshot::{ConfigSnapshot, PropertyValue};

// 重载流程
pub use device::{DeviceNameProvider, HostnameProvider, StaticDeviceName};
pub use reloader::{ConfigReloader, UpdateRejected, WriteFailurePolicy};
pub use render::ConfigFileWriter;
pub use resolver::{PropertyResolver, Resolution};
pub use service::{ServiceController, SystemctlController};
pub use settings::TransportSettings;

// 兼容性别名（Result 是更常用的名称）
pub use error::Result;
