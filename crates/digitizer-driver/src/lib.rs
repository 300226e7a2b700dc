//! 驱动层模块
//!
//! 本模块提供数位臂的遥测驱动功能，包括：
//! - IO 线程管理（独占字节源与解码器）
//! - 状态同步（ArcSwap 无锁快照）
//! - 帧解码与正运动学解算
//! - 样本注入通道（绕过解码器，走同一条解算路径）
//! - 钩子系统：每帧回调、运行状态回调
//!
//! # 使用场景
//!
//! 适用于需要直接管理字节源、需要高频读取针尖坐标的场景。
//! 大多数用户应该使用 `digitizer-sdk` 提供的统一入口。

mod builder;
pub mod config;
mod digitizer;
mod error;
pub mod hooks;
pub mod metrics;
pub mod pipeline;
pub mod state;

pub use builder::DigitizerBuilder;
pub use config::DigitizerConfig;
pub use digitizer::Digitizer;
pub use error::DriverError;
pub use hooks::{HookManager, TelemetryCallback};
pub use metrics::{MetricsSnapshot, TelemetryMetrics};
pub use pipeline::{PipelineConfig, io_loop};
pub use state::{DigitizerContext, TelemetrySnapshot};
