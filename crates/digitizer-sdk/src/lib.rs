//! Digitizer SDK - 四轴数位臂遥测 Rust SDK
//!
//! 高性能、零抽象开销的 Rust SDK，用于四轴数位臂的实时遥测采集与正运动学解算。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 10 字节遥测帧的定界、解码与单字节重同步
//! - **字节流层** (`stream`): 字节源抽象，支持任意 `io::Read` 和脚本化 mock
//! - **运动学层** (`kinematics`): 步数 → 弧度 → 针尖坐标的正运动学解算
//! - **驱动层** (`driver`): IO 线程管理、状态同步、样本注入、回调与指标
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use digitizer_sdk::prelude::*;
//! use digitizer_sdk::stream::ReadSource;
//! use std::time::Duration;
//!
//! # fn open_serial_port() -> std::io::Stdin { std::io::stdin() }
//! // 端口的打开与配置由调用方负责，驱动只消费一个 io::Read
//! let port = open_serial_port();
//! let digitizer = DigitizerBuilder::new()
//!     .build(ReadSource::new(port))
//!     .unwrap();
//!
//! let snapshot = digitizer.wait_for_sample(Duration::from_secs(1)).unwrap();
//! println!("针尖位置: {}", snapshot.position);
//! ```

// 分层模块（按依赖顺序）
pub use digitizer_driver as driver;
pub use digitizer_kinematics as kinematics;
pub use digitizer_protocol as protocol;
pub use digitizer_stream as stream;

// Prelude 模块
pub mod prelude;

// --- 用户以此为界 ---
// 以下是通过 Facade Pattern 提供的公共 API

// 协议层常用类型
pub use digitizer_protocol::{AngleSample, FrameDecoder, FramingError};

// 字节流层常用类型
pub use digitizer_stream::{ByteSource, ReadSource, StreamError};

#[cfg(feature = "mock")]
pub use digitizer_stream::MockSource;

// 运动学层常用类型
pub use digitizer_kinematics::{ArmGeometry, Position};

// 驱动层（推荐的入口点）
pub use digitizer_driver::{
    Digitizer, DigitizerBuilder, DigitizerConfig, DriverError, MetricsSnapshot, PipelineConfig,
    TelemetryCallback, TelemetrySnapshot,
};

/// 初始化 tracing 日志（env-filter）
///
/// 通过 `RUST_LOG` 环境变量控制过滤，例如：
///
/// ```bash
/// RUST_LOG=digitizer_driver=trace cargo run -p digitizer-sdk --example replay
/// ```
///
/// 只应在二进制入口调用；库代码从不初始化日志。
/// 重复调用是安全的（后续调用不生效）。
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
