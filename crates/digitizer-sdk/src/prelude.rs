//! Prelude - 常用类型的便捷导入
//!
//! 大多数用户应该使用这个模块来导入常用类型：
//!
//! ```rust
//! use digitizer_sdk::prelude::*;
//! ```

// 驱动层（推荐使用）
pub use crate::driver::{Digitizer, DigitizerBuilder, DigitizerConfig, TelemetryCallback};

// 数据类型
pub use crate::kinematics::{ArmGeometry, Position};
pub use crate::protocol::AngleSample;

// 字节流层（常用 Trait）
pub use crate::stream::ByteSource;

// 错误类型
pub use crate::driver::DriverError;
pub use crate::protocol::FramingError;
pub use crate::stream::StreamError;
