//! # Digitizer Protocol
//!
//! 四轴数字化仪遥测帧协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `decoder`: 累积式帧解码器（带逐字节重同步）
//!
//! ## 帧格式
//!
//! 固定 10 字节：
//!
//! | 偏移 | 长度 | 字段     | 说明               |
//! |------|------|----------|--------------------|
//! | 0    | 1    | preamble | 固定 `0x55`        |
//! | 1    | 2    | a        | 底座偏航步进计数   |
//! | 3    | 2    | b        | 第一俯仰步进计数   |
//! | 5    | 2    | c        | 第二俯仰步进计数   |
//! | 7    | 2    | d        | 针尖俯仰步进计数   |
//! | 9    | 1    | epilogue | 固定 `0xAA`        |
//!
//! ## 字节序
//!
//! 步进计数字段使用高位在前（大端字节序）。
//! 本模块提供了字节序转换工具函数。

pub mod decoder;

// 重新导出常用类型
pub use decoder::FrameDecoder;

use thiserror::Error;

// ============================================================================
// 协议常量
// ============================================================================

/// 帧前导码
pub const PREAMBLE: u8 = 0x55;

/// 帧结尾码
pub const EPILOGUE: u8 = 0xAA;

/// 帧总长度（字节）：前导码 + 4 × u16 + 结尾码
pub const FRAME_LEN: usize = 10;

/// 一帧遥测样本：四个关节的步进计数
///
/// # 设计目的
///
/// `AngleSample` 是解码层和运动学层之间的中间抽象，提供：
/// - **层次解耦**：运动学层不依赖底层字节流实现
/// - **不可变快照**：每帧产生一个新值，后续帧替换而不是原地修改
/// - **类型安全**：编译时保证四个字段齐全，避免原始字节操作错误
///
/// # 在架构中的位置
///
/// ```text
/// Byte Stream (digitizer-stream)
///     ↓ FrameDecoder::try_decode 解析 / to_frame() 构建
/// AngleSample (此类型)
///     ↓ ArmGeometry::resolve 正运动学
/// Position (digitizer-kinematics)
/// ```
///
/// # 取值范围
///
/// 计数名义上落在 `[0, steps_per_revolution)`，超过一圈的值同样被接受，
/// 由三角函数的周期性自然回绕，协议层不做截断。
///
/// # 转换示例
///
/// ```rust
/// use digitizer_protocol::{AngleSample, FRAME_LEN};
///
/// let sample = AngleSample::new(150, 0, 0, 0);
/// let frame = sample.to_frame();
///
/// assert_eq!(frame.len(), FRAME_LEN);
/// assert_eq!(AngleSample::from_frame(&frame).unwrap(), sample);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AngleSample {
    /// 底座偏航关节步进计数
    pub a: u16,

    /// 第一俯仰关节步进计数
    pub b: u16,

    /// 第二俯仰关节步进计数
    pub c: u16,

    /// 针尖俯仰关节步进计数
    pub d: u16,
}

impl AngleSample {
    /// 创建一帧样本
    pub fn new(a: u16, b: u16, c: u16, d: u16) -> Self {
        Self { a, b, c, d }
    }

    /// 编码为 10 字节线上帧（含前导码和结尾码）
    pub fn to_frame(&self) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = PREAMBLE;
        frame[1..3].copy_from_slice(&u16_to_bytes_be(self.a));
        frame[3..5].copy_from_slice(&u16_to_bytes_be(self.b));
        frame[5..7].copy_from_slice(&u16_to_bytes_be(self.c));
        frame[7..9].copy_from_slice(&u16_to_bytes_be(self.d));
        frame[9] = EPILOGUE;
        frame
    }

    /// 从 10 字节线上帧解析，校验前导码和结尾码
    pub fn from_frame(frame: &[u8; FRAME_LEN]) -> Result<Self, FramingError> {
        if frame[0] != PREAMBLE {
            return Err(FramingError::InvalidPreamble { actual: frame[0] });
        }
        if frame[FRAME_LEN - 1] != EPILOGUE {
            return Err(FramingError::InvalidEpilogue {
                actual: frame[FRAME_LEN - 1],
            });
        }

        Ok(Self {
            a: bytes_to_u16_be([frame[1], frame[2]]),
            b: bytes_to_u16_be([frame[3], frame[4]]),
            c: bytes_to_u16_be([frame[5], frame[6]]),
            d: bytes_to_u16_be([frame[7], frame[8]]),
        })
    }
}

/// 帧同步错误类型
///
/// 前导码或结尾码不匹配说明字节流失去了帧边界对齐。
/// 该错误按帧可恢复：解码器丢弃一个字节后重新扫描
/// （见 [`decoder::FrameDecoder`]），不会中断整条流。
#[derive(Error, Debug)]
pub enum FramingError {
    #[error("Invalid preamble: expected 0x55, got 0x{actual:02X}")]
    InvalidPreamble { actual: u8 },

    #[error("Invalid epilogue: expected 0xAA, got 0x{actual:02X}")]
    InvalidEpilogue { actual: u8 },
}

// ============================================================================
// 字节序转换工具函数
// ============================================================================

/// 大端字节序转 u16
pub fn bytes_to_u16_be(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// u16 转大端字节序
pub fn u16_to_bytes_be(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}
