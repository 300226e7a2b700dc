//! # Digitizer Kinematics
//!
//! 四轴数字化仪正运动学解算（纯函数，无 IO 依赖）
//!
//! ## 机械模型
//!
//! 臂结构为一个偏航底座加三段串联俯仰连杆：
//!
//! - `a`: 底座偏航关节（绕垂直轴旋转整条臂）
//! - `b` / `c` / `d`: 三个串联俯仰关节，每个俯仰角在前一个的基础上累加
//!
//! 步进计数先换算为弧度（`steps * 2π / steps_per_revolution`），
//! 再在臂平面内累加出水平伸距和垂直高度：
//!
//! ```text
//! reach  = sin(rb)·L1 + sin(rb+rc)·L2 + sin(rb+rc+rd)·L3
//! height = cos(rb)·L1 + cos(rb+rc)·L2 + cos(rb+rc+rd)·L3 + L0
//! ```
//!
//! 最后由偏航角把臂平面内的伸距投影到笛卡尔坐标：
//!
//! ```text
//! x = reach·sin(ra)
//! y = -reach·cos(ra)
//! z = height
//! ```
//!
//! ## 示例
//!
//! ```rust
//! use digitizer_kinematics::{ArmGeometry, Position};
//! use digitizer_protocol::AngleSample;
//!
//! let geometry = ArmGeometry::default();
//! let position = geometry.resolve(&AngleSample::new(0, 0, 0, 0));
//!
//! // 全零位姿：臂竖直向上，针尖在底座正上方
//! assert_eq!(position, Position::new(0.0, 0.0, 667.0));
//! ```

use digitizer_protocol::AngleSample;
use std::f64::consts::TAU;
use std::fmt;

// ============================================================================
// 默认几何常量（毫米 / 步）
// ============================================================================

/// 默认每圈步进数
pub const DEFAULT_STEPS_PER_REVOLUTION: u16 = 600;

/// 默认底座高度（毫米）
pub const DEFAULT_BASE_HEIGHT: f64 = 72.5;

/// 默认第一连杆长度（毫米）
pub const DEFAULT_FIRST_LINK_LENGTH: f64 = 230.0;

/// 默认第二连杆长度（毫米）
pub const DEFAULT_SECOND_LINK_LENGTH: f64 = 230.0;

/// 默认针尖连杆长度（毫米）：夹持座 9.5 + 测针 125.0
pub const DEFAULT_NEEDLE_LENGTH: f64 = 134.5;

/// 步进计数换算为弧度
///
/// 计数超过一圈时弧度同样超过 2π，由后续三角函数的周期性自然回绕。
#[inline]
pub fn step_to_rad(steps: u16, steps_per_revolution: u16) -> f64 {
    f64::from(steps) * TAU / f64::from(steps_per_revolution)
}

/// 针尖在笛卡尔坐标系中的位置（毫米）
///
/// 坐标系原点位于底座旋转轴与安装面的交点：
/// `z` 轴竖直向上，偏航零位时臂平面落在 `-y` 方向。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// 左右坐标（毫米）
    pub x: f64,

    /// 前后坐标（毫米），偏航零位时为负
    pub y: f64,

    /// 高度坐标（毫米）
    pub z: f64,
}

impl Position {
    /// 创建位置值
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 针尖到底座旋转轴的水平距离（毫米）
    #[inline]
    pub fn radius(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2}) mm", self.x, self.y, self.z)
    }
}

/// 臂几何参数（运行期配置值）
///
/// `Default` 给出出厂尺寸。更换连杆或测针后以实际尺寸构造，
/// 解算路径不会对参数做任何截断或校验（校验属于上层配置装载）。
///
/// # 超过一圈的计数
///
/// 步进计数名义上落在 `[0, steps_per_revolution)`，多圈计数被原样接受：
/// 三角函数的周期性使 `steps` 与 `steps mod steps_per_revolution`
/// 解算出相同的位置。不截断、不告警。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ArmGeometry {
    /// 每圈步进数（四个关节共用同一编码器分辨率）
    pub steps_per_revolution: u16,

    /// 底座高度 L0（毫米）：安装面到第一俯仰轴
    pub base_height: f64,

    /// 第一连杆长度 L1（毫米）
    pub first_link_length: f64,

    /// 第二连杆长度 L2（毫米）
    pub second_link_length: f64,

    /// 针尖连杆长度 L3（毫米）：夹持座 + 测针
    pub needle_length: f64,
}

impl Default for ArmGeometry {
    fn default() -> Self {
        Self {
            steps_per_revolution: DEFAULT_STEPS_PER_REVOLUTION,
            base_height: DEFAULT_BASE_HEIGHT,
            first_link_length: DEFAULT_FIRST_LINK_LENGTH,
            second_link_length: DEFAULT_SECOND_LINK_LENGTH,
            needle_length: DEFAULT_NEEDLE_LENGTH,
        }
    }
}

impl ArmGeometry {
    /// 正运动学解算：步进计数 → 针尖位置
    ///
    /// 全函数，对任何计数输入都不产生错误。
    pub fn resolve(&self, sample: &AngleSample) -> Position {
        let ra = step_to_rad(sample.a, self.steps_per_revolution);
        let rb = step_to_rad(sample.b, self.steps_per_revolution);
        let rc = step_to_rad(sample.c, self.steps_per_revolution);
        let rd = step_to_rad(sample.d, self.steps_per_revolution);

        // 俯仰角沿连杆链累加
        let reach = rb.sin() * self.first_link_length
            + (rb + rc).sin() * self.second_link_length
            + (rb + rc + rd).sin() * self.needle_length;
        let height = rb.cos() * self.first_link_length
            + (rb + rc).cos() * self.second_link_length
            + (rb + rc + rd).cos() * self.needle_length
            + self.base_height;

        Position {
            x: reach * ra.sin(),
            y: -reach * ra.cos(),
            z: height,
        }
    }

    /// 连杆全长（毫米）：针尖可达距离的上界
    #[inline]
    pub fn total_link_length(&self) -> f64 {
        self.first_link_length + self.second_link_length + self.needle_length
    }
}
