//! 驱动层状态结构定义

use std::sync::{Arc, RwLock};

use arc_swap::ArcSwap;
use digitizer_kinematics::Position;
use digitizer_protocol::AngleSample;

use crate::hooks::HookManager;

/// 遥测快照（最新一帧的完整解算结果）
///
/// 更新机制：IO 线程每解算一帧后整体替换（ArcSwap），
/// 读取方拿到的永远是同一帧的步数和坐标，不会出现半更新。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    /// 单调递增的帧序号（0 表示尚未收到任何样本）
    pub seq: u64,

    /// 系统时间戳（微秒，UNIX 时间）
    ///
    /// **注意**：0 表示尚未收到任何样本。与 `seq` 一起用于新鲜度判断。
    pub timestamp_us: u64,

    /// 原始步数样本（四轴编码器计数）
    pub sample: AngleSample,

    /// 正运动学解算出的针尖坐标（毫米）
    pub position: Position,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            seq: 0,
            timestamp_us: 0,
            sample: AngleSample::new(0, 0, 0, 0),
            position: Position::new(0.0, 0.0, 0.0),
        }
    }
}

impl TelemetrySnapshot {
    /// 是否已包含至少一帧真实数据
    #[inline]
    #[must_use]
    pub fn has_sample(&self) -> bool {
        self.seq > 0
    }
}

/// 数位臂上下文（IO 线程与调用方共享的状态聚合）
pub struct DigitizerContext {
    // === 热数据（每帧更新）===
    // 使用 ArcSwap，无锁读取，适合高频轮询
    /// 最新遥测快照（步数 + 坐标，整帧原子替换）
    pub telemetry: Arc<ArcSwap<TelemetrySnapshot>>,

    // === 回调（注册后只读遍历）===
    // 使用 RwLock，注册是低频写，触发是每帧读
    /// 遥测回调管理器
    pub hooks: Arc<RwLock<HookManager>>,
}

impl DigitizerContext {
    /// 创建新的上下文
    ///
    /// # Example
    ///
    /// ```
    /// use digitizer_driver::DigitizerContext;
    ///
    /// let ctx = DigitizerContext::new();
    /// let snapshot = ctx.telemetry.load();
    /// assert_eq!(snapshot.seq, 0);
    /// ```
    pub fn new() -> Self {
        Self {
            telemetry: Arc::new(ArcSwap::from_pointee(TelemetrySnapshot::default())),
            hooks: Arc::new(RwLock::new(HookManager::new())),
        }
    }
}

impl Default for DigitizerContext {
    fn default() -> Self {
        Self::new()
    }
}
