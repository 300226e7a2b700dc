//! 钩子系统（Hook System）
//!
//! 本模块提供运行时钩子（Hook）管理功能，用于在每帧遥测解算完成后触发自定义回调。
//!
//! # 设计原则
//!
//! - **同步触发**: 回调在 IO 线程上按注册顺序依次执行，回调返回前不会解算下一帧
//! - **非阻塞实现**: 回调实现必须尽快返回，耗时处理请通过 Channel 转交其他线程
//! - **职责分离**: HookManager 管理运行时回调，PipelineConfig 保持为 POD 数据
//!
//! # 使用示例
//!
//! ```rust
//! use digitizer_driver::hooks::{HookManager, TelemetryCallback};
//! use digitizer_kinematics::Position;
//! use digitizer_protocol::AngleSample;
//! use crossbeam_channel::{Sender, bounded};
//!
//! struct ChannelCallback {
//!     sender: Sender<(AngleSample, Position)>,
//! }
//!
//! impl TelemetryCallback for ChannelCallback {
//!     fn on_sample(&self, sample: &AngleSample, position: &Position) {
//!         // ✅ 使用 try_send，非阻塞
//!         let _ = self.sender.try_send((*sample, *position));
//!     }
//! }
//!
//! let mut hooks = HookManager::new();
//! let (sender, _rx) = bounded(10);
//! hooks.add_callback(std::sync::Arc::new(ChannelCallback { sender }));
//!
//! // 触发所有回调（在 io_loop 中）
//! let sample = AngleSample::new(150, 0, 0, 0);
//! let position = Position::new(0.0, 0.0, 667.0);
//! hooks.trigger_sample(&sample, &position);
//! ```

use std::sync::Arc;

use digitizer_kinematics::Position;
use digitizer_protocol::AngleSample;

/// 遥测回调 Trait
///
/// 定义遥测事件回调接口，用于在每帧解算完成或运行状态翻转时执行自定义逻辑。
///
/// # 性能要求
///
/// - **尽快返回**: 回调在 IO 线程上同步执行，阻塞会直接推迟下一帧的解算
/// - **Channel 模式**: 推荐使用 `crossbeam_channel::Sender::try_send` 异步转交
pub trait TelemetryCallback: Send + Sync {
    /// 每帧解算完成后调用
    ///
    /// 快照已先于回调发布，回调内读取 `Digitizer::telemetry()` 一定能看到本帧。
    ///
    /// # 参数
    ///
    /// - `sample`: 本帧的原始步数
    /// - `position`: 本帧解算出的针尖坐标（毫米）
    fn on_sample(&self, sample: &AngleSample, position: &Position);

    /// 运行状态翻转时调用（可选）
    ///
    /// # 时机
    ///
    /// 字节流出现致命故障、IO 线程停止解码时触发一次 `running = false`。
    /// 同一句柄生命周期内不会重复触发同一状态。
    ///
    /// # 默认实现
    ///
    /// 默认为空操作，仅需在关心连接状态时实现。
    fn on_running_changed(&self, running: bool) {
        let _ = running;
        // 默认：不处理运行状态
    }
}

/// 钩子管理器
///
/// 专门管理运行时回调列表。
///
/// # 线程安全
///
/// 使用 `std::sync::Arc` 确保回调可以跨线程共享。
/// 回调列表本身不是线程安全的，需要外部同步（通常通过 `RwLock<HookManager>`）。
///
/// # 触发顺序
///
/// `trigger_sample` / `trigger_running_changed` 按回调的注册顺序依次调用。
#[derive(Default)]
pub struct HookManager {
    /// 回调列表
    callbacks: Vec<Arc<dyn TelemetryCallback>>,
}

impl HookManager {
    /// 创建新的钩子管理器
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// 添加回调
    ///
    /// # 线程安全
    ///
    /// 此方法不是线程安全的，需要外部同步（通常通过 `RwLock`）。
    pub fn add_callback(&mut self, callback: Arc<dyn TelemetryCallback>) {
        self.callbacks.push(callback);
    }

    /// 移除所有回调
    ///
    /// # 用途
    ///
    /// 主要用于测试或清理场景。
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 触发所有样本回调（在 io_loop 中每帧调用）
    ///
    /// # 参数
    ///
    /// - `sample`: 本帧的原始步数
    /// - `position`: 本帧解算出的针尖坐标
    pub fn trigger_sample(&self, sample: &AngleSample, position: &Position) {
        for callback in self.callbacks.iter() {
            callback.on_sample(sample, position);
        }
    }

    /// 触发所有运行状态回调（运行标志翻转时调用）
    ///
    /// # 参数
    ///
    /// - `running`: 翻转后的运行状态
    pub fn trigger_running_changed(&self, running: bool) {
        for callback in self.callbacks.iter() {
            callback.on_running_changed(running);
        }
    }

    /// 获取回调数量
    ///
    /// # 用途
    ///
    /// 主要用于调试和监控。
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// 检查是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
