//! Digitizer API 模块
//!
//! 提供对外的 `Digitizer` 结构体，封装底层 IO 线程和状态同步细节。

use std::mem::ManuallyDrop;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{JoinHandle, spawn};
use std::time::Duration;

use crossbeam_channel::Sender;
use digitizer_kinematics::{ArmGeometry, Position};
use digitizer_protocol::AngleSample;
use digitizer_stream::ByteSource;
use tracing::error;

use crate::config::validate_geometry;
use crate::error::DriverError;
use crate::hooks::HookManager;
use crate::metrics::{MetricsSnapshot, TelemetryMetrics};
use crate::pipeline::{PipelineConfig, io_loop};
use crate::state::{DigitizerContext, TelemetrySnapshot};

/// Extension trait for timeout-capable thread joins
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: std::marker::Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        use std::sync::mpsc;

        // Create a channel for signaling completion
        let (tx, rx) = mpsc::channel();

        // Spawn a watchdog thread that joins the target thread
        spawn(move || {
            let result = self.join();
            // Send result (ignore send errors - receiver may have timed out)
            let _ = tx.send(result);
        });

        // Block with timeout - no busy waiting!
        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()), // Thread finished
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // Timeout: watchdog thread continues running
                // This is acceptable - OS will clean up on process exit
                Err(std::boxed::Box::new(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "Thread join timeout",
                )))
            },
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                // Channel disconnected unexpectedly - thread panicked
                Err(std::boxed::Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "Thread panicked during join",
                )))
            },
        }
    }
}

/// 数位臂遥测驱动（对外 API）
///
/// 持有后台 IO 线程：线程独占字节源和解码器，
/// 调用方通过无锁快照读取状态、通过注入通道送入手动样本。
pub struct Digitizer {
    /// 样本注入通道（向 IO 线程发送手动样本）
    ///
    /// 需要在 Drop 时 **提前关闭通道**（在 join IO 线程之前），
    /// 否则 `io_loop` 可能永远收不到 `Disconnected` 而导致退出卡住。
    inject_tx: ManuallyDrop<Sender<AngleSample>>,
    /// 共享状态上下文
    ctx: Arc<DigitizerContext>,
    /// IO 线程句柄（Drop 时 join）
    io_thread: Option<JoinHandle<()>>,
    /// 运行标志（字节流致命故障时由 IO 线程清除）
    is_running: Arc<AtomicBool>,
    /// 性能指标（原子计数器）
    metrics: Arc<TelemetryMetrics>,
    /// 机械臂几何参数（构造后不可变，IO 线程持有同一份拷贝）
    geometry: ArmGeometry,
}

impl std::fmt::Debug for Digitizer {
    // 手写实现：`ctx` 内含 trait 对象回调，无法派生
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Digitizer")
            .field("geometry", &self.geometry)
            .field("is_running", &self.is_running)
            .finish_non_exhaustive()
    }
}

impl Digitizer {
    /// 创建新的 Digitizer 实例
    ///
    /// # 参数
    /// - `source`: 字节源（会被移动到 IO 线程）
    /// - `geometry`: 机械臂几何参数
    /// - `config`: Pipeline 配置（可选）
    ///
    /// # 错误
    /// - `DriverError::InvalidConfig`: 几何参数不合法（如 `steps_per_revolution == 0`）
    pub fn new(
        source: impl ByteSource + Send + 'static,
        geometry: ArmGeometry,
        config: Option<PipelineConfig>,
    ) -> Result<Self, DriverError> {
        validate_geometry(&geometry)?;

        // 创建注入通道（有界队列，容量 10）
        let (inject_tx, inject_rx) = crossbeam_channel::bounded(10);

        // 创建共享状态上下文、运行标志和指标
        let ctx = Arc::new(DigitizerContext::new());
        let is_running = Arc::new(AtomicBool::new(true));
        let metrics = Arc::new(TelemetryMetrics::new());

        // 克隆用于 IO 线程
        let ctx_clone = ctx.clone();
        let is_running_clone = is_running.clone();
        let metrics_clone = metrics.clone();

        // 启动 IO 线程
        let io_thread = spawn(move || {
            io_loop(
                source,
                inject_rx,
                ctx_clone,
                config.unwrap_or_default(),
                geometry,
                is_running_clone,
                metrics_clone,
            );
        });

        Ok(Self {
            inject_tx: ManuallyDrop::new(inject_tx),
            ctx,
            io_thread: Some(io_thread),
            is_running,
            metrics,
            geometry,
        })
    }

    /// 获取最新遥测快照（无锁读取）
    ///
    /// 快照是整帧原子替换的：步数和坐标一定来自同一帧。
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.ctx.telemetry.load().as_ref().clone()
    }

    /// 获取最新的原始步数样本
    pub fn angles(&self) -> AngleSample {
        self.telemetry().sample
    }

    /// 获取最新的针尖坐标（毫米）
    pub fn position(&self) -> Position {
        self.telemetry().position
    }

    /// 获取机械臂几何参数
    pub fn geometry(&self) -> ArmGeometry {
        self.geometry
    }

    /// 字节流是否仍在解码
    ///
    /// 致命流故障后永久变为 `false`（注入通道不受影响）。
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    /// 获取链路指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 注入一个手动样本（非阻塞）
    ///
    /// 四个步数计数绕过帧解码器，直接进入与字节流相同的解算与通知路径。
    ///
    /// # 错误
    /// - `DriverError::ChannelClosed`: 注入通道已关闭（IO 线程退出）
    /// - `DriverError::ChannelFull`: 注入队列已满（缓冲区容量 10）
    pub fn inject(&self, a: u16, b: u16, c: u16, d: u16) -> Result<(), DriverError> {
        self.inject_sample(AngleSample::new(a, b, c, d))
    }

    /// 注入一个已构造的样本（非阻塞）
    ///
    /// # 错误
    /// - `DriverError::ChannelClosed`: 注入通道已关闭（IO 线程退出）
    /// - `DriverError::ChannelFull`: 注入队列已满（缓冲区容量 10）
    pub fn inject_sample(&self, sample: AngleSample) -> Result<(), DriverError> {
        self.inject_tx.try_send(sample).map_err(|e| match e {
            crossbeam_channel::TrySendError::Full(_) => DriverError::ChannelFull,
            crossbeam_channel::TrySendError::Disconnected(_) => DriverError::ChannelClosed,
        })
    }

    /// 注入一个样本（阻塞，带超时）
    ///
    /// 队列满时最多等待 `timeout`，适合离线回放等允许背压的场景。
    ///
    /// # 错误
    /// - `DriverError::Timeout`: 等待超时，队列仍满
    /// - `DriverError::ChannelClosed`: 注入通道已关闭（IO 线程退出）
    pub fn inject_blocking(
        &self,
        sample: AngleSample,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        self.inject_tx
            .send_timeout(sample, timeout)
            .map_err(|e| match e {
                crossbeam_channel::SendTimeoutError::Timeout(_) => DriverError::Timeout,
                crossbeam_channel::SendTimeoutError::Disconnected(_) => DriverError::ChannelClosed,
            })
    }

    /// 等待收到第一个样本（用于初始化）
    ///
    /// 在 `Digitizer::new()` 后调用，确保读取方不会拿到全零的初始快照。
    ///
    /// # 参数
    /// - `timeout`: 超时时间
    ///
    /// # 返回值
    /// - `Ok(snapshot)`: 已收到样本（`seq > 0`）
    /// - `Err(DriverError::Timeout)`: 超时仍未收到样本
    pub fn wait_for_sample(&self, timeout: Duration) -> Result<TelemetrySnapshot, DriverError> {
        let start = std::time::Instant::now();

        loop {
            // 检查是否超时
            if start.elapsed() >= timeout {
                return Err(DriverError::Timeout);
            }

            // 检查是否收到样本
            let snapshot = self.telemetry();
            if snapshot.has_sample() {
                return Ok(snapshot);
            }

            // 短暂休眠，避免 CPU 空转
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// 获取钩子管理器的引用
    ///
    /// 用于注册遥测回调（每帧触发）和运行状态回调（故障触发）。
    ///
    /// # 示例
    ///
    /// ```rust,no_run
    /// # use digitizer_driver::{Digitizer, TelemetryCallback};
    /// # use digitizer_kinematics::Position;
    /// # use digitizer_protocol::AngleSample;
    /// # use std::sync::Arc;
    /// # struct Logger;
    /// # impl TelemetryCallback for Logger {
    /// #     fn on_sample(&self, _sample: &AngleSample, position: &Position) {
    /// #         println!("{}", position);
    /// #     }
    /// # }
    /// # fn example(digitizer: &Digitizer) {
    /// let hooks = digitizer.hooks();
    /// if let Ok(mut hooks_guard) = hooks.write() {
    ///     hooks_guard.add_callback(Arc::new(Logger));
    /// }
    /// # }
    /// ```
    ///
    /// # 安全注意事项
    ///
    /// - 回调在 IO 线程上同步执行，必须尽快返回
    /// - 返回 `Arc<RwLock<HookManager>>`，需手动加锁
    pub fn hooks(&self) -> Arc<std::sync::RwLock<HookManager>> {
        Arc::clone(&self.ctx.hooks)
    }
}

impl Drop for Digitizer {
    fn drop(&mut self) {
        // 设置运行标志为 false
        // 使用 Release 确保所有之前的写入对其他线程可见
        self.is_running.store(false, Ordering::Release);

        // 关闭注入通道（通知 IO 线程退出）
        // 关键：必须在 join 线程之前真正 drop 掉 Sender，否则接收端不会 Disconnected。
        unsafe {
            ManuallyDrop::drop(&mut self.inject_tx);
        }

        let join_timeout = Duration::from_secs(2);

        // 等待 IO 线程退出（使用 join_timeout 替代 polling）
        if let Some(handle) = self.io_thread.take()
            && let Err(_e) = handle.join_timeout(join_timeout)
        {
            error!(
                "IO thread panicked or failed to shut down within {:?}",
                join_timeout
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digitizer_stream::StreamError;

    // 简单的 Mock 字节源，永远超时（模拟静默的采集线）
    struct IdleSource;

    impl ByteSource for IdleSource {
        fn recv(&mut self, _buf: &mut [u8]) -> Result<usize, StreamError> {
            Err(StreamError::Timeout)
        }
    }

    // 吐出一帧后断开的字节源
    struct OneShotSource {
        frame: Option<Vec<u8>>,
    }

    impl ByteSource for OneShotSource {
        fn recv(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
            match self.frame.take() {
                Some(frame) => {
                    buf[..frame.len()].copy_from_slice(&frame);
                    Ok(frame.len())
                },
                None => Err(StreamError::Disconnected),
            }
        }
    }

    #[test]
    fn test_digitizer_new() {
        let digitizer = Digitizer::new(IdleSource, ArmGeometry::default(), None).unwrap();

        // 验证默认快照（尚未收到样本）
        let snapshot = digitizer.telemetry();
        assert_eq!(snapshot.seq, 0);
        assert_eq!(snapshot.timestamp_us, 0);
        assert!(!snapshot.has_sample());

        // 验证注入通道正常工作
        assert!(digitizer.inject(0, 0, 0, 0).is_ok());
        assert!(digitizer.is_running());
    }

    #[test]
    fn test_digitizer_drop() {
        let digitizer = Digitizer::new(IdleSource, ArmGeometry::default(), None).unwrap();
        // drop 应该能够正常退出，IO 线程被 join
        drop(digitizer);
    }

    #[test]
    fn test_digitizer_rejects_invalid_geometry() {
        let geometry = ArmGeometry {
            steps_per_revolution: 0,
            ..ArmGeometry::default()
        };
        let err = Digitizer::new(IdleSource, geometry, None).unwrap_err();
        assert!(matches!(err, DriverError::InvalidConfig(_)));
    }

    #[test]
    fn test_digitizer_inject_updates_snapshot() {
        let digitizer = Digitizer::new(IdleSource, ArmGeometry::default(), None).unwrap();

        digitizer.inject(150, 0, 0, 0).unwrap();
        let snapshot = digitizer.wait_for_sample(Duration::from_millis(500)).unwrap();

        assert!(snapshot.seq >= 1);
        assert!(snapshot.timestamp_us > 0);
        assert_eq!(snapshot.sample, AngleSample::new(150, 0, 0, 0));
        assert_eq!(
            snapshot.position,
            ArmGeometry::default().resolve(&AngleSample::new(150, 0, 0, 0))
        );

        // 访问器与快照一致
        assert_eq!(digitizer.angles(), snapshot.sample);
        assert_eq!(digitizer.position(), snapshot.position);
        assert_eq!(digitizer.metrics().injected_samples, 1);
    }

    #[test]
    fn test_digitizer_wait_for_sample_timeout() {
        let digitizer = Digitizer::new(IdleSource, ArmGeometry::default(), None).unwrap();

        let err = digitizer
            .wait_for_sample(Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, DriverError::Timeout));
    }

    #[test]
    fn test_digitizer_stream_fault_keeps_injection_alive() {
        let sample = AngleSample::new(1, 2, 3, 4);
        let source = OneShotSource {
            frame: Some(sample.to_frame().to_vec()),
        };
        let digitizer = Digitizer::new(source, ArmGeometry::default(), None).unwrap();

        // 第一帧来自字节流
        let snapshot = digitizer.wait_for_sample(Duration::from_millis(500)).unwrap();
        assert_eq!(snapshot.sample, sample);

        // 故障已经发生（源在吐出一帧后断开）
        let start = std::time::Instant::now();
        while digitizer.is_running() && start.elapsed() < Duration::from_secs(2) {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(!digitizer.is_running());
        assert_eq!(digitizer.metrics().stream_faults, 1);

        // 注入通道不受流故障影响
        digitizer.inject(500, 0, 0, 0).unwrap();
        let start = std::time::Instant::now();
        while digitizer.telemetry().seq < 2 && start.elapsed() < Duration::from_secs(2) {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(digitizer.angles(), AngleSample::new(500, 0, 0, 0));
    }

    #[test]
    fn test_digitizer_geometry_accessor() {
        let geometry = ArmGeometry {
            steps_per_revolution: 400,
            ..ArmGeometry::default()
        };
        let digitizer = Digitizer::new(IdleSource, geometry, None).unwrap();
        assert_eq!(digitizer.geometry().steps_per_revolution, 400);
    }

    #[test]
    fn test_digitizer_hooks_accessor() {
        let digitizer = Digitizer::new(IdleSource, ArmGeometry::default(), None).unwrap();
        let hooks = digitizer.hooks();
        assert!(hooks.read().unwrap().is_empty());
    }
}
