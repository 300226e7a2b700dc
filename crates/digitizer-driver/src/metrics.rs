//! 驱动层性能指标模块
//!
//! 提供零开销的原子计数器，用于监控解码链路的健康状态。
//! 所有计数器都使用原子操作，可以在任何线程安全地读取，不会引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 遥测链路实时指标
///
/// 用于监控解码链路的健康状态。所有计数器都使用原子操作，
/// 可以在任何线程安全地读取，不会引入锁竞争。
///
/// # 使用示例
///
/// ```rust
/// use digitizer_driver::TelemetryMetrics;
/// use std::sync::Arc;
/// use std::sync::atomic::Ordering;
///
/// let metrics = Arc::new(TelemetryMetrics::default());
///
/// // 在 IO 线程中更新指标
/// metrics.frames_decoded.fetch_add(1, Ordering::Relaxed);
///
/// // 在主线程中读取快照
/// let snapshot = metrics.snapshot();
/// println!("Frames decoded: {}", snapshot.frames_decoded);
/// ```
#[derive(Debug, Default)]
pub struct TelemetryMetrics {
    /// 成功解码并发布的帧数
    pub frames_decoded: AtomicU64,

    /// 帧定界错误次数（前导/结尾字节不符，触发单字节重同步）
    ///
    /// 如果这个值持续增长，说明字节流经常失去对齐，
    /// 可能是波特率不匹配或线缆干扰。
    pub framing_errors: AtomicU64,

    /// 手动注入的样本数（绕过解码器直接进入解算路径）
    pub injected_samples: AtomicU64,

    /// 字节流致命故障次数（IO 错误或断开，同一句柄最多记 1 次）
    pub stream_faults: AtomicU64,
}

impl TelemetryMetrics {
    /// 创建新的指标实例（所有计数器初始化为 0）
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取人类可读的指标快照
    ///
    /// 返回一个包含所有计数器当前值的快照结构。
    /// 快照是原子读取的，保证一致性（虽然不同计数器之间可能有微小的时间差）。
    ///
    /// # 性能
    ///
    /// 使用 `Ordering::Relaxed`，性能最优，适合监控场景。
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            injected_samples: self.injected_samples.load(Ordering::Relaxed),
            stream_faults: self.stream_faults.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器（用于性能测试）
    ///
    /// 将所有计数器重置为 0。使用 `Ordering::Relaxed`，性能最优。
    pub fn reset(&self) {
        self.frames_decoded.store(0, Ordering::Relaxed);
        self.framing_errors.store(0, Ordering::Relaxed);
        self.injected_samples.store(0, Ordering::Relaxed);
        self.stream_faults.store(0, Ordering::Relaxed);
    }
}

/// 指标快照（不可变，用于读取）
///
/// 包含所有计数器的当前值，用于一次性读取所有指标，避免多次原子操作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// 成功解码并发布的帧数
    pub frames_decoded: u64,
    /// 帧定界错误次数
    pub framing_errors: u64,
    /// 手动注入的样本数
    pub injected_samples: u64,
    /// 字节流致命故障次数
    pub stream_faults: u64,
}

impl MetricsSnapshot {
    /// 发布的样本总数（解码帧 + 注入样本）
    pub fn samples_total(&self) -> u64 {
        self.frames_decoded + self.injected_samples
    }

    /// 计算帧定界错误率（百分比）
    ///
    /// 以解码尝试总数（成功帧 + 定界错误）为分母，
    /// 返回 0.0 到 100.0 之间的值。如果分母为 0，返回 0.0。
    pub fn framing_error_rate(&self) -> f64 {
        let attempts = self.frames_decoded + self.framing_errors;
        if attempts == 0 {
            return 0.0;
        }
        (self.framing_errors as f64 / attempts as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_metrics_default() {
        let metrics = TelemetryMetrics::new();
        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.frames_decoded, 0);
        assert_eq!(snapshot.framing_errors, 0);
        assert_eq!(snapshot.injected_samples, 0);
        assert_eq!(snapshot.stream_faults, 0);
    }

    #[test]
    fn test_metrics_increment() {
        let metrics = Arc::new(TelemetryMetrics::new());

        metrics.frames_decoded.fetch_add(10, Ordering::Relaxed);
        metrics.framing_errors.fetch_add(2, Ordering::Relaxed);
        metrics.injected_samples.fetch_add(3, Ordering::Relaxed);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_decoded, 10);
        assert_eq!(snapshot.framing_errors, 2);
        assert_eq!(snapshot.injected_samples, 3);
        assert_eq!(snapshot.samples_total(), 13);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = Arc::new(TelemetryMetrics::new());

        metrics.frames_decoded.fetch_add(100, Ordering::Relaxed);
        metrics.stream_faults.fetch_add(1, Ordering::Relaxed);

        let snapshot_before = metrics.snapshot();
        assert_eq!(snapshot_before.frames_decoded, 100);
        assert_eq!(snapshot_before.stream_faults, 1);

        metrics.reset();

        let snapshot_after = metrics.snapshot();
        assert_eq!(snapshot_after.frames_decoded, 0);
        assert_eq!(snapshot_after.stream_faults, 0);
    }

    #[test]
    fn test_metrics_concurrent_updates() {
        let metrics = Arc::new(TelemetryMetrics::new());
        let mut handles = vec![];

        // 启动 10 个线程，每个线程增加 100 次
        for _ in 0..10 {
            let m = metrics.clone();
            let handle = thread::spawn(move || {
                for _ in 0..100 {
                    m.frames_decoded.fetch_add(1, Ordering::Relaxed);
                }
            });
            handles.push(handle);
        }

        // 等待所有线程完成
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_decoded, 1000);
    }

    #[test]
    fn test_metrics_framing_error_rate() {
        let snapshot = MetricsSnapshot {
            frames_decoded: 80,
            framing_errors: 20,
            injected_samples: 0,
            stream_faults: 0,
        };

        assert_eq!(snapshot.framing_error_rate(), 20.0);
    }

    #[test]
    fn test_metrics_framing_error_rate_zero_total() {
        let snapshot = MetricsSnapshot {
            frames_decoded: 0,
            framing_errors: 0,
            injected_samples: 0,
            stream_faults: 0,
        };

        assert_eq!(snapshot.framing_error_rate(), 0.0);
        assert_eq!(snapshot.samples_total(), 0);
    }
}
