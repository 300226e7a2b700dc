//! Pipeline IO 循环模块
//!
//! 负责后台 IO 线程的字节接收、帧解码、正运动学解算和状态发布逻辑。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crossbeam_channel::Receiver;
use digitizer_kinematics::ArmGeometry;
use digitizer_protocol::{AngleSample, FrameDecoder};
use digitizer_stream::{ByteSource, StreamError};
use tracing::{error, trace, warn};

use crate::metrics::TelemetryMetrics;
use crate::state::{DigitizerContext, TelemetrySnapshot};

/// Pipeline 配置
///
/// 控制 IO 线程的行为，包括接收超时和单次读取的块大小。
///
/// # Example
///
/// ```
/// use digitizer_driver::PipelineConfig;
///
/// // 使用默认配置（2ms 接收超时，256 字节读块）
/// let config = PipelineConfig::default();
///
/// // 自定义配置
/// let config = PipelineConfig {
///     receive_timeout_ms: 5,
///     read_chunk_size: 64,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// 字节流接收超时（毫秒）
    ///
    /// 超时越短，注入通道的响应越快；超时本身不是错误。
    pub receive_timeout_ms: u64,
    /// 单次读取的最大字节数
    /// 帧长只有 10 字节，256 足以覆盖积压的整批帧
    pub read_chunk_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            receive_timeout_ms: 2,
            read_chunk_size: 256,
        }
    }
}

/// IO 线程循环
///
/// 单线程独占字节源、解码器和几何参数，所有状态更新都从这里发出：
/// 字节流解码的帧和手动注入的样本走同一条解算与通知路径。
///
/// 字节流出现致命错误后不再轮询字节源，但注入通道继续服务，
/// 直到发送端全部释放（句柄 Drop）才退出循环。
///
/// # 参数
/// - `source`: 字节源（循环内独占）
/// - `inject_rx`: 样本注入通道（从调用方线程接收手动样本）
/// - `ctx`: 共享状态上下文
/// - `config`: Pipeline 配置
/// - `geometry`: 机械臂几何参数（构造后不可变）
/// - `is_running`: 运行标志（致命故障时清除，不再置位）
/// - `metrics`: 链路指标计数器
pub fn io_loop(
    mut source: impl ByteSource,
    inject_rx: Receiver<AngleSample>,
    ctx: Arc<DigitizerContext>,
    config: PipelineConfig,
    geometry: ArmGeometry,
    is_running: Arc<AtomicBool>,
    metrics: Arc<TelemetryMetrics>,
) {
    let receive_timeout = Duration::from_millis(config.receive_timeout_ms);
    let mut decoder = FrameDecoder::new();
    let mut read_buf = vec![0u8; config.read_chunk_size.max(1)];
    let mut seq: u64 = 0;
    // 字节流致命故障后翻为 false，只剩注入通道在服务
    let mut source_alive = true;

    loop {
        // ============================================================
        // 1. 先清一波注入通道（手动样本与字节流共用同一条解算路径）
        // ============================================================
        if drain_injection_queue(&inject_rx, &ctx, &geometry, &mut seq, &metrics) {
            // 注入通道断开（句柄已释放），退出循环
            break;
        }

        if !source_alive {
            // 字节流已故障：阻塞等待注入样本，断开即退出
            match inject_rx.recv() {
                Ok(sample) => {
                    metrics.injected_samples.fetch_add(1, Ordering::Relaxed);
                    resolve_and_publish(&sample, &ctx, &geometry, &mut seq);
                },
                Err(_) => break,
            }
            continue;
        }

        // ============================================================
        // 2. 读取一段字节（带超时，避免饿死注入通道）
        // ============================================================
        let n = match source.recv_timeout(&mut read_buf, receive_timeout) {
            Ok(n) => n,
            Err(StreamError::Timeout) => {
                // 超时是正常情况（上游暂时没有数据）
                continue;
            },
            Err(e) => {
                // 致命故障：记录一次，永久清除运行标志，停止解码
                error!("Stream fault, stream decoding stopped: {}", e);
                metrics.stream_faults.fetch_add(1, Ordering::Relaxed);
                is_running.store(false, Ordering::Release);
                match ctx.hooks.read() {
                    Ok(hooks) => hooks.trigger_running_changed(false),
                    Err(_) => error!("Hook lock poisoned, skipping running-state notification"),
                }
                source_alive = false;
                continue;
            },
        };

        // ============================================================
        // 3. 喂入解码器，循环取出所有已缓冲的完整帧
        // ============================================================
        decoder.feed(&read_buf[..n]);
        while let Some(result) = decoder.try_decode() {
            match result {
                Ok(sample) => {
                    metrics.frames_decoded.fetch_add(1, Ordering::Relaxed);
                    trace!(
                        a = sample.a,
                        b = sample.b,
                        c = sample.c,
                        d = sample.d,
                        "Frame decoded"
                    );
                    resolve_and_publish(&sample, &ctx, &geometry, &mut seq);
                },
                Err(e) => {
                    // 失去帧对齐：解码器已丢弃一个字节重新扫描，流继续
                    metrics.framing_errors.fetch_add(1, Ordering::Relaxed);
                    warn!("Framing error, resynchronizing: {}", e);
                },
            }
        }
    }

    trace!("IO thread: loop exited");
}

/// 清空注入队列（非阻塞）
///
/// 返回 `true` 表示通道已断开（所有发送端释放），IO 线程应当退出。
fn drain_injection_queue(
    inject_rx: &Receiver<AngleSample>,
    ctx: &Arc<DigitizerContext>,
    geometry: &ArmGeometry,
    seq: &mut u64,
    metrics: &Arc<TelemetryMetrics>,
) -> bool {
    // 限制单次 drain 的最大样本数，避免注入方持续灌入时饿死字节流
    const MAX_DRAIN_PER_CYCLE: usize = 32;

    for _ in 0..MAX_DRAIN_PER_CYCLE {
        match inject_rx.try_recv() {
            Ok(sample) => {
                metrics.injected_samples.fetch_add(1, Ordering::Relaxed);
                resolve_and_publish(&sample, ctx, geometry, seq);
            },
            Err(crossbeam_channel::TryRecvError::Empty) => break, // 队列为空
            Err(crossbeam_channel::TryRecvError::Disconnected) => return true, // 通道断开
        }
    }

    false
}

/// 解算一个样本并发布快照、触发回调
///
/// 顺序是固定的：先整帧替换快照，再按注册顺序触发回调。
/// 回调里读取 `ctx.telemetry` 一定能看到本帧。
fn resolve_and_publish(
    sample: &AngleSample,
    ctx: &Arc<DigitizerContext>,
    geometry: &ArmGeometry,
    seq: &mut u64,
) {
    let position = geometry.resolve(sample);
    *seq += 1;

    let snapshot = TelemetrySnapshot {
        seq: *seq,
        timestamp_us: system_timestamp_us(),
        sample: *sample,
        position,
    };
    ctx.telemetry.store(Arc::new(snapshot));
    trace!(
        seq = snapshot.seq,
        x = position.x,
        y = position.y,
        z = position.z,
        "Telemetry snapshot committed"
    );

    match ctx.hooks.read() {
        Ok(hooks) => hooks.trigger_sample(sample, &position),
        Err(_) => error!("Hook lock poisoned, skipping sample notification"),
    }
}

/// 当前系统时间（UNIX 微秒）
///
/// 时钟早于 UNIX 纪元时返回 0（与"尚未收到样本"共用哨兵值，此时以 `seq` 为准）。
fn system_timestamp_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
