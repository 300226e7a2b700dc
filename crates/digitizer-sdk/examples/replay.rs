//! 离线回放示例
//!
//! 用脚本化字节源回放一段"录制"的遥测字节流，演示完整链路：
//! 帧解码、单字节重同步、正运动学解算、回调和指标。
//!
//! 运行：
//!
//! ```bash
//! cargo run -p digitizer-sdk --example replay
//! ```

use std::sync::Arc;
use std::time::Duration;

use digitizer_sdk::prelude::*;
use digitizer_sdk::stream::MockSource;

/// 把每帧遥测打印到终端的回调
struct PrintCallback;

impl TelemetryCallback for PrintCallback {
    fn on_sample(&self, sample: &AngleSample, position: &Position) {
        println!(
            "  步数 [{:>4} {:>4} {:>4} {:>4}] -> {}",
            sample.a, sample.b, sample.c, sample.d, position
        );
    }

    fn on_running_changed(&self, running: bool) {
        println!("  字节流运行状态: {}", running);
    }
}

fn main() -> Result<(), DriverError> {
    digitizer_sdk::init_tracing();

    println!("════════════════════════════════════════");
    println!("         数位臂遥测回放示例");
    println!("════════════════════════════════════════");
    println!();

    // 1. 构造一段"录制"的字节流：俯仰轴从 0 扫到 90°（150 步 = 1/4 圈）
    let mut source = MockSource::new();
    for steps in (0..=150).step_by(10) {
        source.push_chunk(AngleSample::new(0, steps, 0, 0).to_frame());
    }
    // 中间混入两个坏字节，演示单字节重同步
    source.push_chunk(vec![0xDE, 0xAD]);
    source.push_chunk(AngleSample::new(150, 150, 0, 0).to_frame());

    // 2. 构建驱动（默认出厂几何参数）
    let digitizer = DigitizerBuilder::new()
        .geometry(ArmGeometry::default())
        .build(source)?;

    // 3. 等待回放的字节流全部解码完成
    let snapshot = digitizer.wait_for_sample(Duration::from_secs(1))?;
    println!("📍 首帧解算完成 (seq={})", snapshot.seq);
    std::thread::sleep(Duration::from_millis(100));
    println!("📍 最终针尖位置: {}", digitizer.position());
    println!();

    // 4. 注册回调后，手动注入几个样本（与字节流走同一条解算路径）
    println!("💉 注入手动样本:");
    let hooks = digitizer.hooks();
    hooks
        .write()
        .map_err(|_| DriverError::PoisonedLock)?
        .add_callback(Arc::new(PrintCallback));

    digitizer.inject(0, 0, 0, 0)?;
    digitizer.inject(150, 150, 0, 0)?;
    digitizer.inject(300, 75, 75, 75)?;
    std::thread::sleep(Duration::from_millis(100));
    println!();

    // 5. 打印链路指标
    let metrics = digitizer.metrics();
    println!("📊 链路指标:");
    println!("  解码帧数:     {}", metrics.frames_decoded);
    println!("  定界错误:     {}", metrics.framing_errors);
    println!("  注入样本:     {}", metrics.injected_samples);
    println!("  流故障:       {}", metrics.stream_faults);
    println!("  定界错误率:   {:.2}%", metrics.framing_error_rate());

    Ok(())
}
