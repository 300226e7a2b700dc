//! # Digitizer Stream Layer
//!
//! 字节流抽象层，提供统一的字节源接口。
//!
//! 数字化仪通过串口吐出连续的遥测字节流。端口的打开、波特率配置和
//! 重连策略由调用方负责；本层只抽象「阻塞读一段字节」这一件事，
//! 使上层驱动可以面向 [`ByteSource`] 编程：生产环境包装任意
//! `io::Read`（串口、TCP、文件回放），测试环境用脚本化的 mock 源。

use std::time::Duration;
use thiserror::Error;

pub mod read;

pub use read::ReadSource;

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "mock")]
pub use mock::MockSource;

/// 字节流层统一错误类型
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Read timeout")]
    Timeout,
    #[error("Stream disconnected")]
    Disconnected,
}

impl StreamError {
    /// 超时只是轮询周期内没有新字节，属于正常情况；
    /// 其余错误都意味着流已不可用。
    pub fn is_fatal(&self) -> bool {
        !matches!(self, StreamError::Timeout)
    }
}

/// 字节源统一接口
///
/// 约定：
/// - `recv` 成功时至少返回 1 个字节，`Ok(0)` 永不出现；
///   流结束用 [`StreamError::Disconnected`] 表示
/// - 周期内没有新字节返回 [`StreamError::Timeout`]，调用方据此继续轮询
pub trait ByteSource {
    /// 阻塞读取一段字节到 `buf`，返回实际读取的字节数
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, StreamError>;

    /// 设置读取超时（默认空操作，超时由底层端口配置时可不覆盖）
    fn set_receive_timeout(&mut self, _timeout: Duration) {}

    /// 带超时读取
    fn recv_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, StreamError> {
        self.set_receive_timeout(timeout);
        self.recv(buf)
    }

    /// 尝试读取：超时映射为 `Ok(None)`
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>, StreamError> {
        match self.recv_timeout(buf, Duration::ZERO) {
            Ok(n) => Ok(Some(n)),
            Err(StreamError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
