//! 面向 `io::Read` 的字节源适配器
//!
//! 串口 crate（以及 TCP、文件回放）都暴露 `io::Read`。
//! 读超时在打开底层端口时配置（例如串口的 read timeout），
//! 到期表现为 `TimedOut`/`WouldBlock`，这里统一映射为
//! [`StreamError::Timeout`]。

use crate::{ByteSource, StreamError};
use std::io;
use tracing::trace;

/// 包装任意 `io::Read` 的字节源
///
/// # 示例
///
/// ```no_run
/// use digitizer_stream::{ByteSource, ReadSource};
/// use std::fs::File;
///
/// let file = File::open("telemetry.bin").unwrap();
/// let mut source = ReadSource::new(file);
///
/// let mut buf = [0u8; 256];
/// let n = source.recv(&mut buf).unwrap();
/// ```
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R: io::Read> ReadSource<R> {
    /// 包装一个已配置好超时的读取端
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// 取回底层读取端
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: io::Read> ByteSource for ReadSource<R> {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        loop {
            match self.inner.read(buf) {
                // io::Read 约定 Ok(0) 表示流结束
                Ok(0) => {
                    trace!("Underlying reader returned EOF, reporting disconnect");
                    return Err(StreamError::Disconnected);
                },
                Ok(n) => return Ok(n),
                Err(e) => match e.kind() {
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                        return Err(StreamError::Timeout);
                    },
                    io::ErrorKind::Interrupted => continue,
                    _ => return Err(StreamError::Io(e)),
                },
            }
        }
    }
}
