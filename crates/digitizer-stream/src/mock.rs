//! 脚本化字节源（测试用）
//!
//! 按脚本顺序吐出字节块或错误，用于驱动层单元测试和集成测试。
//! 通过 `mock` feature 启用，无任何硬件依赖。

use crate::{ByteSource, StreamError};
use std::collections::VecDeque;

/// 脚本化字节源
///
/// 每次 `recv` 取出脚本中的下一项：
/// - 字节块：拷贝进调用方缓冲区，一次装不下的部分退回队头
/// - 错误：原样返回
/// - 脚本耗尽：返回 [`StreamError::Timeout`]，模拟空闲的串口
///
/// # 使用示例
///
/// ```rust
/// use digitizer_stream::{ByteSource, StreamError, mock::MockSource};
///
/// let mut source = MockSource::new();
/// source.push_chunk([0x55, 0x00]);
/// source.push_error(StreamError::Disconnected);
///
/// let mut buf = [0u8; 16];
/// assert_eq!(source.recv(&mut buf).unwrap(), 2);
/// assert!(source.recv(&mut buf).is_err());
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    script: VecDeque<Result<Vec<u8>, StreamError>>,
}

impl MockSource {
    /// 创建空脚本源（表现为持续超时的空闲线路）
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
        }
    }

    /// 追加一个字节块
    pub fn push_chunk(&mut self, bytes: impl Into<Vec<u8>>) {
        self.script.push_back(Ok(bytes.into()));
    }

    /// 追加一个错误
    pub fn push_error(&mut self, error: StreamError) {
        self.script.push_back(Err(error));
    }

    /// 剩余脚本项数
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ByteSource for MockSource {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        match self.script.pop_front() {
            Some(Ok(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    // 放不下的部分退回队头，下次 recv 继续读
                    self.script.push_front(Ok(bytes[n..].to_vec()));
                }
                Ok(n)
            },
            Some(Err(e)) => Err(e),
            None => Err(StreamError::Timeout),
        }
    }
}
