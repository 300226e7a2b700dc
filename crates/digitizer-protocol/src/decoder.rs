//! 累积式帧解码器
//!
//! 把无界、可能任意分片的字节流还原为帧序列。
//!
//! # 设计目的
//!
//! 串口到达的字节不保证按帧边界分片：一次读取可能包含半帧、整帧或多帧。
//! `FrameDecoder` 内部维护累积缓冲区，调用方只管喂入字节并循环取帧，
//! 不足一帧的字节留在缓冲区等待下一次喂入。
//!
//! # 重同步策略
//!
//! 前导码或结尾码校验失败说明流失去了帧对齐。此时解码器报告一个
//! [`FramingError`]，丢弃一个字节，从下一个字节重新扫描，
//! 直到重新锁定帧边界。坏帧被丢弃，解码不中断。
//!
//! # 使用示例
//!
//! ```rust
//! use digitizer_protocol::{AngleSample, FrameDecoder};
//!
//! let mut decoder = FrameDecoder::new();
//! decoder.feed(&AngleSample::new(150, 0, 0, 0).to_frame());
//!
//! let mut samples = Vec::new();
//! while let Some(result) = decoder.try_decode() {
//!     if let Ok(sample) = result {
//!         samples.push(sample);
//!     }
//! }
//!
//! assert_eq!(samples, vec![AngleSample::new(150, 0, 0, 0)]);
//! ```

use crate::{AngleSample, FRAME_LEN, FramingError};

/// 累积式帧解码器
///
/// 字节只进不改：[`feed`](Self::feed) 追加，[`try_decode`](Self::try_decode)
/// 消费。内部用读偏移标记已消费的前缀，下次喂入时一次性压缩，
/// 避免每帧都搬移剩余字节。
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    /// `buf` 中已消费的前缀长度
    pos: usize,
}

impl FrameDecoder {
    /// 创建空解码器
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// 追加一段字节到累积缓冲区
    pub fn feed(&mut self, bytes: &[u8]) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        self.buf.extend_from_slice(bytes);
    }

    /// 尝试取出一帧
    ///
    /// - 缓冲区不足一帧：返回 `None`，字节原样保留
    /// - 前导码、结尾码均合法：消费整帧，返回 `Some(Ok(sample))`
    /// - 校验失败：只丢弃一个字节（重同步点），返回 `Some(Err(_))`
    ///
    /// 调用方应循环调用直到返回 `None`。
    #[must_use]
    pub fn try_decode(&mut self) -> Option<Result<AngleSample, FramingError>> {
        if self.pending_len() < FRAME_LEN {
            return None;
        }

        let mut frame = [0u8; FRAME_LEN];
        frame.copy_from_slice(&self.buf[self.pos..self.pos + FRAME_LEN]);

        match AngleSample::from_frame(&frame) {
            Ok(sample) => {
                self.pos += FRAME_LEN;
                Some(Ok(sample))
            },
            Err(e) => {
                // 丢一个字节，从下一个字节重新扫描
                self.pos += 1;
                Some(Err(e))
            },
        }
    }

    /// 当前缓冲区中未消费的字节数
    pub fn pending_len(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// 缓冲区是否为空（没有未消费的字节）
    pub fn is_empty(&self) -> bool {
        self.pending_len() == 0
    }
}
