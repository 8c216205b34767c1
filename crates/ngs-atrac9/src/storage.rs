//! PCM 暂存区.
//!
//! 解码得到的立体声 F32 采样按帧追加在末尾, 交付给下游的区间从开头向后推进,
//! 已交付的部分在下一次解码前整体前移压缩掉 (compact-on-use).

use std::ops::Range;

use ngs_core::SampleFormat;

/// 每个暂存采样帧的字节数 (2 声道 x f32)
pub const FRAME_STRIDE: usize = SampleFormat::F32.frame_stride(2);

/// 线性 PCM 暂存区
#[derive(Debug, Clone, Default)]
pub struct StagingBuffer {
    bytes: Vec<u8>,
}

impl StagingBuffer {
    /// 创建空暂存区
    pub fn new() -> Self {
        Self::default()
    }

    /// 字节长度
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 完整采样帧数
    pub fn samples(&self) -> u32 {
        (self.bytes.len() / FRAME_STRIDE) as u32
    }

    /// 全部字节
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 丢弃开头 `samples` 个采样帧, 剩余数据前移
    pub fn compact(&mut self, samples: u32) {
        let n = (samples as usize * FRAME_STRIDE).min(self.bytes.len());
        self.bytes.drain(..n);
    }

    /// 追加 PCM 数据
    pub fn append(&mut self, pcm: &[u8]) {
        self.bytes.extend_from_slice(pcm);
    }

    /// 不足 `samples` 个采样帧时以静音补齐
    pub fn pad_to(&mut self, samples: u32) {
        let want = samples as usize * FRAME_STRIDE;
        if self.bytes.len() < want {
            self.bytes.resize(want, 0);
        }
    }

    /// 清空
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// 采样区间对应的字节区间
    pub fn sample_range(start: u32, count: u32) -> Range<usize> {
        let begin = start as usize * FRAME_STRIDE;
        begin..begin + count as usize * FRAME_STRIDE
    }
}
