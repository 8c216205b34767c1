//! 解码后的音频帧.

use ngs_core::{ChannelLayout, SampleFormat};

/// 音频帧
///
/// 数据为交错格式的单个缓冲区, 所有声道交替排列.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// 交错采样数据
    pub data: Vec<u8>,
    /// 本帧包含的采样数 (每声道)
    pub nb_samples: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 采样格式
    pub sample_format: SampleFormat,
    /// 声道布局
    pub channel_layout: ChannelLayout,
}

impl AudioFrame {
    /// 创建空的音频帧
    pub fn new(
        nb_samples: u32,
        sample_rate: u32,
        sample_format: SampleFormat,
        channel_layout: ChannelLayout,
    ) -> Self {
        Self {
            data: Vec::new(),
            nb_samples,
            sample_rate,
            sample_format,
            channel_layout,
        }
    }

    /// 按格式和声道数计算的有效数据字节数
    pub fn byte_len(&self) -> usize {
        self.nb_samples as usize * self.sample_format.frame_stride(self.channel_layout.channels)
    }
}
