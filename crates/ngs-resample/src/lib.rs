//! # ngs-resample
//!
//! NGS 音频引擎的采样格式转换库, 提供:
//! - 采样格式转换 (如 S16 -> F32)
//! - 声道布局转换 (如单声道 -> 立体声)
//!
//! 采样率转换不在支持范围内: 源和目标采样率必须相同.

mod convert;

use log::debug;
use ngs_core::{ChannelLayout, NgsError, NgsResult, SampleFormat};

pub use convert::{convert_samples, mix_channels};

/// 重采样上下文
///
/// 配置一次后可多次复用. 每个解码绑定持有自己的实例, 语音之间不共享.
#[derive(Debug, Clone)]
pub struct ResampleContext {
    /// 源采样率
    pub src_sample_rate: u32,
    /// 源采样格式
    pub src_sample_format: SampleFormat,
    /// 源声道布局
    pub src_channel_layout: ChannelLayout,
    /// 目标采样率
    pub dst_sample_rate: u32,
    /// 目标采样格式
    pub dst_sample_format: SampleFormat,
    /// 目标声道布局
    pub dst_channel_layout: ChannelLayout,
}

impl ResampleContext {
    /// 创建新的重采样上下文
    ///
    /// 源与目标采样率不同时返回 `NgsError::Unsupported`.
    pub fn new(
        src_sample_rate: u32,
        src_sample_format: SampleFormat,
        src_channel_layout: ChannelLayout,
        dst_sample_rate: u32,
        dst_sample_format: SampleFormat,
        dst_channel_layout: ChannelLayout,
    ) -> NgsResult<Self> {
        if src_sample_rate != dst_sample_rate {
            return Err(NgsError::Unsupported(format!(
                "采样率转换 {src_sample_rate} Hz -> {dst_sample_rate} Hz"
            )));
        }
        if src_channel_layout.channels == 0 || dst_channel_layout.channels == 0 {
            return Err(NgsError::InvalidArgument("声道数不能为 0".into()));
        }
        debug!(
            "创建格式转换: {src_sample_format}/{src_channel_layout} -> {dst_sample_format}/{dst_channel_layout}"
        );
        Ok(Self {
            src_sample_rate,
            src_sample_format,
            src_channel_layout,
            dst_sample_rate,
            dst_sample_format,
            dst_channel_layout,
        })
    }

    /// 是否需要转换 (源和目标参数不同)
    pub fn is_needed(&self) -> bool {
        self.src_sample_format != self.dst_sample_format
            || self.src_channel_layout != self.dst_channel_layout
    }

    /// 输出每个采样帧的字节数
    pub fn dst_frame_stride(&self) -> usize {
        self.dst_sample_format
            .frame_stride(self.dst_channel_layout.channels)
    }

    /// 执行转换
    ///
    /// 先转换采样格式, 再转换声道布局.
    ///
    /// # 返回
    /// 转换后的交错格式字节数据和输出每声道采样数
    pub fn convert(&self, input: &[u8], nb_samples: u32) -> NgsResult<(Vec<u8>, u32)> {
        let src_channels = self.src_channel_layout.channels as usize;
        let dst_channels = self.dst_channel_layout.channels as usize;
        let nb = nb_samples as usize;
        let src_len = nb * self.src_sample_format.frame_stride(self.src_channel_layout.channels);
        if input.len() < src_len {
            return Err(NgsError::InvalidArgument(format!(
                "数据不足: 期望 {src_len} 字节, 实际 {} 字节",
                input.len()
            )));
        }

        if !self.is_needed() {
            return Ok((input[..src_len].to_vec(), nb_samples));
        }

        let data = if self.src_sample_format != self.dst_sample_format {
            convert_samples(
                input,
                self.src_sample_format,
                self.dst_sample_format,
                nb,
                src_channels,
            )?
        } else {
            input[..src_len].to_vec()
        };

        let data = mix_channels(
            &data,
            self.dst_sample_format,
            nb,
            src_channels,
            dst_channels,
        )?;
        Ok((data, nb_samples))
    }

    /// 执行转换并写入调用方提供的缓冲区
    ///
    /// `output` 至少需要 `nb_samples * dst_frame_stride()` 字节. 返回写入的采样数.
    pub fn convert_into(&self, input: &[u8], nb_samples: u32, output: &mut [u8]) -> NgsResult<u32> {
        let (data, nb) = self.convert(input, nb_samples)?;
        let out_len = output.len();
        let dst = output.get_mut(..data.len()).ok_or_else(|| {
            NgsError::InvalidArgument(format!(
                "输出缓冲区不足: 需要 {} 字节, 实际 {out_len} 字节",
                data.len()
            ))
        })?;
        dst.copy_from_slice(&data);
        Ok(nb)
    }
}
