//! 解码绑定: 按配置字实例化的 ATRAC9 解码后端与格式转换器.

use bytes::Bytes;
use log::debug;
use ngs_codec::parsers::atrac9::Atrac9Config;
use ngs_codec::{AudioCodecParams, CodecId, CodecParameters, Decoder, DecoderFactory, Packet};
use ngs_core::{ChannelLayout, NgsError, NgsResult, SampleFormat};
use ngs_resample::ResampleContext;

/// 格式转换器使用的内部采样率标记, 源与目标相同, 不做速率转换
pub const CONVERTER_TAG_RATE: u32 = 480_000;

/// 解码绑定可回答的几何查询
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderQuery {
    /// 每超帧压缩字节数
    SuperframeSize,
    /// 每帧采样数
    SamplesPerFrame,
    /// 每超帧采样数
    SamplesPerSuperframe,
    /// 每超帧帧数
    FramesInSuperframe,
    /// 声道数
    Channels,
    /// 码流采样率
    SampleRate,
}

/// 一次 `receive` 取回的采样数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderSize {
    /// 每声道采样数
    pub samples: u32,
}

/// ATRAC9 解码绑定
///
/// 由配置字决定几何参数, 配置字变化时整体重建.
pub struct Atrac9DecoderState {
    config: Atrac9Config,
    channels: u32,
    decoder: Box<dyn Decoder>,
    converter: ResampleContext,
}

impl Atrac9DecoderState {
    /// 按配置字创建并打开解码后端
    pub fn new(config_word: u32, factory: DecoderFactory) -> NgsResult<Self> {
        let config = Atrac9Config::from_word(config_word);
        let layout = config.channel_layout()?;
        let src_layout = match layout.channels {
            1 => ChannelLayout::MONO,
            2 => ChannelLayout::STEREO,
            n => {
                return Err(NgsError::Unsupported(format!(
                    "ATRAC9 语音只支持单声道或立体声, 配置字 {config_word:#010x} 为 {n} 声道"
                )));
            }
        };

        let mut decoder = factory()?;
        decoder.open(&CodecParameters {
            codec_id: CodecId::Atrac9,
            extra_data: config_word.to_le_bytes().to_vec(),
            audio: AudioCodecParams {
                sample_rate: config.sample_rate(),
                channel_layout: src_layout,
                sample_format: SampleFormat::S16,
                frame_size: config.samples_per_frame(),
            },
        })?;

        let converter = ResampleContext::new(
            CONVERTER_TAG_RATE,
            SampleFormat::S16,
            src_layout,
            CONVERTER_TAG_RATE,
            SampleFormat::F32,
            ChannelLayout::STEREO,
        )?;

        debug!(
            "创建 ATRAC9 解码绑定: 配置字 {config_word:#010x}, {} Hz, {src_layout}, 超帧 {} 字节 / {} 采样",
            config.sample_rate(),
            config.bytes_per_superframe(),
            config.samples_per_superframe()
        );

        Ok(Self {
            config,
            channels: layout.channels,
            decoder,
            converter,
        })
    }

    /// 绑定所用的配置字
    pub fn config_word(&self) -> u32 {
        self.config.raw()
    }

    /// 几何查询
    pub fn get(&self, query: DecoderQuery) -> u32 {
        match query {
            DecoderQuery::SuperframeSize => self.config.bytes_per_superframe(),
            DecoderQuery::SamplesPerFrame => self.config.samples_per_frame(),
            DecoderQuery::SamplesPerSuperframe => self.config.samples_per_superframe(),
            DecoderQuery::FramesInSuperframe => self.config.frames_per_superframe(),
            DecoderQuery::Channels => self.channels,
            DecoderQuery::SampleRate => self.config.sample_rate(),
        }
    }

    /// 单帧压缩字节数
    pub fn get_es_size(&self) -> u32 {
        self.config.frame_bytes()
    }

    /// 一帧解码输出 (S16 交错) 的字节数
    pub fn pcm_frame_bytes(&self) -> usize {
        self.config.samples_per_frame() as usize * SampleFormat::S16.frame_stride(self.channels)
    }

    /// 送入一帧压缩数据, 后端拒绝时返回 false
    pub fn send(&mut self, data: &[u8]) -> bool {
        match self.decoder.send_packet(&Packet::from_data(Bytes::copy_from_slice(data))) {
            Ok(()) => true,
            Err(e) => {
                debug!("ATRAC9 帧解码失败: {e}");
                false
            }
        }
    }

    /// 取出解码后的 S16 交错 PCM 写入 `pcm_out`
    ///
    /// 后端没有产出时返回 0 个采样. 写入量不超过 `pcm_out` 的容量.
    pub fn receive(&mut self, pcm_out: &mut [u8]) -> DecoderSize {
        let frame = match self.decoder.receive_frame() {
            Ok(frame) => frame,
            Err(_) => return DecoderSize::default(),
        };
        let stride = SampleFormat::S16.frame_stride(self.channels);
        let available = frame.data.len().min(frame.byte_len()).min(pcm_out.len());
        let samples = available / stride;
        pcm_out[..samples * stride].copy_from_slice(&frame.data[..samples * stride]);
        DecoderSize {
            samples: samples as u32,
        }
    }

    /// 解码出错后清空后端上下文
    pub fn clear_context(&mut self) {
        self.decoder.flush();
    }

    /// S16 -> 立体声 F32 转换器
    pub fn converter(&self) -> &ResampleContext {
        &self.converter
    }
}
