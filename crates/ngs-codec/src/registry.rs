//! 编解码器注册表.
//!
//! 音频图本身不内置码流解码实现, 宿主在启动时把解码后端按 CodecId 注册进来,
//! 各模块再按需查找并实例化.

use std::collections::HashMap;

use log::debug;
use ngs_core::{NgsError, NgsResult};

use crate::codec_id::CodecId;
use crate::decoder::Decoder;

/// 解码器工厂函数类型
pub type DecoderFactory = fn() -> NgsResult<Box<dyn Decoder>>;

/// 解码器注册条目
struct DecoderEntry {
    /// 解码器名称
    name: String,
    /// 工厂函数
    factory: DecoderFactory,
}

/// 编解码器注册表
#[derive(Default)]
pub struct CodecRegistry {
    /// 解码器工厂映射
    decoders: HashMap<CodecId, Vec<DecoderEntry>>,
}

impl CodecRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个解码器
    ///
    /// 同一 CodecId 可注册多个实现, 先注册的优先.
    pub fn register_decoder(
        &mut self,
        codec_id: CodecId,
        name: impl Into<String>,
        factory: DecoderFactory,
    ) {
        let name = name.into();
        debug!("注册解码器: {codec_id} -> {name}");
        self.decoders
            .entry(codec_id)
            .or_default()
            .push(DecoderEntry { name, factory });
    }

    /// 查找指定编解码器 ID 的首选工厂函数
    pub fn decoder_factory(&self, codec_id: CodecId) -> NgsResult<DecoderFactory> {
        self.decoders
            .get(&codec_id)
            .and_then(|entries| entries.first())
            .map(|entry| entry.factory)
            .ok_or_else(|| NgsError::CodecNotFound(format!("未找到 {codec_id} 的解码器")))
    }

    /// 创建指定编解码器 ID 的解码器实例
    pub fn create_decoder(&self, codec_id: CodecId) -> NgsResult<Box<dyn Decoder>> {
        (self.decoder_factory(codec_id)?)()
    }

    /// 获取所有已注册的解码器名称
    pub fn list_decoders(&self) -> Vec<(CodecId, &str)> {
        self.decoders
            .iter()
            .flat_map(|(id, entries)| entries.iter().map(move |e| (*id, e.name.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::AudioFrame;
    use crate::packet::Packet;

    struct NullDecoder(CodecId);

    impl Decoder for NullDecoder {
        fn codec_id(&self) -> CodecId {
            self.0
        }

        fn name(&self) -> &str {
            "null"
        }

        fn send_packet(&mut self, _packet: &Packet) -> NgsResult<()> {
            Ok(())
        }

        fn receive_frame(&mut self) -> NgsResult<AudioFrame> {
            Err(NgsError::NeedMoreData)
        }

        fn flush(&mut self) {}
    }

    fn create_null_atrac9() -> NgsResult<Box<dyn Decoder>> {
        Ok(Box::new(NullDecoder(CodecId::Atrac9)))
    }

    fn create_null_pcm() -> NgsResult<Box<dyn Decoder>> {
        Ok(Box::new(NullDecoder(CodecId::PcmS16le)))
    }

    #[test]
    fn test_按codec_id创建解码器() {
        let mut registry = CodecRegistry::new();
        registry.register_decoder(CodecId::Atrac9, "null_atrac9", create_null_atrac9);
        registry.register_decoder(CodecId::PcmS16le, "null_pcm", create_null_pcm);

        assert_eq!(registry.list_decoders().len(), 2);
        let dec = registry.create_decoder(CodecId::Atrac9).unwrap();
        assert_eq!(dec.codec_id(), CodecId::Atrac9);
    }

    #[test]
    fn test_先注册的实现优先() {
        let mut registry = CodecRegistry::new();
        registry.register_decoder(CodecId::Atrac9, "first", create_null_atrac9);
        registry.register_decoder(CodecId::Atrac9, "second", create_null_pcm);

        let dec = registry.create_decoder(CodecId::Atrac9).unwrap();
        assert_eq!(dec.codec_id(), CodecId::Atrac9);
    }

    #[test]
    fn test_未注册的编解码器返回错误() {
        let registry = CodecRegistry::new();
        assert!(matches!(
            registry.create_decoder(CodecId::Atrac9),
            Err(NgsError::CodecNotFound(_))
        ));
    }
}
