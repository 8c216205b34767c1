//! # ngs-codec
//!
//! NGS 音频引擎编解码器库, 提供码流解码后端的统一抽象与 ATRAC9 配置字解析.
//!
//! ## 使用示例
//!
//! ```rust
//! use ngs_codec::parsers::atrac9::get_buffer_parameter;
//!
//! // 48 kHz 立体声, 256 字节帧, 每超帧 4 帧
//! let info = get_buffer_parameter(1000, 100, 0x001F_74FE | (7 << 29) | (2 << 27));
//! assert_eq!(info.start_skip, 1000);
//! assert!(info.is_super_packet);
//! ```

pub mod codec_id;
pub mod codec_parameters;
pub mod decoder;
pub mod frame;
pub mod packet;
pub mod parsers;
pub mod registry;

// 重导出常用类型
pub use codec_id::CodecId;
pub use codec_parameters::{AudioCodecParams, CodecParameters};
pub use decoder::Decoder;
pub use frame::AudioFrame;
pub use packet::Packet;
pub use registry::{CodecRegistry, DecoderFactory};
