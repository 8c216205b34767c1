//! 统一错误类型定义.
//!
//! 所有 NGS crate 共用的错误类型, 支持跨模块传播.
//!
//! 注意: 语音播放过程中可恢复的情况 (解码失败, 数据耗尽, 缓冲区错位)
//! 不走错误通道, 而是通过回调通知和 tick 结果上报.
//! 这里的错误只描述宿主侧的配置或接入问题.

use thiserror::Error;

/// NGS 统一错误类型
#[derive(Debug, Error)]
pub enum NgsError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的操作
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 编解码器错误
    #[error("编解码器错误: {0}")]
    Codec(String),

    /// 数据不足, 需要更多输入
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,

    /// 未找到指定的编解码器
    #[error("未找到编解码器: {0}")]
    CodecNotFound(String),

    /// 无效数据 (损坏的码流, 过短的参数块等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 客户机地址无法转换
    #[error("无效客户机地址: {address:#010x} (+{offset}, {len} 字节)")]
    BadAddress {
        /// 客户机地址
        address: u32,
        /// 相对偏移
        offset: u32,
        /// 请求长度
        len: usize,
    },

    /// 内部错误 (不应发生)
    #[error("内部错误: {0}")]
    Internal(String),
}

/// NGS 统一 Result 类型
pub type NgsResult<T> = Result<T, NgsError>;
