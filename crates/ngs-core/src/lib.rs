//! # ngs-core
//!
//! NGS 音频引擎核心库, 提供基础类型定义、错误处理、客户机内存接口和锁交接原语.

pub mod channel_layout;
pub mod error;
pub mod memory;
pub mod sample_format;
pub mod sync;

// 重导出常用类型
pub use channel_layout::ChannelLayout;
pub use error::{NgsError, NgsResult};
pub use memory::{GuestMemory, SparseMemory};
pub use sample_format::SampleFormat;
pub use sync::{SchedulerLock, VoiceLocks};
