//! # ngs-atrac9
//!
//! NGS 音频图的 ATRAC9 播放模块.
//!
//! 客户机通过参数块提供至多 4 个压缩数据缓冲区组成的链, 每个缓冲区可循环若干次后切换到下一个.
//! 模块每个 tick 按需解码整超帧, 转换为立体声 F32 暂存, 再按固定粒度交付给下游;
//! 缓冲区切换、循环、解码失败和数据耗尽通过回调通知客户机.
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use ngs_atrac9::{Atrac9Module, CallbackEvent, ModuleData, Parameters, ProcessContext};
//! use ngs_codec::CodecRegistry;
//! use ngs_core::{SchedulerLock, SparseMemory, VoiceLocks};
//! use parking_lot::Mutex;
//!
//! # fn main() -> ngs_core::NgsResult<()> {
//! let registry = CodecRegistry::new(); // 宿主在此注册 ATRAC9 解码后端
//! let mut module = Atrac9Module::new(&registry)?;
//! let scheduler = SchedulerLock::new(());
//! let voice = Mutex::new(ModuleData::new(Parameters::default()));
//! let memory = SparseMemory::new();
//! let callback = |event: CallbackEvent, param: u32, address: u32| println!("{event}: {param} @ {address:#x}");
//!
//! let ctx = ProcessContext { memory: &memory, callback: &callback, granularity: 512 };
//! let mut locks = VoiceLocks::acquire(&scheduler, &voice);
//! let outcome = module.process(&ctx, &mut locks)?;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod callback;
pub mod data;
pub mod module;
pub mod params;
pub mod state;
pub mod storage;

pub use binding::{Atrac9DecoderState, CONVERTER_TAG_RATE, DecoderQuery, DecoderSize};
pub use callback::{CallbackEvent, Notification, VoiceCallback};
pub use data::ModuleData;
pub use module::{Atrac9Module, ProcessContext, PumpOutcome, TickOutcome};
pub use params::{
    BufferParameters, LOOP_FOREVER, MAX_BUFFER_PARAMS, NO_BUFFER, PARAMETER_BLOCK_SIZE, Parameters,
};
pub use state::{PlaybackState, VoiceState, VoiceStatus};
pub use storage::{FRAME_STRIDE, StagingBuffer};
