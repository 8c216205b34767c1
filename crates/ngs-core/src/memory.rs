//! 客户机内存访问.
//!
//! 缓冲区描述符只携带客户机地址, 解码前需要经内存系统转换为可直接读取的字节切片.
//! 切片仅在持有语音锁期间有效, 回调窗口之后必须重新转换.

use std::collections::BTreeMap;

use log::trace;

use crate::{NgsError, NgsResult};

/// 客户机内存系统接口
pub trait GuestMemory {
    /// 将 `address + offset` 处长度为 `len` 的区间转换为字节切片
    ///
    /// 区间越界或未映射时返回 `NgsError::BadAddress`.
    fn slice(&self, address: u32, offset: u32, len: usize) -> NgsResult<&[u8]>;
}

/// 按区域映射的稀疏客户机内存
///
/// 每个区域从一个基地址开始, 区域之间不允许重叠.
/// 用于测试与离线工具, 模拟器宿主通常提供自己的实现.
#[derive(Debug, Default, Clone)]
pub struct SparseMemory {
    /// 基地址 -> 区域数据
    regions: BTreeMap<u32, Vec<u8>>,
}

impl SparseMemory {
    /// 创建空内存
    pub fn new() -> Self {
        Self::default()
    }

    /// 在 `base` 处映射一段数据
    pub fn map(&mut self, base: u32, data: impl Into<Vec<u8>>) -> NgsResult<()> {
        let data = data.into();
        if base == 0 {
            return Err(NgsError::InvalidArgument("地址 0 保留为空指针".into()));
        }
        let end = u64::from(base) + data.len() as u64;
        let overlaps = self.regions.iter().any(|(&start, region)| {
            let region_end = u64::from(start) + region.len() as u64;
            u64::from(base) < region_end && u64::from(start) < end
        });
        if overlaps {
            return Err(NgsError::InvalidArgument(format!(
                "区域 {base:#010x} (+{}) 与已有映射重叠",
                data.len()
            )));
        }
        trace!("映射客户机内存: {base:#010x}, {} 字节", data.len());
        self.regions.insert(base, data);
        Ok(())
    }

    /// 修改已映射区域中的数据
    pub fn region_mut(&mut self, base: u32) -> Option<&mut Vec<u8>> {
        self.regions.get_mut(&base)
    }
}

impl GuestMemory for SparseMemory {
    fn slice(&self, address: u32, offset: u32, len: usize) -> NgsResult<&[u8]> {
        let bad = || NgsError::BadAddress {
            address,
            offset,
            len,
        };
        let target = address.checked_add(offset).ok_or_else(bad)?;
        let (&start, region) = self.regions.range(..=target).next_back().ok_or_else(bad)?;
        let begin = (target - start) as usize;
        let end = begin.checked_add(len).ok_or_else(bad)?;
        region.get(begin..end).ok_or_else(bad)
    }
}
