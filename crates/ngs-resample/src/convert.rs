//! 采样格式和声道布局转换.

use ngs_core::{NgsError, NgsResult, SampleFormat};

/// 采样格式转换
///
/// 将交错格式的音频数据从一种采样格式转换为另一种, 经由 f32 中间值.
///
/// # 参数
/// - `input`: 输入数据 (交错格式)
/// - `src_format`: 源采样格式
/// - `dst_format`: 目标采样格式
/// - `nb_samples`: 每声道采样数
/// - `channels`: 声道数
pub fn convert_samples(
    input: &[u8],
    src_format: SampleFormat,
    dst_format: SampleFormat,
    nb_samples: usize,
    channels: usize,
) -> NgsResult<Vec<u8>> {
    let src_bps = checked_bps(src_format)?;
    let dst_bps = checked_bps(dst_format)?;
    let total = nb_samples * channels;
    let expected_len = total * src_bps;
    if input.len() < expected_len {
        return Err(NgsError::InvalidArgument(format!(
            "数据不足: 期望 {expected_len} 字节, 实际 {} 字节",
            input.len()
        )));
    }

    let mut output = vec![0u8; total * dst_bps];
    for (src, dst) in input[..expected_len]
        .chunks_exact(src_bps)
        .zip(output.chunks_exact_mut(dst_bps))
    {
        encode_sample(decode_sample(src, src_format)?, dst_format, dst)?;
    }
    Ok(output)
}

/// 声道混合
///
/// 支持的转换:
/// - 单声道 -> 多声道: 复制到所有声道
/// - 多声道 -> 单声道: 取平均
/// - 其余: 对应声道直接映射, 多出的目标声道填静音
pub fn mix_channels(
    input: &[u8],
    format: SampleFormat,
    nb_samples: usize,
    src_channels: usize,
    dst_channels: usize,
) -> NgsResult<Vec<u8>> {
    if src_channels == dst_channels {
        return Ok(input.to_vec());
    }
    if src_channels == 0 || dst_channels == 0 {
        return Err(NgsError::InvalidArgument("声道数不能为 0".into()));
    }

    let bps = checked_bps(format)?;
    let src_stride = src_channels * bps;
    let dst_stride = dst_channels * bps;
    if input.len() < nb_samples * src_stride {
        return Err(NgsError::InvalidArgument("数据不足".into()));
    }

    let mut output = vec![0u8; nb_samples * dst_stride];
    let mut frame = vec![0f32; src_channels];
    for (src, dst) in input
        .chunks_exact(src_stride)
        .zip(output.chunks_exact_mut(dst_stride))
    {
        for (value, bytes) in frame.iter_mut().zip(src.chunks_exact(bps)) {
            *value = decode_sample(bytes, format)?;
        }
        for (ch, out) in dst.chunks_exact_mut(bps).enumerate() {
            let value = if src_channels == 1 {
                frame[0]
            } else if dst_channels == 1 {
                frame.iter().sum::<f32>() / src_channels as f32
            } else {
                frame.get(ch).copied().unwrap_or(0.0)
            };
            encode_sample(value, format, out)?;
        }
    }
    Ok(output)
}

fn checked_bps(format: SampleFormat) -> NgsResult<usize> {
    match format.bytes_per_sample() {
        0 => Err(NgsError::InvalidArgument("无效的采样格式".into())),
        n => Ok(n as usize),
    }
}

/// 将原始字节解码为归一化样本 (-1.0 ~ 1.0)
fn decode_sample(data: &[u8], format: SampleFormat) -> NgsResult<f32> {
    match format {
        SampleFormat::S16 => Ok(f32::from(i16::from_le_bytes([data[0], data[1]])) / 32768.0),
        SampleFormat::S32 => {
            let v = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
            Ok((f64::from(v) / 2_147_483_648.0) as f32)
        }
        SampleFormat::F32 => Ok(f32::from_le_bytes([data[0], data[1], data[2], data[3]])),
        _ => Err(NgsError::Unsupported(format!("不支持的采样格式: {format}"))),
    }
}

/// 将归一化样本编码写入 `out`
fn encode_sample(value: f32, format: SampleFormat, out: &mut [u8]) -> NgsResult<()> {
    match format {
        SampleFormat::S16 => {
            let v = (value * 32768.0).round().clamp(-32768.0, 32767.0) as i16;
            out.copy_from_slice(&v.to_le_bytes());
        }
        SampleFormat::S32 => {
            let v = (f64::from(value) * 2_147_483_648.0)
                .round()
                .clamp(-2_147_483_648.0, 2_147_483_647.0) as i32;
            out.copy_from_slice(&v.to_le_bytes());
        }
        SampleFormat::F32 => out.copy_from_slice(&value.to_le_bytes()),
        _ => return Err(NgsError::Unsupported(format!("不支持的采样格式: {format}"))),
    }
    Ok(())
}
