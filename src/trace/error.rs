//! 追踪解析错误

use std::io;
use thiserror::Error;

/// 读取追踪文件时可能出现的错误。
///
/// 正常读到文件末尾不是错误，由 [`super::TraceReader::next_record`] 返回 `Ok(None)` 表示。
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("trace ends in the middle of a record")]
    ShortRead,

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    #[error("invalid magic number {found:02x?}")]
    BadMagic { found: [u8; 4] },

    #[error("major version mismatch: trace is v{found}, parser implements v{expected}")]
    MajorMismatch { found: u32, expected: u32 },

    #[error("out of memory while reading {len} bytes")]
    OutOfMemory { len: usize },

    #[error("inconsistent {what}: declared {declared} bytes, expected {expected}")]
    Inconsistent {
        what: &'static str,
        declared: u64,
        expected: u64,
    },

    #[error("invalid {what}: {raw:#x}")]
    InvalidFormat { what: &'static str, raw: u32 },

    #[error("{what} too large: {len} bytes (max {max})")]
    TooLarge {
        what: &'static str,
        len: u64,
        max: u64,
    },
}

// 流在读取途中结束属于截断，而不是一般 I/O 错误。
impl From<io::Error> for TraceError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            TraceError::ShortRead
        } else {
            TraceError::Io(err)
        }
    }
}
