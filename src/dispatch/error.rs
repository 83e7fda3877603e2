//! 分发错误

use crate::trace::TraceError;
use thiserror::Error;

/// 分发的最终失败原因：读取错误原样上抛，或消费者主动取消。
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("dispatch cancelled by consumer at record {record} (code {code})")]
    Cancelled { code: i32, record: u64 },
}

impl DispatchError {
    /// 消费者给出的取消值
    pub fn cancel_code(&self) -> Option<i32> {
        match self {
            DispatchError::Cancelled { code, .. } => Some(*code),
            DispatchError::Trace(_) => None,
        }
    }
}
