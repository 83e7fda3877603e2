//! 输出模式
//!
//! 一个输出模式是一个事件消费者加上运行前后的生命周期钩子：`before` 在分发前调用一次，
//! `after` 在分发结束后调用一次并输出结果。

use std::io::{self, Read, Write};

use crate::dispatch::{DispatchError, EventHandler, run_typed};
use crate::trace::TraceReader;
use thiserror::Error;
use tracing::info;

/// 输出模式接口
pub trait OutputMode: EventHandler {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// 初始化内部状态
    fn before(&mut self);
    /// 输出结果并清理内部状态
    fn after(&mut self, out: &mut dyn Write) -> io::Result<()>;
}

/// 运行输出模式时的错误
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("writing output: {0}")]
    Output(#[from] io::Error),
}

/// 用给定输出模式消费整个追踪。
///
/// 即使分发失败也会调用 `after`，已经累积的结果照常输出；返回值以分发结果优先。
pub fn run_mode<R, M>(trace: &mut TraceReader<R>, mode: &mut M, out: &mut dyn Write) -> Result<u64, RunError>
where
    R: Read,
    M: OutputMode + ?Sized,
{
    info!(
        mode = mode.name(),
        description = mode.description(),
        "运行输出模式"
    );
    mode.before();
    let dispatched = run_typed(trace, &mut *mode);
    let rendered = mode.after(out);

    let count = dispatched?;
    rendered?;
    Ok(count)
}
