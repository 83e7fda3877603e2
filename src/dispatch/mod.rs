//! 事件分发模块
//!
//! 驱动 [`TraceReader`](crate::trace::TraceReader) 读到末尾，把每条记录交给消费者：
//! 要么是一个通用回调（附带事件类型标签），要么是按事件类型逐一实现的 [`EventHandler`]。

// 子模块声明
mod error;
mod handler;
mod run;

// 重新导出公共接口
pub use error::DispatchError;
pub use handler::{EventHandler, Flow};
pub use run::{dispatch_event, run, run_typed};
