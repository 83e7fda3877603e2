//! 自动机重建模块
//!
//! 按监控上下文增量构建观测到的状态与状态转移（有向图），并以 dot 格式输出。
//! 内存占用只随不同的 (上下文, 状态) 对和不同的转移增长，与事件总数无关。

// 子模块声明
mod builder;
mod context_graph;
mod render;

// 重新导出公共接口
pub use builder::GraphBuilder;
pub use context_graph::{ContextGraph, StateNode};
pub use render::write_context_graph;
