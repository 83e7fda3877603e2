//! 追踪文件模块
//!
//! 此模块负责解码嵌入式节点产生的二进制追踪文件：文件头（魔数 + 主/次版本号）
//! 之后是一串记录，每条记录由作用域（仿真时间、节点时间）和一个监控事件组成。

// 子模块声明
mod error;
mod event;
mod reader;
mod scope;
mod writer;

// 重新导出公共接口
pub use error::TraceError;
pub use event::{ByteOrder, Event, EventKind, MonCreate, MonData, MonState, NodePosition, Record};
pub use reader::{Records, TraceReader};
pub use scope::{NodeTime, Scope, ScopeFlags};
pub use writer::TraceWriter;

/// 文件魔数（'ctkt'）
pub const MAGIC: [u8; 4] = *b"ctkt";
/// 解析器实现的主版本号；主版本之间格式不兼容。
pub const MAJOR_VERSION: u32 = 1;
/// 次版本号；次版本之间前后兼容，新增的作用域/事件按未知处理。
pub const MINOR_VERSION: u32 = 0;
/// 文件头长度：魔数 + major + minor
pub const HEADER_LEN: usize = 12;
/// 单个事件负载允许的最大长度（字节）
pub const MAX_PAYLOAD_LEN: u32 = 1 << 20;
