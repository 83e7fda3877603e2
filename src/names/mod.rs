//! 监控编号名称表
//!
//! 把上下文/状态/实体的数字编号映射为可读名称；未注册的编号回退为十进制字符串。

mod registry;

pub use registry::{EntityName, NameRegistry, NamesError, NamesFile, StateName};
