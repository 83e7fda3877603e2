//! 监控事件
//!
//! 定义追踪记录中的事件类型及各类型的负载。

use super::scope::{NodeTime, Scope};

/// 事件类型标签。线上编号与记录端保持一致，0 保留不用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// 当前次版本不认识的事件
    Unknown,
    MonCreate,
    MonState,
    MonData,
    NodeCreate,
    NodeDestroy,
    NodePosition,
}

impl EventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::MonCreate => "mon_create",
            Self::MonState => "mon_state",
            Self::MonData => "mon_data",
            Self::NodeCreate => "node_create",
            Self::NodeDestroy => "node_destroy",
            Self::NodePosition => "node_position",
        }
    }

    /// 从线上编号转换；不认识的编号返回 `None`。
    pub fn from_wire(raw: u16) -> Option<Self> {
        match raw {
            1 => Some(Self::MonCreate),
            2 => Some(Self::MonState),
            3 => Some(Self::MonData),
            4 => Some(Self::NodeCreate),
            5 => Some(Self::NodeDestroy),
            6 => Some(Self::NodePosition),
            _ => None,
        }
    }

    /// 线上编号；`Unknown` 没有固定编号。
    pub fn wire(self) -> Option<u16> {
        match self {
            Self::Unknown => None,
            Self::MonCreate => Some(1),
            Self::MonState => Some(2),
            Self::MonData => Some(3),
            Self::NodeCreate => Some(4),
            Self::NodeDestroy => Some(5),
            Self::NodePosition => Some(6),
        }
    }

    /// 固定长度事件的负载长度；`MonData` 与 `Unknown` 为变长。
    pub(crate) const fn fixed_len(self) -> Option<u32> {
        match self {
            Self::MonCreate => Some(MonCreate::WIRE_LEN),
            Self::MonState => Some(MonState::WIRE_LEN),
            Self::NodeCreate | Self::NodeDestroy => Some(0),
            Self::NodePosition => Some(NodePosition::WIRE_LEN),
            Self::MonData | Self::Unknown => None,
        }
    }
}

/// 节点固件使用的字节序（仅作记录，数据事件的负载不做转换）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            b'B' => Some(Self::Big),
            b'l' => Some(Self::Little),
            _ => None,
        }
    }

    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Big => b'B',
            Self::Little => b'l',
        }
    }
}

/// 监控器初始化：各时钟域的偏移量以及节点字节序。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonCreate {
    pub state_offset: NodeTime,
    pub data_offset: NodeTime,
    pub byte_offset: NodeTime,
    pub byte_order: ByteOrder,
}

impl MonCreate {
    /// 3 个 node_time（各 16 字节）+ 1 字节字节序
    pub const WIRE_LEN: u32 = 16 * 3 + 1;
}

/// 固件内监控器产生的状态事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonState {
    pub context: u16,
    pub entity: u16,
    pub state: u16,
}

impl MonState {
    pub const WIRE_LEN: u32 = 6;
}

/// 固件内监控器产生的数据事件，负载由读取方单独分配，归消费者所有。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonData {
    pub context: u16,
    pub entity: u16,
    pub data: Vec<u8>,
}

impl MonData {
    /// context + entity + length
    pub const HEADER_LEN: u32 = 8;
}

/// 节点在仿真中的位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl NodePosition {
    pub const WIRE_LEN: u32 = 24;
}

/// 解码后的事件
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// 不认识的事件，`raw` 为线上编号，负载已被跳过
    Unknown { raw: u16 },
    MonCreate(MonCreate),
    MonState(MonState),
    MonData(MonData),
    NodeCreate,
    NodeDestroy,
    NodePosition(NodePosition),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Unknown { .. } => EventKind::Unknown,
            Event::MonCreate(_) => EventKind::MonCreate,
            Event::MonState(_) => EventKind::MonState,
            Event::MonData(_) => EventKind::MonData,
            Event::NodeCreate => EventKind::NodeCreate,
            Event::NodeDestroy => EventKind::NodeDestroy,
            Event::NodePosition(_) => EventKind::NodePosition,
        }
    }
}

/// 一条追踪记录：作用域 + 事件
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub scope: Scope,
    pub event: Event,
}
