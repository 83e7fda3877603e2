//! 事件作用域
//!
//! 定义事件发生时的时间/空间归属：仿真全局时间，以及某个节点的本地时间。

/// 作用域位掩码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScopeFlags(pub u32);

impl ScopeFlags {
    /// 当前次版本不认识的作用域
    pub const UNKNOWN: ScopeFlags = ScopeFlags(0x1);
    /// 仿真作用域
    pub const SIMULATION: ScopeFlags = ScopeFlags(0x2);
    /// 节点作用域
    pub const NODE: ScopeFlags = ScopeFlags(0x4);

    /// 本解析器能解码字段的作用域位
    pub(crate) const DECODED_BITS: u32 = Self::SIMULATION.0 | Self::NODE.0;

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: ScopeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ScopeFlags) {
        self.0 |= other.0;
    }
}

/// 节点时间：CPU 周期数，以及节点启动以来的毫秒数。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeTime {
    pub cycles: u64,
    pub node_ms: f64,
}

/// 一个事件的作用域。
///
/// 只有在 `flags` 中置位的作用域，其时间字段才有意义；未置位的字段内容不作保证，
/// 应通过 [`Scope::sim_us`] / [`Scope::node`] 访问。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scope {
    pub(crate) flags: ScopeFlags,
    pub(crate) sim_us: f64,
    pub(crate) nid: u16,
    pub(crate) node_time: NodeTime,
}

impl Scope {
    /// 仅带仿真时间（微秒）的作用域
    pub fn simulation(sim_us: f64) -> Scope {
        Scope {
            flags: ScopeFlags::SIMULATION,
            sim_us,
            ..Scope::default()
        }
    }

    /// 仅带节点时间的作用域
    pub fn for_node(nid: u16, node_time: NodeTime) -> Scope {
        Scope {
            flags: ScopeFlags::NODE,
            nid,
            node_time,
            ..Scope::default()
        }
    }

    /// 追加仿真时间
    pub fn with_simulation(mut self, sim_us: f64) -> Scope {
        self.flags.insert(ScopeFlags::SIMULATION);
        self.sim_us = sim_us;
        self
    }

    /// 追加节点时间
    pub fn with_node(mut self, nid: u16, node_time: NodeTime) -> Scope {
        self.flags.insert(ScopeFlags::NODE);
        self.nid = nid;
        self.node_time = node_time;
        self
    }

    pub fn flags(&self) -> ScopeFlags {
        self.flags
    }

    /// 仿真时间（微秒）；未设置仿真作用域时返回 `None`。
    pub fn sim_us(&self) -> Option<f64> {
        self.flags
            .contains(ScopeFlags::SIMULATION)
            .then_some(self.sim_us)
    }

    /// 节点编号与节点时间；未设置节点作用域时返回 `None`。
    pub fn node(&self) -> Option<(u16, NodeTime)> {
        self.flags
            .contains(ScopeFlags::NODE)
            .then_some((self.nid, self.node_time))
    }
}
