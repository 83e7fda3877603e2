//! 单个上下文的自动机

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

/// 自动机中的一个状态顶点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNode {
    state: u16,
    /// 后继状态集合
    adjacency: BTreeSet<u16>,
}

impl StateNode {
    fn new(state: u16) -> Self {
        StateNode {
            state,
            adjacency: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> u16 {
        self.state
    }

    /// 按编号升序迭代后继状态
    pub fn successors(&self) -> impl Iterator<Item = u16> + '_ {
        self.adjacency.iter().copied()
    }
}

/// 一个上下文观测到的状态与转移
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextGraph {
    context: u16,
    last_state: Option<u16>,
    states: BTreeMap<u16, StateNode>,
}

impl ContextGraph {
    pub fn new(context: u16) -> Self {
        ContextGraph {
            context,
            last_state: None,
            states: BTreeMap::new(),
        }
    }

    pub fn context(&self) -> u16 {
        self.context
    }

    /// 最近一次观测到的状态
    pub fn last_state(&self) -> Option<u16> {
        self.last_state
    }

    pub fn state(&self, state: u16) -> Option<&StateNode> {
        self.states.get(&state)
    }

    /// 按编号升序迭代状态顶点
    pub fn states(&self) -> impl Iterator<Item = &StateNode> {
        self.states.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.states.len()
    }

    pub fn edge_count(&self) -> usize {
        self.states.values().map(|s| s.adjacency.len()).sum()
    }

    pub fn has_edge(&self, from: u16, to: u16) -> bool {
        self.states
            .get(&from)
            .is_some_and(|s| s.adjacency.contains(&to))
    }

    /// 记录观测到的状态：必要时新建顶点，若之前已有状态则登记一条转移，
    /// 然后无条件更新最近状态。返回是否新增了转移。
    pub fn observe(&mut self, state: u16) -> bool {
        self.states
            .entry(state)
            .or_insert_with(|| StateNode::new(state));

        let added = match self.last_state {
            Some(last) => self.register_transition(last, state),
            None => false,
        };
        self.last_state = Some(state);
        added
    }

    /// 登记 from -> to；重复登记不产生新边。源状态必须已经存在。
    fn register_transition(&mut self, from: u16, to: u16) -> bool {
        let Some(src) = self.states.get_mut(&from) else {
            panic!(
                "transition {from} -> {to} in context {}: source state was never registered",
                self.context
            );
        };
        let added = src.adjacency.insert(to);
        if added {
            trace!(context = self.context, from, to, "新增转移");
        }
        added
    }
}
