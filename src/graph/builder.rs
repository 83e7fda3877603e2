//! 自动机构建器（graph 输出模式）

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::ops::ControlFlow;

use super::context_graph::ContextGraph;
use super::render::write_context_graph;
use crate::dispatch::{EventHandler, Flow};
use crate::mode::OutputMode;
use crate::names::NameRegistry;
use crate::trace::{MonCreate, MonData, MonState, NodePosition, Scope};
use tracing::{debug, info};

/// 按上下文累积状态自动机。
///
/// 只看状态事件，其余事件一律忽略。同一上下文内不同实体的状态会交织进同一个自动机。
pub struct GraphBuilder<'a> {
    names: &'a NameRegistry,
    contexts: BTreeMap<u16, ContextGraph>,
    state_events: u64,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(names: &'a NameRegistry) -> Self {
        GraphBuilder {
            names,
            contexts: BTreeMap::new(),
            state_events: 0,
        }
    }

    pub fn context(&self, context: u16) -> Option<&ContextGraph> {
        self.contexts.get(&context)
    }

    /// 按编号升序迭代各上下文的自动机
    pub fn contexts(&self) -> impl Iterator<Item = &ContextGraph> {
        self.contexts.values()
    }

    /// 处理一个状态事件
    pub fn observe(&mut self, event: &MonState) {
        self.state_events += 1;
        let graph = self.contexts.entry(event.context).or_insert_with(|| {
            debug!(context = event.context, "新建上下文自动机");
            ContextGraph::new(event.context)
        });
        graph.observe(event.state);
    }

    /// 依次输出每个上下文的 dot 图
    pub fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        for graph in self.contexts.values() {
            write_context_graph(graph, self.names, out)?;
        }
        Ok(())
    }
}

impl EventHandler for GraphBuilder<'_> {
    fn unknown(&mut self, _scope: &Scope, _raw: u16) -> Flow {
        ControlFlow::Continue(())
    }

    fn mon_create(&mut self, _scope: &Scope, _event: &MonCreate) -> Flow {
        ControlFlow::Continue(())
    }

    fn mon_state(&mut self, _scope: &Scope, event: &MonState) -> Flow {
        self.observe(event);
        ControlFlow::Continue(())
    }

    fn mon_data(&mut self, _scope: &Scope, _event: MonData) -> Flow {
        ControlFlow::Continue(())
    }

    fn node_create(&mut self, _scope: &Scope) -> Flow {
        ControlFlow::Continue(())
    }

    fn node_destroy(&mut self, _scope: &Scope) -> Flow {
        ControlFlow::Continue(())
    }

    fn node_position(&mut self, _scope: &Scope, _event: &NodePosition) -> Flow {
        ControlFlow::Continue(())
    }
}

impl OutputMode for GraphBuilder<'_> {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn description(&self) -> &'static str {
        "输出各组件自动机的 dot 图"
    }

    fn before(&mut self) {
        self.contexts.clear();
        self.state_events = 0;
    }

    fn after(&mut self, out: &mut dyn Write) -> io::Result<()> {
        info!(
            contexts = self.contexts.len(),
            state_events = self.state_events,
            "输出自动机"
        );
        let rendered = self.render(out);
        self.contexts.clear();
        rendered
    }
}
