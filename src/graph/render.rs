//! dot 格式输出

use std::borrow::Cow;
use std::io::{self, Write};

use super::context_graph::ContextGraph;
use crate::names::NameRegistry;

/// 输出一个上下文的 `digraph` 块。
///
/// 每个状态都会输出顶点语句（即使没有出边），随后是它的所有出边。
pub fn write_context_graph(
    graph: &ContextGraph,
    names: &NameRegistry,
    out: &mut dyn Write,
) -> io::Result<()> {
    let context = graph.context();
    writeln!(out, "digraph \"{}\" {{", escape(&names.context_name(context)))?;

    for node in graph.states() {
        let from = names.state_name(context, node.state());
        let from = escape(&from);
        writeln!(out, "\"{from}\";")?;
        for succ in node.successors() {
            let to = names.state_name(context, succ);
            writeln!(out, "\"{from}\" -> \"{}\";", escape(&to))?;
        }
    }

    writeln!(out, "}}")
}

// 名称来自外部名称表，可能包含引号。
fn escape(name: &str) -> Cow<'_, str> {
    if name.contains(['"', '\\']) {
        Cow::Owned(name.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        Cow::Borrowed(name)
    }
}
