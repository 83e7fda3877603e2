//! 追踪文件写入器
//!
//! 与记录端相同的编码方式：写文件头，然后逐条追加记录。用于合成追踪文件。

use std::io::{self, Write};

use super::event::{Event, EventKind, MonData, NodePosition};
use super::scope::{NodeTime, Scope, ScopeFlags};
use super::{MAGIC, MAJOR_VERSION, MINOR_VERSION};

/// 追踪文件写入器
///
/// 写出的记录都能被 [`TraceReader`](super::TraceReader) 原样读回。例外：作用域中的 UNKNOWN
/// 位没有对应的字段可写，读回 -> 写出 -> 再读回时会丢失。
pub struct TraceWriter<W: Write> {
    out: W,
}

impl<W: Write> TraceWriter<W> {
    /// 以当前版本号写入文件头
    pub fn new(out: W) -> io::Result<Self> {
        Self::with_version(out, MAJOR_VERSION, MINOR_VERSION)
    }

    /// 以指定版本号写入文件头
    pub fn with_version(mut out: W, major: u32, minor: u32) -> io::Result<Self> {
        out.write_all(&MAGIC)?;
        out.write_all(&major.to_be_bytes())?;
        out.write_all(&minor.to_be_bytes())?;
        Ok(TraceWriter { out })
    }

    /// 追加一条记录。作用域中的 UNKNOWN 位不会被写出。
    pub fn write(&mut self, scope: &Scope, event: &Event) -> io::Result<()> {
        let mut rec = Vec::with_capacity(64);

        let flags = scope.flags().bits() & ScopeFlags::DECODED_BITS;
        rec.extend_from_slice(&flags.to_be_bytes());
        if let Some(sim_us) = scope.sim_us() {
            rec.extend_from_slice(&sim_us.to_be_bytes());
        }
        if let Some((nid, node_time)) = scope.node() {
            rec.extend_from_slice(&nid.to_be_bytes());
            put_node_time(&mut rec, node_time);
        }

        let raw = match event {
            // 0 保留；已知编号的负载长度固定，写成未知事件会被读取方拒绝
            Event::Unknown { raw } if *raw == 0 || EventKind::from_wire(*raw).is_some() => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("event type {raw} cannot be written as an unknown event"),
                ));
            }
            Event::Unknown { raw } => *raw,
            other => other.kind().wire().unwrap_or_default(),
        };
        let payload = encode_payload(event)?;
        let len = u32::try_from(payload.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "event payload too large"))?;

        rec.extend_from_slice(&raw.to_be_bytes());
        rec.extend_from_slice(&len.to_be_bytes());
        rec.extend_from_slice(&payload);

        self.out.write_all(&rec)?;
        Ok(())
    }

    /// 刷新并取回底层输出
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn encode_payload(event: &Event) -> io::Result<Vec<u8>> {
    let mut p = Vec::new();
    match event {
        Event::Unknown { .. } | Event::NodeCreate | Event::NodeDestroy => {}
        Event::MonCreate(ev) => {
            put_node_time(&mut p, ev.state_offset);
            put_node_time(&mut p, ev.data_offset);
            put_node_time(&mut p, ev.byte_offset);
            p.push(ev.byte_order.as_u8());
        }
        Event::MonState(ev) => {
            p.extend_from_slice(&ev.context.to_be_bytes());
            p.extend_from_slice(&ev.entity.to_be_bytes());
            p.extend_from_slice(&ev.state.to_be_bytes());
        }
        Event::MonData(MonData {
            context,
            entity,
            data,
        }) => {
            let length = u32::try_from(data.len())
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "data event too large"))?;
            p.extend_from_slice(&context.to_be_bytes());
            p.extend_from_slice(&entity.to_be_bytes());
            p.extend_from_slice(&length.to_be_bytes());
            p.extend_from_slice(data);
        }
        Event::NodePosition(NodePosition { x, y, z }) => {
            p.extend_from_slice(&x.to_be_bytes());
            p.extend_from_slice(&y.to_be_bytes());
            p.extend_from_slice(&z.to_be_bytes());
        }
    }
    Ok(p)
}

fn put_node_time(buf: &mut Vec<u8>, t: NodeTime) {
    buf.extend_from_slice(&t.cycles.to_be_bytes());
    buf.extend_from_slice(&t.node_ms.to_be_bytes());
}
