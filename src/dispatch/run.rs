//! 分发循环

use std::io::Read;
use std::ops::ControlFlow;

use super::error::DispatchError;
use super::handler::{EventHandler, Flow};
use crate::trace::{Event, EventKind, Record, Scope, TraceReader};
use tracing::{debug, info};

/// 用一个通用回调消费整个追踪，返回分发的记录数。
///
/// 回调返回 `Break` 或读取出错时立即停止，剩余记录不再读取。
#[tracing::instrument(skip(trace, callback), fields(major = trace.major(), minor = trace.minor()))]
pub fn run<R, F>(trace: &mut TraceReader<R>, mut callback: F) -> Result<u64, DispatchError>
where
    R: Read,
    F: FnMut(&Scope, EventKind, Event) -> Flow,
{
    info!("▶️  开始分发事件");

    let mut count = 0u64;
    while let Some(Record { scope, event }) = trace.next_record()? {
        count += 1;
        let kind = event.kind();
        if let ControlFlow::Break(code) = callback(&scope, kind, event) {
            info!(record = count, code, kind = kind.as_str(), "消费者取消分发");
            return Err(DispatchError::Cancelled {
                code,
                record: count,
            });
        }
    }

    info!(total_records = count, "✅ 分发完成");
    Ok(count)
}

/// 用按类型实现的消费者处理整个追踪。
pub fn run_typed<R, H>(trace: &mut TraceReader<R>, handler: &mut H) -> Result<u64, DispatchError>
where
    R: Read,
    H: EventHandler + ?Sized,
{
    run(trace, |scope, _kind, event| dispatch_event(&mut *handler, scope, event))
}

/// 把单个事件路由到消费者的对应方法
pub fn dispatch_event<H>(handler: &mut H, scope: &Scope, event: Event) -> Flow
where
    H: EventHandler + ?Sized,
{
    match event {
        Event::Unknown { raw } => {
            debug!(raw, "未知事件");
            handler.unknown(scope, raw)
        }
        Event::MonCreate(ev) => handler.mon_create(scope, &ev),
        Event::MonState(ev) => handler.mon_state(scope, &ev),
        Event::MonData(ev) => handler.mon_data(scope, ev),
        Event::NodeCreate => handler.node_create(scope),
        Event::NodeDestroy => handler.node_destroy(scope),
        Event::NodePosition(ev) => handler.node_position(scope, &ev),
    }
}
