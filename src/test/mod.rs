mod trace_reader;

use crate::trace::{Event, MonState, Scope, TraceWriter};

/// 用写入器把一串记录编码成完整的追踪字节
fn encode(records: &[(Scope, Event)]) -> Vec<u8> {
    let mut w = TraceWriter::new(Vec::new()).expect("write header");
    for (scope, event) in records {
        w.write(scope, event).expect("write record");
    }
    w.finish().expect("finish trace")
}

fn state(context: u16, entity: u16, state: u16) -> Event {
    Event::MonState(MonState {
        context,
        entity,
        state,
    })
}

/// 同一上下文、同一实体的一串状态事件
fn state_trace(context: u16, states: &[u16]) -> Vec<u8> {
    let records: Vec<_> = states
        .iter()
        .enumerate()
        .map(|(i, &st)| (Scope::simulation(i as f64 * 10.0), state(context, 0, st)))
        .collect();
    encode(&records)
}
