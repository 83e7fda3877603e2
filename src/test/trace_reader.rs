use super::{encode, state};
use crate::trace::{
    ByteOrder, Event, EventKind, MAGIC, MAX_PAYLOAD_LEN, MonCreate, MonData, NodePosition,
    NodeTime, Scope, ScopeFlags, TraceError, TraceReader, TraceWriter,
};

fn header() -> Vec<u8> {
    let mut b = MAGIC.to_vec();
    b.extend_from_slice(&1u32.to_be_bytes());
    b.extend_from_slice(&0u32.to_be_bytes());
    b
}

/// 只带仿真作用域的事件头
fn raw_event(buf: &mut Vec<u8>, raw: u16, payload: &[u8]) {
    buf.extend_from_slice(&ScopeFlags::SIMULATION.bits().to_be_bytes());
    buf.extend_from_slice(&1.5f64.to_be_bytes());
    buf.extend_from_slice(&raw.to_be_bytes());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);
}

fn open(bytes: &[u8]) -> TraceReader<&[u8]> {
    TraceReader::open(bytes).expect("open trace")
}

#[test]
fn decodes_every_event_kind_with_its_scope() {
    let node_time = NodeTime {
        cycles: 123_456_789_012,
        node_ms: 42.25,
    };
    let records = vec![
        (
            Scope::for_node(3, node_time),
            Event::MonCreate(MonCreate {
                state_offset: NodeTime {
                    cycles: 1,
                    node_ms: 0.5,
                },
                data_offset: NodeTime {
                    cycles: 2,
                    node_ms: 1.5,
                },
                byte_offset: NodeTime {
                    cycles: 3,
                    node_ms: 2.5,
                },
                byte_order: ByteOrder::Little,
            }),
        ),
        (Scope::simulation(10.0).with_node(3, node_time), state(7, 1, 2)),
        (
            Scope::simulation(11.0),
            Event::MonData(MonData {
                context: 7,
                entity: 1,
                data: vec![0xde, 0xad, 0xbe, 0xef],
            }),
        ),
        (Scope::default(), Event::NodeCreate),
        (Scope::simulation(12.0), Event::NodeDestroy),
        (
            Scope::simulation(13.0),
            Event::NodePosition(NodePosition {
                x: 1.0,
                y: -2.5,
                z: 1e9,
            }),
        ),
        (
            Scope::simulation(14.0),
            Event::MonData(MonData {
                context: 1,
                entity: 0,
                data: Vec::new(),
            }),
        ),
    ];

    let bytes = encode(&records);
    let mut reader = open(&bytes);
    assert_eq!(reader.major(), 1);
    assert_eq!(reader.minor(), 0);

    for (scope, event) in &records {
        let rec = reader.next_record().expect("decode").expect("record");
        assert_eq!(&rec.scope, scope);
        assert_eq!(&rec.event, event);
    }
    assert!(reader.next_record().expect("end of trace").is_none());
    assert_eq!(reader.records_read(), records.len() as u64);
    reader.close().expect("close");
}

#[test]
fn scope_fields_are_only_exposed_when_flagged() {
    let node_time = NodeTime {
        cycles: 9,
        node_ms: 0.125,
    };
    let bytes = encode(&[
        (Scope::simulation(5.0), Event::NodeCreate),
        (Scope::for_node(2, node_time), Event::NodeCreate),
    ]);
    let mut reader = open(&bytes);

    let sim = reader.next_record().unwrap().unwrap().scope;
    assert_eq!(sim.flags(), ScopeFlags::SIMULATION);
    assert_eq!(sim.sim_us(), Some(5.0));
    assert!(sim.node().is_none());

    let node = reader.next_record().unwrap().unwrap().scope;
    assert_eq!(node.flags(), ScopeFlags::NODE);
    assert!(node.sim_us().is_none());
    assert_eq!(node.node(), Some((2, node_time)));
}

#[test]
fn header_only_trace_ends_cleanly() {
    let bytes = header();
    let mut reader = open(&bytes);
    assert!(reader.next_record().unwrap().is_none());
    assert!(reader.next_record().unwrap().is_none());
    assert_eq!(reader.records().count(), 0);
}

#[test]
fn corrupted_magic_is_rejected_before_any_record() {
    let mut bytes = encode(&[(Scope::simulation(0.0), state(7, 0, 1))]);
    bytes[0] = b'x';
    match TraceReader::open(&bytes[..]) {
        Err(TraceError::BadMagic { found }) => assert_eq!(&found, b"xtkt"),
        Err(e) => panic!("expected BadMagic, got {e}"),
        Ok(_) => panic!("expected BadMagic"),
    }
}

#[test]
fn major_version_must_match_but_newer_minor_is_accepted() {
    let w = TraceWriter::with_version(Vec::new(), 2, 0).unwrap();
    let bytes = w.finish().unwrap();
    assert!(matches!(
        TraceReader::open(&bytes[..]),
        Err(TraceError::MajorMismatch {
            found: 2,
            expected: 1
        })
    ));

    let w = TraceWriter::with_version(Vec::new(), 1, 7).unwrap();
    let bytes = w.finish().unwrap();
    let reader = open(&bytes);
    assert_eq!(reader.minor(), 7);
}

#[test]
fn short_header_is_a_short_read() {
    assert!(matches!(
        TraceReader::open(&[][..]),
        Err(TraceError::ShortRead)
    ));
    assert!(matches!(
        TraceReader::open(&MAGIC[..]),
        Err(TraceError::ShortRead)
    ));
}

#[test]
fn trace_ending_mid_record_is_a_short_read() {
    let full = encode(&[
        (Scope::simulation(0.0), state(7, 0, 1)),
        (Scope::simulation(1.0), state(7, 0, 2)),
    ]);

    // 截掉最后一个字节：第一条完整，第二条截断
    let bytes = &full[..full.len() - 1];
    let mut reader = open(bytes);
    assert!(reader.next_record().unwrap().is_some());
    assert!(matches!(reader.next_record(), Err(TraceError::ShortRead)));

    // 截断在作用域位掩码中间
    let mut bytes = header();
    bytes.extend_from_slice(&[0, 0]);
    let mut reader = open(&bytes);
    assert!(matches!(reader.next_record(), Err(TraceError::ShortRead)));
}

#[test]
fn oversized_payload_is_rejected() {
    let mut bytes = header();
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(&3u16.to_be_bytes());
    bytes.extend_from_slice(&(MAX_PAYLOAD_LEN + 1).to_be_bytes());

    let mut reader = open(&bytes);
    assert!(matches!(
        reader.next_record(),
        Err(TraceError::TooLarge { .. })
    ));
}

#[test]
fn length_fields_must_agree() {
    // 状态事件固定 6 字节
    let mut bytes = header();
    raw_event(&mut bytes, 2, &[0, 7, 0, 0, 0]);
    let mut reader = open(&bytes);
    match reader.next_record() {
        Err(TraceError::Inconsistent {
            declared, expected, ..
        }) => {
            assert_eq!(declared, 5);
            assert_eq!(expected, 6);
        }
        other => panic!("expected Inconsistent, got {other:?}"),
    }

    // 数据事件内部长度与负载长度不符
    let mut payload = vec![0, 1, 0, 2];
    payload.extend_from_slice(&10u32.to_be_bytes());
    payload.extend_from_slice(&[1, 2, 3]);
    let mut bytes = header();
    raw_event(&mut bytes, 3, &payload);
    let mut reader = open(&bytes);
    assert!(matches!(
        reader.next_record(),
        Err(TraceError::Inconsistent {
            what: "mon_data",
            ..
        })
    ));
}

#[test]
fn reserved_event_type_and_bad_byte_order_are_invalid() {
    let mut bytes = header();
    raw_event(&mut bytes, 0, &[]);
    let mut reader = open(&bytes);
    assert!(matches!(
        reader.next_record(),
        Err(TraceError::InvalidFormat {
            what: "event type",
            ..
        })
    ));

    let mut payload = vec![0u8; 48];
    payload.push(b'x');
    let mut bytes = header();
    raw_event(&mut bytes, 1, &payload);
    let mut reader = open(&bytes);
    assert!(matches!(
        reader.next_record(),
        Err(TraceError::InvalidFormat {
            what: "byte order",
            raw: 0x78
        })
    ));
}

#[test]
fn unknown_event_kind_is_skipped_and_reported() {
    let mut bytes = header();
    raw_event(&mut bytes, 42, &[9, 9, 9, 9, 9]);
    raw_event(&mut bytes, 2, &[0, 7, 0, 1, 0, 3]);

    let mut reader = open(&bytes);
    let first = reader.next_record().unwrap().unwrap();
    assert_eq!(first.event, Event::Unknown { raw: 42 });
    assert_eq!(first.event.kind(), EventKind::Unknown);

    let second = reader.next_record().unwrap().unwrap();
    assert_eq!(second.event, state(7, 1, 3));
    assert!(reader.next_record().unwrap().is_none());
}

#[test]
fn unknown_scope_bits_are_skipped_and_flagged() {
    let mut bytes = header();
    bytes.extend_from_slice(&(ScopeFlags::SIMULATION.bits() | 0x8 | 0x20).to_be_bytes());
    bytes.extend_from_slice(&2.0f64.to_be_bytes());
    // 0x8：3 字节
    bytes.extend_from_slice(&3u16.to_be_bytes());
    bytes.extend_from_slice(&[1, 2, 3]);
    // 0x20：空
    bytes.extend_from_slice(&0u16.to_be_bytes());
    bytes.extend_from_slice(&4u16.to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());

    let mut reader = open(&bytes);
    let rec = reader.next_record().unwrap().unwrap();
    assert!(rec.scope.flags().contains(ScopeFlags::UNKNOWN));
    assert!(rec.scope.flags().contains(ScopeFlags::SIMULATION));
    assert_eq!(rec.scope.sim_us(), Some(2.0));
    assert_eq!(rec.event, Event::NodeCreate);
}

#[test]
fn records_iterator_stops_after_first_error() {
    let full = encode(&[
        (Scope::simulation(0.0), state(7, 0, 1)),
        (Scope::simulation(1.0), state(7, 0, 2)),
    ]);
    let bytes = &full[..full.len() - 2];
    let mut reader = open(bytes);

    let items: Vec<_> = reader.records().collect();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(TraceError::ShortRead)));
}

#[test]
fn unknown_event_round_trips_only_for_unassigned_types() {
    let mut w = TraceWriter::new(Vec::new()).unwrap();
    w.write(&Scope::simulation(1.0), &Event::Unknown { raw: 42 })
        .expect("unassigned type is writable");

    // 0 保留，1..=6 已有固定含义，写出的记录读取方会拒绝
    for raw in [0u16, 1, 2, 6] {
        let err = w
            .write(&Scope::simulation(2.0), &Event::Unknown { raw })
            .expect_err("reserved or known type");
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    let bytes = w.finish().unwrap();
    let mut reader = open(&bytes);
    let rec = reader.next_record().unwrap().unwrap();
    assert_eq!(rec.event, Event::Unknown { raw: 42 });
    assert!(reader.next_record().unwrap().is_none());
}

#[test]
fn rewriting_a_record_drops_unknown_scope_bits() {
    let mut bytes = header();
    bytes.extend_from_slice(&(ScopeFlags::SIMULATION.bits() | 0x8).to_be_bytes());
    bytes.extend_from_slice(&3.0f64.to_be_bytes());
    bytes.extend_from_slice(&1u16.to_be_bytes());
    bytes.push(0xff);
    bytes.extend_from_slice(&5u16.to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());

    let rec = open(&bytes).next_record().unwrap().unwrap();
    assert!(rec.scope.flags().contains(ScopeFlags::UNKNOWN));

    let mut w = TraceWriter::new(Vec::new()).unwrap();
    w.write(&rec.scope, &rec.event).unwrap();
    let rewritten = w.finish().unwrap();

    let again = open(&rewritten).next_record().unwrap().unwrap();
    assert_eq!(again.scope.flags(), ScopeFlags::SIMULATION);
    assert_eq!(again.scope.sim_us(), Some(3.0));
    assert_eq!(again.event, Event::NodeDestroy);
}
