//! 追踪文件读取器
//!
//! 逐条解码记录。读取是阻塞的，不做重试：格式错误或截断的追踪对本次运行是终止条件。

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use super::error::TraceError;
use super::event::{ByteOrder, Event, EventKind, MonCreate, MonData, MonState, NodePosition, Record};
use super::scope::{NodeTime, Scope, ScopeFlags};
use super::{HEADER_LEN, MAGIC, MAJOR_VERSION, MAX_PAYLOAD_LEN, MINOR_VERSION};
use tracing::{debug, trace};

/// 已打开的追踪文件
pub struct TraceReader<R> {
    input: R,
    major: u32,
    minor: u32,
    /// 事件负载的复用缓冲区
    buf: Vec<u8>,
    records: u64,
}

impl TraceReader<BufReader<File>> {
    /// 打开磁盘上的追踪文件
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let file = File::open(path.as_ref()).map_err(TraceError::Io)?;
        Self::open(BufReader::new(file))
    }
}

impl<R: Read> TraceReader<R> {
    /// 读取并校验文件头。
    pub fn open(mut input: R) -> Result<Self, TraceError> {
        let mut header = [0u8; HEADER_LEN];
        input.read_exact(&mut header)?;

        let found: [u8; 4] = read_fixed(&header, 0);
        if found != MAGIC {
            return Err(TraceError::BadMagic { found });
        }

        let major = u32::from_be_bytes(read_fixed(&header, 4));
        let minor = u32::from_be_bytes(read_fixed(&header, 8));
        if major != MAJOR_VERSION {
            return Err(TraceError::MajorMismatch {
                found: major,
                expected: MAJOR_VERSION,
            });
        }
        if minor > MINOR_VERSION {
            debug!(minor, supported = MINOR_VERSION, "追踪文件次版本较新，新增的作用域/事件将按未知处理");
        }

        debug!(major, minor, "打开追踪文件");
        Ok(TraceReader {
            input,
            major,
            minor,
            buf: Vec::new(),
            records: 0,
        })
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// 已成功解码的记录数
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /// 解码下一条记录。
    ///
    /// 流恰好在记录边界结束时返回 `Ok(None)`；在记录中途结束返回 [`TraceError::ShortRead`]。
    pub fn next_record(&mut self) -> Result<Option<Record>, TraceError> {
        let mut mask = [0u8; 4];
        if !self.read_record_start(&mut mask)? {
            trace!(records = self.records, "到达追踪末尾");
            return Ok(None);
        }

        let scope = self.read_scope(u32::from_be_bytes(mask))?;
        let event = self.read_event()?;
        self.records += 1;

        trace!(
            record = self.records,
            scope = scope.flags().bits(),
            kind = event.kind().as_str(),
            "解码记录"
        );
        Ok(Some(Record { scope, event }))
    }

    /// 按顺序迭代剩余记录，遇到末尾或第一个错误后停止。
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            reader: self,
            done: false,
        }
    }

    /// 关闭追踪，释放内部缓冲区。
    pub fn close(self) -> Result<(), TraceError> {
        debug!(records = self.records, "关闭追踪文件");
        Ok(())
    }

    /// 读取记录的第一个字段；一个字节都读不到说明追踪正常结束。
    fn read_record_start(&mut self, out: &mut [u8]) -> Result<bool, TraceError> {
        let mut filled = 0;
        while filled < out.len() {
            match self.input.read(&mut out[filled..]) {
                Ok(0) if filled == 0 => return Ok(false),
                Ok(0) => return Err(TraceError::ShortRead),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }

    fn read_scope(&mut self, raw: u32) -> Result<Scope, TraceError> {
        let mut scope = Scope::default();

        // 字段顺序固定：先仿真作用域，再节点作用域。
        if raw & ScopeFlags::SIMULATION.bits() != 0 {
            scope.sim_us = f64::from_be_bytes(self.read_array()?);
            scope.flags.insert(ScopeFlags::SIMULATION);
        }
        if raw & ScopeFlags::NODE.bits() != 0 {
            scope.nid = u16::from_be_bytes(self.read_array()?);
            scope.node_time = NodeTime {
                cycles: u64::from_be_bytes(self.read_array()?),
                node_ms: f64::from_be_bytes(self.read_array()?),
            };
            scope.flags.insert(ScopeFlags::NODE);
        }

        // 其余作用域来自更新的次版本，各自带长度前缀，按位从低到高跳过。
        let mut unknown = raw & !ScopeFlags::DECODED_BITS;
        while unknown != 0 {
            let bit = unknown & unknown.wrapping_neg();
            let len = u16::from_be_bytes(self.read_array()?);
            self.skip(u64::from(len))?;
            trace!(bit, len, "跳过未知作用域");
            unknown &= !bit;
            scope.flags.insert(ScopeFlags::UNKNOWN);
        }

        Ok(scope)
    }

    fn read_event(&mut self) -> Result<Event, TraceError> {
        let raw = u16::from_be_bytes(self.read_array()?);
        let len = u32::from_be_bytes(self.read_array()?);

        if raw == 0 {
            return Err(TraceError::InvalidFormat {
                what: "event type",
                raw: 0,
            });
        }
        if len > MAX_PAYLOAD_LEN {
            return Err(TraceError::TooLarge {
                what: "event payload",
                len: u64::from(len),
                max: u64::from(MAX_PAYLOAD_LEN),
            });
        }

        let Some(kind) = EventKind::from_wire(raw) else {
            self.skip(u64::from(len))?;
            trace!(raw, len, "跳过未知事件");
            return Ok(Event::Unknown { raw });
        };

        if let Some(expected) = kind.fixed_len() {
            if len != expected {
                return Err(TraceError::Inconsistent {
                    what: kind.as_str(),
                    declared: u64::from(len),
                    expected: u64::from(expected),
                });
            }
        }

        self.fill_buf(len as usize)?;
        decode_event(raw, kind, &self.buf)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TraceError> {
        let mut out = [0u8; N];
        self.input.read_exact(&mut out)?;
        Ok(out)
    }

    fn fill_buf(&mut self, len: usize) -> Result<(), TraceError> {
        self.buf.clear();
        self.buf
            .try_reserve_exact(len)
            .map_err(|_| TraceError::OutOfMemory { len })?;
        self.buf.resize(len, 0);
        self.input.read_exact(&mut self.buf)?;
        Ok(())
    }

    fn skip(&mut self, len: u64) -> Result<(), TraceError> {
        let skipped = io::copy(&mut (&mut self.input).take(len), &mut io::sink())?;
        if skipped != len {
            return Err(TraceError::ShortRead);
        }
        Ok(())
    }
}

/// [`TraceReader::records`] 返回的迭代器
pub struct Records<'a, R> {
    reader: &'a mut TraceReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<Record, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 负载解码（调用前已校验长度）
// ---------------------------------------------------------------------------

fn decode_event(raw: u16, kind: EventKind, payload: &[u8]) -> Result<Event, TraceError> {
    let event = match kind {
        EventKind::MonCreate => {
            let raw_order = payload[48];
            let byte_order =
                ByteOrder::from_u8(raw_order).ok_or(TraceError::InvalidFormat {
                    what: "byte order",
                    raw: u32::from(raw_order),
                })?;
            Event::MonCreate(MonCreate {
                state_offset: read_node_time(payload, 0),
                data_offset: read_node_time(payload, 16),
                byte_offset: read_node_time(payload, 32),
                byte_order,
            })
        }
        EventKind::MonState => Event::MonState(MonState {
            context: read_u16(payload, 0),
            entity: read_u16(payload, 2),
            state: read_u16(payload, 4),
        }),
        EventKind::MonData => Event::MonData(decode_mon_data(payload)?),
        EventKind::NodeCreate => Event::NodeCreate,
        EventKind::NodeDestroy => Event::NodeDestroy,
        EventKind::NodePosition => Event::NodePosition(NodePosition {
            x: read_f64(payload, 0),
            y: read_f64(payload, 8),
            z: read_f64(payload, 16),
        }),
        EventKind::Unknown => {
            return Err(TraceError::InvalidFormat {
                what: "event type",
                raw: u32::from(raw),
            });
        }
    };
    Ok(event)
}

fn decode_mon_data(payload: &[u8]) -> Result<MonData, TraceError> {
    let header = MonData::HEADER_LEN as usize;
    if payload.len() < header {
        return Err(TraceError::Inconsistent {
            what: "mon_data",
            declared: payload.len() as u64,
            expected: header as u64,
        });
    }

    let length = read_u32(payload, 4);
    let expected = header as u64 + u64::from(length);
    if expected != payload.len() as u64 {
        return Err(TraceError::Inconsistent {
            what: "mon_data",
            declared: payload.len() as u64,
            expected,
        });
    }

    let bytes = &payload[header..];
    let mut data = Vec::new();
    data.try_reserve_exact(bytes.len())
        .map_err(|_| TraceError::OutOfMemory { len: bytes.len() })?;
    data.extend_from_slice(bytes);

    Ok(MonData {
        context: read_u16(payload, 0),
        entity: read_u16(payload, 2),
        data,
    })
}

fn read_fixed<const N: usize>(data: &[u8], offset: usize) -> [u8; N] {
    debug_assert!(offset + N <= data.len());
    let mut out = [0u8; N];
    out.copy_from_slice(&data[offset..offset + N]);
    out
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes(read_fixed(data, offset))
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes(read_fixed(data, offset))
}

fn read_f64(data: &[u8], offset: usize) -> f64 {
    f64::from_be_bytes(read_fixed(data, offset))
}

fn read_node_time(data: &[u8], offset: usize) -> NodeTime {
    NodeTime {
        cycles: u64::from_be_bytes(read_fixed(data, offset)),
        node_ms: read_f64(data, offset + 8),
    }
}
