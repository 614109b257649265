//! Synthesises RP trace files for integration tests.

#![allow(dead_code)]

use rp_trace_studio::parser::ByteOrder;
use rp_trace_studio::utils::config::TRACE_MAGIC;
use serde_json::Value;

pub const RUNNABLE: u32 = 0x04;
pub const WAITING: u32 = 0x80;
pub const WAITING_INDEFINITELY: u32 = 0x10;
pub const BLOCKED_ON_MONITOR: u32 = 0x400;

pub const TAG_GC: u32 = 1;
pub const TAG_GAME_STATE: u32 = 0x10001;
pub const TAG_GAME_TICK: u32 = 0x10002;

/// One thread's sample within a tick
#[derive(Debug, Clone)]
pub struct ThreadSample {
    pub state: u32,
    /// Leaf first, as written by the profiler
    pub frames: Vec<u32>,
}

impl ThreadSample {
    pub fn running(frames: &[u32]) -> Self {
        Self {
            state: RUNNABLE,
            frames: frames.to_vec(),
        }
    }

    pub fn with_state(state: u32, frames: &[u32]) -> Self {
        Self {
            state,
            frames: frames.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tick {
    pub delta_nanos: u32,
    /// heap used, heap committed, off-heap used, off-heap committed
    pub memory: [u64; 4],
    pub threads: Vec<ThreadSample>,
    pub event_delta_nanos: u32,
    /// Raw marker words, without the trailing zero tag
    pub markers: Vec<u32>,
}

impl Tick {
    pub fn new(delta_nanos: u32, threads: Vec<ThreadSample>) -> Self {
        Self {
            delta_nanos,
            memory: [0; 4],
            threads,
            event_delta_nanos: delta_nanos,
            markers: Vec::new(),
        }
    }

    pub fn memory(mut self, heap_used: u64, offheap_used: u64) -> Self {
        self.memory = [heap_used, heap_used, offheap_used, offheap_used];
        self
    }

    pub fn markers(mut self, words: &[u32]) -> Self {
        self.markers = words.to_vec();
        self
    }
}

/// Builder for a complete trace file
#[derive(Debug, Clone)]
pub struct TraceBuilder {
    order: ByteOrder,
    duration_micros: u64,
    metadata: String,
    threads: Vec<String>,
    methods: Vec<(u32, String, String, String)>,
    ticks: Vec<Tick>,
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self {
            order: ByteOrder::Little,
            duration_micros: 0,
            metadata: "{}".to_string(),
            threads: Vec::new(),
            methods: Vec::new(),
            ticks: Vec::new(),
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.order = ByteOrder::Big;
        self
    }

    pub fn duration_micros(mut self, micros: u64) -> Self {
        self.duration_micros = micros;
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata.to_string();
        self
    }

    pub fn raw_metadata(mut self, text: &str) -> Self {
        self.metadata = text.to_string();
        self
    }

    pub fn thread(mut self, name: &str) -> Self {
        self.threads.push(name.to_string());
        self
    }

    /// `class` is a JVM descriptor such as `Lcom/foo/Bar;`
    pub fn method(mut self, id: u32, class: &str, name: &str, signature: &str) -> Self {
        self.methods
            .push((id, class.to_string(), name.to_string(), signature.to_string()));
        self
    }

    pub fn tick(mut self, tick: Tick) -> Self {
        self.ticks.push(tick);
        self
    }

    pub fn header_section(&self) -> Vec<u8> {
        let mut w = Writer::new(self.order);
        w.u64(self.ticks.len() as u64);
        w.u64(self.duration_micros);
        w.u64(self.metadata.len() as u64);
        w.u64(self.threads.len() as u64);
        w.u64(self.methods.len() as u64);
        w.raw(self.metadata.as_bytes());
        for name in &self.threads {
            w.cstr(name);
        }
        for (id, class, name, signature) in &self.methods {
            w.u32(*id);
            w.cstr(class);
            w.cstr(name);
            w.cstr(signature);
        }
        w.bytes
    }

    pub fn sample_section(&self) -> Vec<u8> {
        let mut w = Writer::new(self.order);
        for tick in &self.ticks {
            w.u32(tick.delta_nanos);
            for value in tick.memory {
                w.u64(value);
            }
            for sample in &tick.threads {
                w.u32(sample.state);
                w.u32(sample.frames.len() as u32);
                for &frame in &sample.frames {
                    w.u32(frame);
                }
                w.u32(0);
            }
            w.u32(tick.event_delta_nanos);
            for &word in &tick.markers {
                w.u32(word);
            }
            w.u32(0);
        }
        w.bytes
    }

    pub fn build(&self) -> Vec<u8> {
        let header = zstd::stream::encode_all(&self.header_section()[..], 3).unwrap();
        let samples = zstd::stream::encode_all(&self.sample_section()[..], 3).unwrap();

        let mut w = Writer::new(self.order);
        w.u16(TRACE_MAGIC);
        w.u64(header.len() as u64);
        w.raw(&header);
        w.raw(&samples);
        w.bytes
    }
}

struct Writer {
    order: ByteOrder,
    bytes: Vec<u8>,
}

impl Writer {
    fn new(order: ByteOrder) -> Self {
        Self {
            order,
            bytes: Vec::new(),
        }
    }

    fn u16(&mut self, v: u16) {
        match self.order {
            ByteOrder::Little => self.raw(&v.to_le_bytes()),
            ByteOrder::Big => self.raw(&v.to_be_bytes()),
        }
    }

    fn u32(&mut self, v: u32) {
        match self.order {
            ByteOrder::Little => self.raw(&v.to_le_bytes()),
            ByteOrder::Big => self.raw(&v.to_be_bytes()),
        }
    }

    fn u64(&mut self, v: u64) {
        match self.order {
            ByteOrder::Little => self.raw(&v.to_le_bytes()),
            ByteOrder::Big => self.raw(&v.to_be_bytes()),
        }
    }

    fn cstr(&mut self, s: &str) {
        self.raw(s.as_bytes());
        self.bytes.push(0);
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }
}

/// Two methods, one `Client` thread, nothing else
pub fn two_method_trace() -> TraceBuilder {
    TraceBuilder::new()
        .metadata(serde_json::json!({
            "os.name": "Linux",
            "os.arch": "amd64",
            "buildID": "abc123",
            "version": "1.10.0",
            "delay": 1000
        }))
        .thread("Client")
        .method(1, "Lcom/example/A;", "run", "()V")
        .method(2, "Lcom/example/B;", "call", "(I)V")
}
