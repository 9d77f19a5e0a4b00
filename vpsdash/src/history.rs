//! Bounded rolling windows for charts.
//!
//! Every push yields a new `Series` value and leaves the previous one untouched,
//! so readers can detect a change with [`Series::same_version`].

use std::collections::VecDeque;
use std::sync::Arc;

use crate::types::Snapshot;

/// Samples kept per series.
pub const HISTORY_LEN: usize = 60;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() >= cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

/// Fixed-capacity window of samples, oldest first.
#[derive(Debug, Clone)]
pub struct Series {
    samples: Arc<[f64]>,
    cap: usize,
}

impl Series {
    /// A full window of zeros, so charts always draw `cap` points.
    pub fn zeroed(cap: usize) -> Self {
        Self {
            samples: vec![0.0; cap].into(),
            cap,
        }
    }

    /// Append `v`, evicting the oldest sample once the window is full.
    pub fn push(&self, v: f64) -> Self {
        let mut dq: VecDeque<f64> = VecDeque::with_capacity(self.cap + 1);
        dq.extend(self.samples.iter().copied());
        push_capped(&mut dq, v, self.cap);
        Self {
            samples: dq.into_iter().collect(),
            cap: self.cap,
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.last().copied()
    }

    /// Highest sample in the window; zero-filled slots count as 0.
    pub fn peak(&self) -> f64 {
        self.samples.iter().copied().fold(0.0, f64::max)
    }

    /// True when both values are the same push (no new sample in between).
    pub fn same_version(&self, other: &Series) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}

impl Default for Series {
    fn default() -> Self {
        Self::zeroed(HISTORY_LEN)
    }
}

impl PartialEq for Series {
    fn eq(&self, other: &Self) -> bool {
        self.cap == other.cap && self.samples == other.samples
    }
}

/// Two series that always advance together (rx/tx, read/write).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesPair {
    pub first: Series,
    pub second: Series,
}

impl SeriesPair {
    pub fn zeroed(cap: usize) -> Self {
        Self {
            first: Series::zeroed(cap),
            second: Series::zeroed(cap),
        }
    }

    pub fn push(&self, first: f64, second: f64) -> Self {
        Self {
            first: self.first.push(first),
            second: self.second.push(second),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesId {
    Cpu,
    Memory,
    Swap,
    NetRecv,
    NetSent,
    DiskRead,
    DiskWrite,
}

impl SeriesId {
    pub const ALL: [SeriesId; 7] = [
        SeriesId::Cpu,
        SeriesId::Memory,
        SeriesId::Swap,
        SeriesId::NetRecv,
        SeriesId::NetSent,
        SeriesId::DiskRead,
        SeriesId::DiskWrite,
    ];
}

/// All tracked series. Fed once per accepted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Histories {
    pub cpu: Series,
    pub memory: Series,
    pub swap: Series,
    // (recv, sent) bytes/s
    pub net: SeriesPair,
    // (read, write) bytes/s
    pub disk_io: SeriesPair,
}

impl Histories {
    pub fn new(cap: usize) -> Self {
        Self {
            cpu: Series::zeroed(cap),
            memory: Series::zeroed(cap),
            swap: Series::zeroed(cap),
            net: SeriesPair::zeroed(cap),
            disk_io: SeriesPair::zeroed(cap),
        }
    }

    pub fn get(&self, id: SeriesId) -> &Series {
        match id {
            SeriesId::Cpu => &self.cpu,
            SeriesId::Memory => &self.memory,
            SeriesId::Swap => &self.swap,
            SeriesId::NetRecv => &self.net.first,
            SeriesId::NetSent => &self.net.second,
            SeriesId::DiskRead => &self.disk_io.first,
            SeriesId::DiskWrite => &self.disk_io.second,
        }
    }

    /// Push one value onto a single series; the others keep their version.
    pub fn push(&self, id: SeriesId, v: f64) -> Self {
        let mut next = self.clone();
        match id {
            SeriesId::Cpu => next.cpu = self.cpu.push(v),
            SeriesId::Memory => next.memory = self.memory.push(v),
            SeriesId::Swap => next.swap = self.swap.push(v),
            SeriesId::NetRecv => next.net.first = self.net.first.push(v),
            SeriesId::NetSent => next.net.second = self.net.second.push(v),
            SeriesId::DiskRead => next.disk_io.first = self.disk_io.first.push(v),
            SeriesId::DiskWrite => next.disk_io.second = self.disk_io.second.push(v),
        }
        next
    }

    /// One push per series for an accepted snapshot.
    pub fn record(&self, m: &Snapshot) -> Self {
        let (rx, tx) = m.net_totals();
        let (rd, wr) = m.disk_io_totals();
        Self {
            cpu: self.cpu.push(m.cpu.total_percent),
            memory: self.memory.push(m.memory.percent),
            swap: self.swap.push(m.swap.percent),
            net: self.net.push(rx, tx),
            disk_io: self.disk_io.push(rd, wr),
        }
    }
}

impl Default for Histories {
    fn default() -> Self {
        Self::new(HISTORY_LEN)
    }
}
