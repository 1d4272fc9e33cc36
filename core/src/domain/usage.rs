//! Per-process resource usage.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::row::f64_at;

/// CPU and memory share attributed to one process id.
///
/// Both figures are percentages and never negative. A process that cannot be
/// resolved reports [`ResourceUsage::ZERO`], which is indistinguishable from
/// an idle one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// CPU usage in percent.
    pub cpu_percent: f64,

    /// Memory usage in percent of physical memory.
    pub mem_percent: f64,
}

impl ResourceUsage {
    /// Usage reported for invalid or vanished processes.
    pub const ZERO: Self = Self {
        cpu_percent: 0.0,
        mem_percent: 0.0,
    };

    /// Create a usage record, clamping negative or non-finite input to zero.
    pub fn new(cpu_percent: f64, mem_percent: f64) -> Self {
        Self {
            cpu_percent: sanitize(cpu_percent),
            mem_percent: sanitize(mem_percent),
        }
    }

    /// Flat positional form: `[cpu, mem]`.
    pub fn to_row(&self) -> Vec<Value> {
        vec![json!(self.cpu_percent), json!(self.mem_percent)]
    }

    /// Rebuild from the positional form; missing fields become `0.0`.
    pub fn from_row(row: &[Value]) -> Self {
        Self::new(f64_at(row, 0), f64_at(row, 1))
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
