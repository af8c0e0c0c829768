//! Zero-cost timing instrumentation for the build pipeline.
//!
//! When the `timing` feature is enabled, phase durations are measured and
//! reported on stderr. When disabled, everything here compiles away.
//!
//! Usage:
//!   cargo run --release --features timing

use std::time::Duration;

/// Wall-clock stopwatch for one phase.
#[cfg(feature = "timing")]
pub struct Timer {
    start: std::time::Instant,
}

#[cfg(feature = "timing")]
impl Timer {
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Dummy stopwatch when the feature is disabled.
#[cfg(not(feature = "timing"))]
pub struct Timer;

#[cfg(not(feature = "timing"))]
impl Timer {
    #[inline(always)]
    pub fn start() -> Self {
        Self
    }

    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        Duration::ZERO
    }
}

/// Phase timings for one tree build.
#[cfg(feature = "timing")]
#[derive(Debug, Clone)]
pub struct PhaseTimings {
    pub total: Duration,
    pub precompute: Duration,
    pub leaf_sweep: Duration,
    pub trunk: Duration,
    pub segmentation: Duration,
}

#[cfg(feature = "timing")]
impl PhaseTimings {
    pub fn report(&self, tree_type: crate::types::TreeType, num_vertices: usize) {
        let pct = |d: Duration| {
            if self.total.as_nanos() == 0 {
                0.0
            } else {
                d.as_secs_f64() / self.total.as_secs_f64() * 100.0
            }
        };
        let speed = |d: Duration| {
            if d.as_nanos() == 0 {
                0.0
            } else {
                num_vertices as f64 / d.as_secs_f64()
            }
        };
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;

        eprintln!("[timing] {} tree, n={}", tree_type, num_vertices);
        eprintln!(
            "  precompute:   {:8.2}ms ({:4.1}%) at {:>12.0} vert/s",
            ms(self.precompute),
            pct(self.precompute),
            speed(self.precompute)
        );
        eprintln!(
            "  leaf sweep:   {:8.2}ms ({:4.1}%) at {:>12.0} vert/s",
            ms(self.leaf_sweep),
            pct(self.leaf_sweep),
            speed(self.leaf_sweep)
        );
        eprintln!(
            "  trunk:        {:8.2}ms ({:4.1}%)",
            ms(self.trunk),
            pct(self.trunk)
        );
        eprintln!(
            "  segmentation: {:8.2}ms ({:4.1}%)",
            ms(self.segmentation),
            pct(self.segmentation)
        );
        eprintln!("  total:        {:8.2}ms", ms(self.total));
    }
}

/// Dummy timings when the feature is disabled.
#[cfg(not(feature = "timing"))]
#[derive(Debug, Clone, Copy)]
pub struct PhaseTimings;

#[cfg(not(feature = "timing"))]
impl PhaseTimings {
    #[inline(always)]
    pub fn report(&self, _tree_type: crate::types::TreeType, _num_vertices: usize) {}
}

/// Builder collecting phase timings during a build.
#[cfg(feature = "timing")]
pub struct TimingBuilder {
    t_start: std::time::Instant,
    precompute: Duration,
    leaf_sweep: Duration,
    trunk: Duration,
    segmentation: Duration,
}

#[cfg(feature = "timing")]
impl TimingBuilder {
    pub fn new() -> Self {
        Self {
            t_start: std::time::Instant::now(),
            precompute: Duration::ZERO,
            leaf_sweep: Duration::ZERO,
            trunk: Duration::ZERO,
            segmentation: Duration::ZERO,
        }
    }

    pub fn set_precompute(&mut self, d: Duration) {
        self.precompute = d;
    }

    pub fn set_leaf_sweep(&mut self, d: Duration) {
        self.leaf_sweep = d;
    }

    pub fn set_trunk(&mut self, d: Duration) {
        self.trunk = d;
    }

    pub fn set_segmentation(&mut self, d: Duration) {
        self.segmentation = d;
    }

    pub fn finish(self) -> PhaseTimings {
        PhaseTimings {
            total: self.t_start.elapsed(),
            precompute: self.precompute,
            leaf_sweep: self.leaf_sweep,
            trunk: self.trunk,
            segmentation: self.segmentation,
        }
    }
}

/// Dummy builder when the feature is disabled.
#[cfg(not(feature = "timing"))]
pub struct TimingBuilder;

#[cfg(not(feature = "timing"))]
impl TimingBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }

    #[inline(always)]
    pub fn set_precompute(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn set_leaf_sweep(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn set_trunk(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn set_segmentation(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn finish(self) -> PhaseTimings {
        PhaseTimings
    }
}
