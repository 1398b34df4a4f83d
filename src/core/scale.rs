use serde::{Deserialize, Serialize};

use crate::core::ticks::{nice_step, nice_ticks};
use crate::error::{ChartError, ChartResult};

/// Continuous linear mapping from a data domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start: 0.0,
            range_end: 1.0,
        })
    }

    /// Builds a scale over `[min, max]`, widening a degenerate extent so that a
    /// single value (or all-equal values) still gets a usable domain.
    ///
    /// A collapsed non-zero extent is widened towards zero; a collapsed zero
    /// extent becomes `[0, 1]`.
    pub fn covering(min: f64, max: f64) -> ChartResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ChartError::InvalidData(
                "scale extent must be finite".to_owned(),
            ));
        }
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if min != max {
            return Self::new(min, max);
        }
        if min == 0.0 {
            Self::new(0.0, 1.0)
        } else if min > 0.0 {
            Self::new(0.0, min)
        } else {
            Self::new(min, 0.0)
        }
    }

    #[must_use]
    pub fn with_range(mut self, range_start: f64, range_end: f64) -> Self {
        self.range_start = range_start;
        self.range_end = range_end;
        self
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        let normalized = (value - self.domain_start) / span;
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    pub fn invert(self, pixel: f64) -> ChartResult<f64> {
        if !pixel.is_finite() {
            return Err(ChartError::InvalidData("pixel must be finite".to_owned()));
        }
        let range_span = self.range_end - self.range_start;
        if range_span == 0.0 {
            return Err(ChartError::InvalidData(
                "cannot invert a scale with an empty range".to_owned(),
            ));
        }
        let normalized = (pixel - self.range_start) / range_span;
        Ok(self.domain_start + normalized * (self.domain_end - self.domain_start))
    }

    /// Extends the domain outward to round tick multiples.
    #[must_use]
    pub fn nice(self, tick_count: usize) -> Self {
        let (mut lo, mut hi) = self.ordered_domain();
        // A second pass settles cases where extending the domain changes the step.
        for _ in 0..2 {
            let step = nice_step((hi - lo) / tick_count.max(1) as f64);
            if step <= 0.0 {
                break;
            }
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        }
        let (start, end) = if self.domain_start <= self.domain_end {
            (lo, hi)
        } else {
            (hi, lo)
        };
        Self {
            domain_start: start,
            domain_end: end,
            ..self
        }
    }

    /// Round tick values that fall inside the domain.
    #[must_use]
    pub fn ticks(self, tick_count: usize) -> Vec<f64> {
        let (lo, hi) = self.ordered_domain();
        let epsilon = (hi - lo).abs() * 1e-9;
        nice_ticks(lo, hi, tick_count)
            .into_iter()
            .filter(|tick| *tick >= lo - epsilon && *tick <= hi + epsilon)
            .map(|tick| if tick.abs() <= epsilon { 0.0 } else { tick })
            .collect()
    }

    fn ordered_domain(self) -> (f64, f64) {
        if self.domain_start <= self.domain_end {
            (self.domain_start, self.domain_end)
        } else {
            (self.domain_end, self.domain_start)
        }
    }
}

/// Discrete band scale for categorical positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    range_start: f64,
    range_end: f64,
    count: usize,
    padding_inner: f64,
    padding_outer: f64,
}

impl BandScale {
    #[must_use]
    pub fn new(range_start: f64, range_end: f64, count: usize) -> Self {
        Self {
            range_start,
            range_end,
            count,
            padding_inner: 0.1,
            padding_outer: 0.1,
        }
    }

    /// Sets inner and outer padding in band units; inner padding is capped below 1.
    #[must_use]
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = if inner.is_finite() {
            inner.clamp(0.0, 0.95)
        } else {
            0.0
        };
        self.padding_outer = if outer.is_finite() { outer.max(0.0) } else { 0.0 };
        self
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Distance between the starts of two neighbouring bands.
    #[must_use]
    pub fn step(&self) -> f64 {
        let n = self.count as f64;
        let denominator = (n - self.padding_inner + 2.0 * self.padding_outer).max(1.0);
        (self.range_end - self.range_start) / denominator
    }

    #[must_use]
    pub fn band_width(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.step() * (1.0 - self.padding_inner)
    }

    #[must_use]
    pub fn start(&self, index: usize) -> f64 {
        let step = self.step();
        let n = self.count as f64;
        let used = step * (n - self.padding_inner);
        let offset = (self.range_end - self.range_start - used) / 2.0;
        self.range_start + offset + step * index as f64
    }

    #[must_use]
    pub fn center(&self, index: usize) -> f64 {
        self.start(index) + self.band_width() / 2.0
    }
}

/// Area-true mapping: output grows with the square root of the value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SqrtScale {
    max_value: f64,
    max_output: f64,
}

impl SqrtScale {
    pub fn new(max_value: f64, max_output: f64) -> ChartResult<Self> {
        if !max_value.is_finite() || max_value <= 0.0 {
            return Err(ChartError::InvalidData(
                "sqrt scale max value must be finite and > 0".to_owned(),
            ));
        }
        if !max_output.is_finite() || max_output < 0.0 {
            return Err(ChartError::InvalidData(
                "sqrt scale max output must be finite and >= 0".to_owned(),
            ));
        }
        Ok(Self {
            max_value,
            max_output,
        })
    }

    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        if !value.is_finite() || value <= 0.0 {
            return 0.0;
        }
        self.max_output * (value / self.max_value).sqrt()
    }
}
