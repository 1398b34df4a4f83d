use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta};

pub const AXIS_TARGET_SPACING_PX: f64 = 80.0;
pub const AXIS_MIN_TICKS: usize = 2;
pub const AXIS_MAX_TICKS: usize = 10;

const MAX_GENERATED_TICKS: usize = 1_000;

#[must_use]
pub fn tick_target_count(
    axis_span_px: f64,
    target_spacing_px: f64,
    min_ticks: usize,
    max_ticks: usize,
) -> usize {
    if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
        return min_ticks;
    }
    if !target_spacing_px.is_finite() || target_spacing_px <= 0.0 {
        return min_ticks;
    }

    let raw = (axis_span_px / target_spacing_px).floor() as usize + 1;
    raw.clamp(min_ticks, max_ticks)
}

/// Rounds a raw step to 1, 2, 5 or 10 times a power of ten.
#[must_use]
pub fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// Evenly spaced round values covering `[min, max]`.
#[must_use]
pub fn nice_ticks(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return vec![min];
    }
    if min > max {
        std::mem::swap(&mut min, &mut max);
    }
    let step = nice_step((max - min) / count as f64);
    if step == 0.0 {
        return vec![min, max];
    }

    let start = (min / step).floor() * step;
    let stop = (max / step).ceil() * step;
    let n = ((stop - start) / step).round().clamp(0.0, MAX_GENERATED_TICKS as f64) as usize;
    (0..=n)
        .map(|i| {
            let raw = start + step * i as f64;
            // Snap accumulated float error back onto the step grid.
            (raw / step).round() * step
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemporalInterval {
    Days(u32),
    Months(u32),
    Years(i32),
}

impl TemporalInterval {
    const CANDIDATES: [Self; 14] = [
        Self::Days(1),
        Self::Days(2),
        Self::Days(7),
        Self::Days(14),
        Self::Months(1),
        Self::Months(3),
        Self::Months(6),
        Self::Years(1),
        Self::Years(2),
        Self::Years(5),
        Self::Years(10),
        Self::Years(25),
        Self::Years(50),
        Self::Years(100),
    ];

    fn approx_seconds(self) -> f64 {
        const DAY: f64 = 86_400.0;
        match self {
            Self::Days(n) => DAY * f64::from(n),
            Self::Months(n) => DAY * 30.436_875 * f64::from(n),
            Self::Years(n) => DAY * 365.2425 * f64::from(n),
        }
    }

    fn label_format(self) -> &'static str {
        match self {
            Self::Days(_) => "%b %-d",
            Self::Months(_) => "%b %Y",
            Self::Years(_) => "%Y",
        }
    }

    fn first_on_or_after(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Days(_) => Some(date),
            Self::Months(n) => {
                let month0 = date.month0();
                let aligned = month0 - month0 % n;
                let mut first = NaiveDate::from_ymd_opt(date.year(), aligned + 1, 1)?;
                if first < date {
                    first = first.checked_add_months(Months::new(n))?;
                }
                Some(first)
            }
            Self::Years(n) => {
                let year = date.year();
                let mut aligned = year - year.rem_euclid(n);
                if NaiveDate::from_ymd_opt(aligned, 1, 1)? < date {
                    aligned += n;
                }
                NaiveDate::from_ymd_opt(aligned, 1, 1)
            }
        }
    }

    fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Days(n) => date.checked_add_signed(TimeDelta::days(i64::from(n))),
            Self::Months(n) => date.checked_add_months(Months::new(n)),
            Self::Years(n) => NaiveDate::from_ymd_opt(date.year() + n, date.month(), date.day()),
        }
    }
}

/// One tick of a temporal axis: position in unix seconds plus its label.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalTick {
    pub position: f64,
    pub label: String,
}

/// Calendar-aligned ticks between two unix timestamps (seconds).
///
/// Picks the finest day/month/year interval that yields at most `target`
/// ticks and aligns ticks to interval boundaries.
#[must_use]
pub fn temporal_ticks(min_seconds: f64, max_seconds: f64, target: usize) -> Vec<TemporalTick> {
    if !min_seconds.is_finite() || !max_seconds.is_finite() || target == 0 {
        return Vec::new();
    }
    let (lo, hi) = if min_seconds <= max_seconds {
        (min_seconds, max_seconds)
    } else {
        (max_seconds, min_seconds)
    };
    let span = hi - lo;
    let interval = TemporalInterval::CANDIDATES
        .into_iter()
        .find(|candidate| span / candidate.approx_seconds() <= target.max(1) as f64)
        .unwrap_or(TemporalInterval::Years(100));

    let Some(start) = DateTime::from_timestamp(lo.floor() as i64, 0) else {
        return Vec::new();
    };
    let mut date = start.date_naive();
    if date_seconds(date) < lo {
        let Some(next) = date.succ_opt() else {
            return Vec::new();
        };
        date = next;
    }
    let Some(mut current) = interval.first_on_or_after(date) else {
        return Vec::new();
    };

    let mut ticks = Vec::new();
    while ticks.len() < MAX_GENERATED_TICKS {
        let position = date_seconds(current);
        if position > hi {
            break;
        }
        ticks.push(TemporalTick {
            position,
            label: current.format(interval.label_format()).to_string(),
        });
        match interval.advance(current) {
            Some(next) => current = next,
            None => break,
        }
    }
    ticks
}

fn date_seconds(date: NaiveDate) -> f64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp() as f64)
        .unwrap_or(f64::NAN)
}
