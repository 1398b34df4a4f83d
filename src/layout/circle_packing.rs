use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::PlotArea;
use crate::error::{ChartError, ChartResult};

const OVERLAP_EPSILON: f64 = 1e-6;
const RELAX_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackedCircle {
    /// Position of the circle in the caller's input slice.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl PackedCircle {
    fn overlaps(&self, other: &Self, padding: f64) -> bool {
        if self.radius <= 0.0 || other.radius <= 0.0 {
            return false;
        }
        let min_distance = self.radius + other.radius + padding - OVERLAP_EPSILON;
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy < min_distance * min_distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CirclePackingConfig {
    /// Minimum gap between two circles, in the radii's units.
    pub padding: f64,
    /// Candidate angles tried around each placed circle.
    pub angle_steps: usize,
    pub relax_iterations: usize,
}

impl Default for CirclePackingConfig {
    fn default() -> Self {
        Self {
            padding: 0.0,
            angle_steps: 72,
            relax_iterations: 40,
        }
    }
}

impl CirclePackingConfig {
    fn validate(self) -> ChartResult<Self> {
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(ChartError::InvalidData(
                "circle packing padding must be finite and >= 0".to_owned(),
            ));
        }
        if self.angle_steps == 0 {
            return Err(ChartError::InvalidData(
                "circle packing needs at least one candidate angle".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Packs circles of the given radii around the origin.
///
/// The result is in input order and centred on the bounding box of the
/// packing. Radii are never changed. Zero radii stay at the origin and do
/// not count toward the bounding box.
pub fn pack_circles(radii: &[f64], config: CirclePackingConfig) -> ChartResult<Vec<PackedCircle>> {
    let config = config.validate()?;
    if let Some(bad) = radii.iter().find(|r| !r.is_finite() || **r < 0.0) {
        return Err(ChartError::InvalidData(format!(
            "circle radius must be finite and >= 0, got {bad}"
        )));
    }

    let mut order: Vec<usize> = (0..radii.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(OrderedFloat(radii[i])));

    let mut placed: Vec<PackedCircle> = Vec::with_capacity(radii.len());
    for &index in &order {
        let radius = radii[index];
        let circle = if placed.is_empty() || radius == 0.0 {
            PackedCircle {
                index,
                x: 0.0,
                y: 0.0,
                radius,
            }
        } else {
            best_tangent_position(&placed, index, radius, config)
        };
        placed.push(circle);
    }

    let moves = relax(&mut placed, config);
    debug!(circles = placed.len(), moves, "circle packing relaxed");

    recenter(&mut placed);
    placed.sort_by_key(|circle| circle.index);
    Ok(placed)
}

fn best_tangent_position(
    placed: &[PackedCircle],
    index: usize,
    radius: f64,
    config: CirclePackingConfig,
) -> PackedCircle {
    let mut best: Option<(f64, PackedCircle)> = None;
    for anchor in placed.iter().filter(|c| c.radius > 0.0) {
        let distance = anchor.radius + radius + config.padding;
        for step in 0..config.angle_steps {
            let angle = std::f64::consts::TAU * step as f64 / config.angle_steps as f64;
            let candidate = PackedCircle {
                index,
                x: anchor.x + distance * angle.cos(),
                y: anchor.y + distance * angle.sin(),
                radius,
            };
            if placed.iter().any(|other| candidate.overlaps(other, config.padding)) {
                continue;
            }
            let score = candidate.x.hypot(candidate.y);
            if best.is_none_or(|(best_score, _)| score < best_score) {
                best = Some((score, candidate));
            }
        }
    }

    best.map(|(_, circle)| circle).unwrap_or_else(|| {
        // Right of everything placed so far is always free.
        let extent = placed
            .iter()
            .map(|c| c.x.hypot(c.y) + c.radius)
            .fold(0.0, f64::max);
        PackedCircle {
            index,
            x: extent + config.padding + radius,
            y: 0.0,
            radius,
        }
    })
}

/// Moves circles toward the origin while they stay disjoint; returns the move count.
fn relax(circles: &mut [PackedCircle], config: CirclePackingConfig) -> usize {
    let mut moves = 0;
    for _ in 0..config.relax_iterations {
        let mut moved = false;
        for i in 0..circles.len() {
            let current = circles[i];
            if current.radius <= 0.0 {
                continue;
            }
            let candidate = PackedCircle {
                x: current.x * (1.0 - RELAX_STEP),
                y: current.y * (1.0 - RELAX_STEP),
                ..current
            };
            let blocked = circles
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && candidate.overlaps(other, config.padding));
            if !blocked {
                circles[i] = candidate;
                moved = true;
                moves += 1;
            }
        }
        if !moved {
            break;
        }
    }
    moves
}

fn recenter(circles: &mut [PackedCircle]) {
    let Some((min_x, min_y, max_x, max_y)) = circle_extent(circles) else {
        return;
    };
    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;
    for circle in circles.iter_mut().filter(|c| c.radius > 0.0) {
        circle.x -= cx;
        circle.y -= cy;
    }
}

fn circle_extent(circles: &[PackedCircle]) -> Option<(f64, f64, f64, f64)> {
    circles.iter().filter(|c| c.radius > 0.0).fold(None, |acc, c| {
        let (x0, y0, x1, y1) = (c.x - c.radius, c.y - c.radius, c.x + c.radius, c.y + c.radius);
        Some(match acc {
            None => (x0, y0, x1, y1),
            Some((a0, b0, a1, b1)) => (a0.min(x0), b0.min(y0), a1.max(x1), b1.max(y1)),
        })
    })
}

/// Uniformly scales and translates a packing so it fits centred in `area`.
///
/// Returns the scale factor applied alongside the fitted circles.
#[must_use]
pub fn fit_circles(circles: &[PackedCircle], area: PlotArea) -> (Vec<PackedCircle>, f64) {
    let extent = circle_extent(circles)
        .filter(|(min_x, min_y, max_x, max_y)| max_x > min_x && max_y > min_y);
    let Some((min_x, min_y, max_x, max_y)) = extent else {
        let fitted = circles
            .iter()
            .map(|c| PackedCircle {
                x: area.center_x(),
                y: area.center_y(),
                radius: 0.0,
                ..*c
            })
            .collect();
        return (fitted, 0.0);
    };

    let width = max_x - min_x;
    let height = max_y - min_y;
    let scale = (area.width / width).min(area.height / height);
    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;
    let fitted = circles
        .iter()
        .map(|c| PackedCircle {
            index: c.index,
            x: area.center_x() + (c.x - cx) * scale,
            y: area.center_y() + (c.y - cy) * scale,
            radius: c.radius * scale,
        })
        .collect();
    (fitted, scale)
}

/// Whether any two circles overlap by more than `padding` (minus a tiny tolerance).
#[must_use]
pub fn circles_overlap(circles: &[PackedCircle], padding: f64) -> bool {
    circles.iter().enumerate().any(|(i, a)| {
        circles[i + 1..]
            .iter()
            .any(|b| a.overlaps(b, padding - 1e-4 * (1.0 + padding)))
    })
}
