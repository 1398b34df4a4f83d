use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::core::Bounds;
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPosition {
    Above,
    Below,
    Hidden,
}

impl LabelPosition {
    /// Candidate order; earlier entries win cost ties.
    pub const CANDIDATES: [Self; 3] = [Self::Above, Self::Below, Self::Hidden];
}

/// Label request anchored on a data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLabel {
    pub anchor: (f64, f64),
    pub width: f64,
    pub height: f64,
}

impl PointLabel {
    #[must_use]
    pub fn new(anchor: (f64, f64), width: f64, height: f64) -> Self {
        Self {
            anchor,
            width,
            height,
        }
    }

    fn area(self) -> f64 {
        self.width * self.height
    }

    /// Box occupied by the label at `position`; `None` when hidden.
    #[must_use]
    pub fn bounds_at(self, position: LabelPosition, offset: f64) -> Option<Bounds> {
        let (x, y) = self.anchor;
        let half = self.width / 2.0;
        match position {
            LabelPosition::Above => Some(Bounds::new(
                x - half,
                y - offset - self.height,
                x + half,
                y - offset,
            )),
            LabelPosition::Below => Some(Bounds::new(
                x - half,
                y + offset,
                x + half,
                y + offset + self.height,
            )),
            LabelPosition::Hidden => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedLabel {
    /// Position of the label in the caller's input slice.
    pub index: usize,
    pub position: LabelPosition,
    pub bounds: Option<Bounds>,
}

impl PlacedLabel {
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.position != LabelPosition::Hidden
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelPlacementConfig {
    /// Gap between the anchor point and the label box.
    pub offset: f64,
    /// Cost of hiding a label, as a multiple of its area.
    pub hide_cost_factor: f64,
    /// Cost per series segment crossing the label box, as a multiple of its area.
    pub line_cross_factor: f64,
    /// Small bias toward labels above their point, as a multiple of its area.
    pub below_penalty: f64,
    /// Labels are charged for the area they spend outside these bounds.
    pub bounds: Option<Bounds>,
}

impl Default for LabelPlacementConfig {
    fn default() -> Self {
        Self {
            offset: 6.0,
            hide_cost_factor: 1.0,
            line_cross_factor: 0.25,
            below_penalty: 0.01,
            bounds: None,
        }
    }
}

impl LabelPlacementConfig {
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    fn validate(self) -> ChartResult<Self> {
        for (name, value) in [
            ("offset", self.offset),
            ("hide_cost_factor", self.hide_cost_factor),
            ("line_cross_factor", self.line_cross_factor),
            ("below_penalty", self.below_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "label placement `{name}` must be finite and >= 0"
                )));
            }
        }
        Ok(self)
    }
}

fn unary_cost(
    label: PointLabel,
    position: LabelPosition,
    polyline: &[(f64, f64)],
    config: &LabelPlacementConfig,
) -> f64 {
    let area = label.area();
    let Some(bounds) = label.bounds_at(position, config.offset) else {
        return config.hide_cost_factor * area;
    };

    let crossings = polyline
        .windows(2)
        .filter(|segment| bounds.intersects_segment(segment[0], segment[1]))
        .count();
    let mut cost = crossings as f64 * config.line_cross_factor * area;
    if position == LabelPosition::Below {
        cost += config.below_penalty * area;
    }
    if let Some(container) = config.bounds {
        cost += bounds.area_outside(container);
    }
    cost
}

fn pair_cost(previous: Option<Bounds>, current: Option<Bounds>) -> f64 {
    match (previous, current) {
        (Some(a), Some(b)) => a.intersection_area(b),
        _ => 0.0,
    }
}

fn validate_labels(labels: &[PointLabel], polyline: &[(f64, f64)]) -> ChartResult<()> {
    for label in labels {
        let (x, y) = label.anchor;
        if !x.is_finite() || !y.is_finite() {
            return Err(ChartError::InvalidData(
                "label anchor must be finite".to_owned(),
            ));
        }
        let sized = label.width.is_finite() && label.height.is_finite();
        if !sized || label.width < 0.0 || label.height < 0.0 {
            return Err(ChartError::InvalidData(
                "label size must be finite and >= 0".to_owned(),
            ));
        }
    }
    if polyline.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(ChartError::InvalidData(
            "series line points must be finite".to_owned(),
        ));
    }
    Ok(())
}

/// Total cost of a given assignment; the quantity [`place_point_labels`] minimizes.
pub fn assignment_cost(
    labels: &[PointLabel],
    polyline: &[(f64, f64)],
    config: LabelPlacementConfig,
    positions: &[LabelPosition],
) -> ChartResult<f64> {
    let config = config.validate()?;
    validate_labels(labels, polyline)?;
    if positions.len() != labels.len() {
        return Err(ChartError::InvalidData(format!(
            "expected {} label positions, got {}",
            labels.len(),
            positions.len()
        )));
    }
    let mut total = 0.0;
    let mut previous: Option<Bounds> = None;
    for (label, &position) in labels.iter().zip(positions) {
        let bounds = label.bounds_at(position, config.offset);
        total += unary_cost(*label, position, polyline, &config) + pair_cost(previous, bounds);
        previous = bounds;
    }
    Ok(total)
}

/// Chooses above/below/hidden for every label, minimizing the total cost.
///
/// `labels` are in series order; `polyline` is the drawn series line the
/// labels should avoid. The result has one entry per label, in input order.
/// The pairwise term only links consecutive labels, so a Viterbi pass finds
/// the exact optimum.
pub fn place_point_labels(
    labels: &[PointLabel],
    polyline: &[(f64, f64)],
    config: LabelPlacementConfig,
) -> ChartResult<Vec<PlacedLabel>> {
    let config = config.validate()?;
    validate_labels(labels, polyline)?;
    if labels.is_empty() {
        return Ok(Vec::new());
    }

    const STATES: usize = LabelPosition::CANDIDATES.len();
    let boxes: Vec<SmallVec<[Option<Bounds>; STATES]>> = labels
        .iter()
        .map(|label| {
            LabelPosition::CANDIDATES
                .iter()
                .map(|&position| label.bounds_at(position, config.offset))
                .collect()
        })
        .collect();

    let mut cost: SmallVec<[f64; STATES]> = LabelPosition::CANDIDATES
        .iter()
        .map(|&position| unary_cost(labels[0], position, polyline, &config))
        .collect();
    let mut back: Vec<[usize; STATES]> = Vec::with_capacity(labels.len());
    back.push([0; STATES]);

    for i in 1..labels.len() {
        let mut next: SmallVec<[f64; STATES]> = SmallVec::new();
        let mut pointers = [0; STATES];
        for (state, &position) in LabelPosition::CANDIDATES.iter().enumerate() {
            let mut best = (f64::INFINITY, 0);
            for previous in 0..STATES {
                let candidate = cost[previous] + pair_cost(boxes[i - 1][previous], boxes[i][state]);
                if candidate < best.0 {
                    best = (candidate, previous);
                }
            }
            pointers[state] = best.1;
            next.push(best.0 + unary_cost(labels[i], position, polyline, &config));
        }
        cost = next;
        back.push(pointers);
    }

    let mut state = 0;
    for candidate in 1..STATES {
        if cost[candidate] < cost[state] {
            state = candidate;
        }
    }
    let total = cost[state];

    let mut states = vec![0; labels.len()];
    for i in (0..labels.len()).rev() {
        states[i] = state;
        state = back[i][state];
    }

    let placed: Vec<PlacedLabel> = states
        .into_iter()
        .enumerate()
        .map(|(index, state)| PlacedLabel {
            index,
            position: LabelPosition::CANDIDATES[state],
            bounds: boxes[index][state],
        })
        .collect();
    debug!(
        labels = placed.len(),
        hidden = placed.iter().filter(|label| !label.is_visible()).count(),
        total,
        "point labels placed"
    );
    Ok(placed)
}
