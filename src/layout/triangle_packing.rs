use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::PlotArea;
use crate::error::{ChartError, ChartResult};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackedTriangle {
    /// Position of the triangle in the caller's input slice.
    pub index: usize,
    pub vertices: [(f64, f64); 3],
    pub side: f64,
    pub pointing_up: bool,
}

impl PackedTriangle {
    fn build(index: usize, side: f64, left: f64, pointing_up: bool) -> Self {
        let height = side * SQRT_3 / 2.0;
        let vertices = if pointing_up {
            [(left, 0.0), (left + side, 0.0), (left + side / 2.0, -height)]
        } else {
            [(left, -height), (left + side, -height), (left + side / 2.0, 0.0)]
        };
        Self {
            index,
            vertices,
            side,
            pointing_up,
        }
    }

    #[must_use]
    pub fn centroid(&self) -> (f64, f64) {
        let [a, b, c] = self.vertices;
        ((a.0 + b.0 + c.0) / 3.0, (a.1 + b.1 + c.1) / 3.0)
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.side * SQRT_3 / 2.0
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        SQRT_3 / 4.0 * self.side * self.side
    }

    /// `(min_x, min_y, max_x, max_y)` of the vertices.
    #[must_use]
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        self.vertices.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        )
    }

    /// Separating-axis test: are the triangles closer than `padding`?
    #[must_use]
    pub fn overlaps(&self, other: &Self, padding: f64) -> bool {
        if self.side <= 0.0 || other.side <= 0.0 {
            return false;
        }
        for axis in edge_normals(&self.vertices).chain(edge_normals(&other.vertices)) {
            let (a_min, a_max) = project(&self.vertices, axis);
            let (b_min, b_max) = project(&other.vertices, axis);
            let gap = (b_min - a_max).max(a_min - b_max);
            if gap >= padding - 1e-9 {
                return false;
            }
        }
        true
    }
}

fn edge_normals(vertices: &[(f64, f64); 3]) -> impl Iterator<Item = (f64, f64)> + '_ {
    (0..3).filter_map(move |i| {
        let (x0, y0) = vertices[i];
        let (x1, y1) = vertices[(i + 1) % 3];
        let (nx, ny) = (y0 - y1, x1 - x0);
        let length = nx.hypot(ny);
        (length > 0.0).then(|| (nx / length, ny / length))
    })
}

fn project(vertices: &[(f64, f64); 3], axis: (f64, f64)) -> (f64, f64) {
    vertices
        .iter()
        .map(|&(x, y)| x * axis.0 + y * axis.1)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

/// Side length of the equilateral triangle with the given area.
#[must_use]
pub fn triangle_side_for_area(area: f64) -> f64 {
    if !area.is_finite() || area <= 0.0 {
        return 0.0;
    }
    (4.0 * area / SQRT_3).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrianglePackingConfig {
    /// Minimum gap between two triangles, in side-length units.
    pub padding: f64,
    /// Scan resolution: offsets tried per side length of the incoming triangle.
    pub steps_per_side: usize,
}

impl Default for TrianglePackingConfig {
    fn default() -> Self {
        Self {
            padding: 0.0,
            steps_per_side: 200,
        }
    }
}

/// Packs triangles whose areas are given, largest first, in input order on return.
///
/// Orientation alternates up and down so slanted edges nest. Each triangle
/// slides in from the right to the left-most offset that clears every placed
/// triangle.
pub fn pack_triangles(
    areas: &[f64],
    config: TrianglePackingConfig,
) -> ChartResult<Vec<PackedTriangle>> {
    if !config.padding.is_finite() || config.padding < 0.0 {
        return Err(ChartError::InvalidData(
            "triangle packing padding must be finite and >= 0".to_owned(),
        ));
    }
    if config.steps_per_side == 0 {
        return Err(ChartError::InvalidData(
            "triangle packing needs at least one scan step per side".to_owned(),
        ));
    }
    if let Some(bad) = areas.iter().find(|a| !a.is_finite() || **a < 0.0) {
        return Err(ChartError::InvalidData(format!(
            "triangle area must be finite and >= 0, got {bad}"
        )));
    }

    let mut order: Vec<usize> = (0..areas.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(OrderedFloat(areas[i])));

    let mut placed: Vec<PackedTriangle> = Vec::with_capacity(areas.len());
    let mut rightmost = 0.0_f64;
    let mut pointing_up = true;
    for &index in &order {
        let side = triangle_side_for_area(areas[index]);
        if side == 0.0 || placed.is_empty() {
            let triangle = PackedTriangle::build(index, side, 0.0, pointing_up);
            if side > 0.0 {
                rightmost = rightmost.max(side);
                pointing_up = !pointing_up;
            }
            placed.push(triangle);
            continue;
        }

        let step = side / config.steps_per_side as f64;
        let start = rightmost - side;
        // Slanted separating axes see a horizontal gap shortened by cos 30°.
        let limit = rightmost + 2.0 * config.padding;
        let mut left = start;
        let triangle = loop {
            let candidate = PackedTriangle::build(index, side, left, pointing_up);
            let clear = !placed
                .iter()
                .any(|other| candidate.overlaps(other, config.padding));
            if clear || left >= limit {
                break PackedTriangle::build(index, side, left.min(limit), pointing_up);
            }
            left += step;
        };
        rightmost = rightmost.max(triangle.extent().2);
        pointing_up = !pointing_up;
        placed.push(triangle);
    }

    placed.sort_by_key(|triangle| triangle.index);
    Ok(placed)
}

/// Uniformly scales and translates triangles to fit centred in `area`.
#[must_use]
pub fn fit_triangles(triangles: &[PackedTriangle], area: PlotArea) -> (Vec<PackedTriangle>, f64) {
    let visible: Vec<&PackedTriangle> = triangles.iter().filter(|t| t.side > 0.0).collect();
    if visible.is_empty() {
        return (triangles.to_vec(), 0.0);
    }
    let (min_x, min_y, max_x, max_y) = visible.iter().map(|t| t.extent()).fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(a0, b0, a1, b1), (x0, y0, x1, y1)| (a0.min(x0), b0.min(y0), a1.max(x1), b1.max(y1)),
    );
    let scale = (area.width / (max_x - min_x)).min(area.height / (max_y - min_y));
    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;
    let map = |(x, y): (f64, f64)| {
        (
            area.center_x() + (x - cx) * scale,
            area.center_y() + (y - cy) * scale,
        )
    };
    let fitted = triangles
        .iter()
        .map(|t| PackedTriangle {
            index: t.index,
            vertices: [map(t.vertices[0]), map(t.vertices[1]), map(t.vertices[2])],
            side: t.side * scale,
            pointing_up: t.pointing_up,
        })
        .collect();
    (fitted, scale)
}
