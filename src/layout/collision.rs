use ordered_float::OrderedFloat;

/// Label to be positioned along a vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackedLabel {
    /// Preferred centre.
    pub ideal: f64,
    pub height: f64,
}

impl StackedLabel {
    #[must_use]
    pub fn new(ideal: f64, height: f64) -> Self {
        Self { ideal, height }
    }
}

/// Moves label centres apart so no two labels overlap.
///
/// Labels keep their relative order, are separated by at least `gap`, and
/// stay within `[min, max]` whenever the stack fits; a stack taller than the
/// range starts at `min` and overflows past `max`. Each cluster of colliding
/// labels is centred on the mean of its ideals, which keeps the total
/// squared displacement minimal. Output is in input order.
#[must_use]
pub fn resolve_vertical_collisions(
    labels: &[StackedLabel],
    min: f64,
    max: f64,
    gap: f64,
) -> Vec<f64> {
    if labels.is_empty() {
        return Vec::new();
    }
    let gap = if gap.is_finite() { gap.max(0.0) } else { 0.0 };
    let min = if min.is_nan() { f64::NEG_INFINITY } else { min };
    let max = if max.is_nan() { f64::INFINITY } else { max };
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by_key(|&i| OrderedFloat(labels[i].ideal));
    let heights: Vec<f64> = order
        .iter()
        .map(|&i| labels[i].height.max(0.0))
        .collect();

    // Offset of each label's top edge from the top of the whole stack when
    // packed tight, so cluster math works on a single "shifted ideal".
    let mut offsets = Vec::with_capacity(order.len());
    let mut running = 0.0;
    for height in &heights {
        offsets.push(running);
        running += height + gap;
    }
    let total = running - gap;

    // Pool-adjacent-violators on shifted ideals: top_i = ideal_i - h_i/2 - offset_i.
    let mut blocks: Vec<(f64, usize)> = Vec::new();
    for (k, &i) in order.iter().enumerate() {
        let shifted = labels[i].ideal - heights[k] / 2.0 - offsets[k];
        let mut block = (shifted, 1_usize);
        while let Some(&(mean, count)) = blocks.last() {
            if mean < block.0 {
                break;
            }
            blocks.pop();
            let merged = count + block.1;
            block = (
                (mean * count as f64 + block.0 * block.1 as f64) / merged as f64,
                merged,
            );
        }
        blocks.push(block);
    }

    // Clamping is monotone, so clamped block starts stay ordered.
    let lowest_top = (max - total).max(min);
    let mut centres = vec![0.0; labels.len()];
    let mut k = 0;
    for (start, count) in blocks {
        let start = start.clamp(min, lowest_top);
        for _ in 0..count {
            centres[order[k]] = start + offsets[k] + heights[k] / 2.0;
            k += 1;
        }
    }

    centres
}
