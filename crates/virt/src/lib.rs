//! Lager virt: headless virtualized windowing.
//!
//! Given an ordered row set, row heights, and live viewport metrics, compute
//! the minimal contiguous index range that must be materialized, expanded by
//! an overscan margin. Each planned row carries its absolute offset so a
//! frontend can position it without reflowing siblings, and the plan always
//! reports the full scrollable height so scrollbars stay honest at any N.
//!
//! Everything here is recomputed from scratch on every call; no incremental
//! state exists that could drift from the true row set.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Row height estimate used by the reference dashboard (56px rows).
pub const DEFAULT_ROW_HEIGHT: f32 = 56.0;
/// Extra rows materialized on each side to absorb fast scrolling.
pub const DEFAULT_OVERSCAN: usize = 10;

/// Row heights for the current ordered row set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RowLayout {
    /// `count` rows of one fixed height.
    Uniform { count: usize, row_height: f32 },
    /// One measured (or estimated) height per row.
    PerRow(Vec<f32>),
}

impl RowLayout {
    pub fn uniform(count: usize) -> Self {
        RowLayout::Uniform { count, row_height: DEFAULT_ROW_HEIGHT }
    }

    pub fn count(&self) -> usize {
        match self {
            RowLayout::Uniform { count, .. } => *count,
            RowLayout::PerRow(hs) => hs.len(),
        }
    }

    pub fn height(&self, index: usize) -> f32 {
        match self {
            RowLayout::Uniform { row_height, .. } => row_height.max(0.0),
            RowLayout::PerRow(hs) => hs.get(index).copied().unwrap_or(0.0).max(0.0),
        }
    }

    /// Sum of all row heights, independent of how many rows are planned.
    pub fn total_height(&self) -> f32 {
        match self {
            RowLayout::Uniform { count, row_height } => *count as f32 * row_height.max(0.0),
            RowLayout::PerRow(hs) => hs.iter().map(|h| h.max(0.0)).sum(),
        }
    }
}

/// Live scroll metrics supplied by the presentation layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub height: f32,
    pub scroll_offset: f32,
    pub overscan: usize,
}

impl Viewport {
    pub fn new(height: f32, scroll_offset: f32) -> Self {
        Self { height, scroll_offset, overscan: DEFAULT_OVERSCAN }
    }
}

/// One materialized row: its index in the ordered set and its absolute
/// vertical offset (sum of preceding row heights).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VirtualRow {
    pub index: usize,
    pub offset: f32,
    pub height: f32,
}

/// The computed window: `[start, end)` clamped to `[0, N)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowPlan {
    pub start: usize,
    pub end: usize,
    pub total_height: f32,
    pub rows: Vec<VirtualRow>,
}

impl WindowPlan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn empty(total_height: f32) -> Self {
        Self { start: 0, end: 0, total_height, rows: Vec::new() }
    }
}

/// Compute the window for the given layout and viewport.
pub fn plan_window(layout: &RowLayout, viewport: &Viewport) -> WindowPlan {
    let count = layout.count();
    let total_height = layout.total_height();
    if count == 0 {
        return WindowPlan::empty(0.0);
    }

    // Clamp the scroll position into the scrollable range; a stale offset
    // after rows shrank must not produce an out-of-range window.
    let view_h = viewport.height.max(0.0);
    let max_scroll = (total_height - view_h).max(0.0);
    let scroll = viewport.scroll_offset.clamp(0.0, max_scroll);
    let view_end = scroll + view_h;

    let (mut start, mut end) = visible_range(layout, count, scroll, view_end);

    // Overscan expansion, clamped to [0, N). Saturating on both sides so
    // an absurd caller-supplied overscan cannot overflow.
    start = start.saturating_sub(viewport.overscan);
    end = end.saturating_add(viewport.overscan).min(count);

    let mut rows = Vec::with_capacity(end - start);
    let mut offset = offset_of(layout, start);
    for index in start..end {
        let height = layout.height(index);
        rows.push(VirtualRow { index, offset, height });
        offset += height;
    }

    metrics::gauge!("virt_window_rows", rows.len() as f64);
    trace!(count, start, end, scroll, "virt: window planned");
    WindowPlan { start, end, total_height, rows }
}

/// Strictly visible `[start, end)`: rows whose span intersects
/// `[scroll, view_end]`.
fn visible_range(layout: &RowLayout, count: usize, scroll: f32, view_end: f32) -> (usize, usize) {
    match layout {
        RowLayout::Uniform { row_height, .. } if *row_height > 0.0 => {
            let h = *row_height;
            let start = ((scroll / h).floor() as usize).min(count.saturating_sub(1));
            let end = ((view_end / h).ceil() as usize).max(start + 1).min(count);
            (start, end)
        }
        // Zero-height uniform rows: every row intersects the viewport.
        RowLayout::Uniform { .. } => (0, count),
        RowLayout::PerRow(_) => {
            let mut start = 0usize;
            let mut end = count;
            let mut offset = 0.0f32;
            let mut found_start = false;
            for i in 0..count {
                let h = layout.height(i);
                let row_end = offset + h;
                if !found_start && row_end >= scroll {
                    start = i;
                    found_start = true;
                }
                if offset > view_end {
                    end = i;
                    break;
                }
                offset = row_end;
            }
            if !found_start {
                // scroll beyond all rows; clamp to the last one
                start = count - 1;
            }
            (start, end.max(start + 1).min(count))
        }
    }
}

/// Absolute offset of `index`: sum of preceding row heights.
fn offset_of(layout: &RowLayout, index: usize) -> f32 {
    match layout {
        RowLayout::Uniform { row_height, .. } => index as f32 * row_height.max(0.0),
        RowLayout::PerRow(hs) => hs.iter().take(index).map(|h| h.max(0.0)).sum(),
    }
}
