use std::ops::RangeInclusive;

use market::Series;
use ordered_float::OrderedFloat;

/// Direction of an arrow-key pan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    /// Toward the start of the history.
    Older,
    /// Toward the latest bar.
    Newer,
}

/// Visible window over the series, in fractional candle indices.
///
/// `start` and `end` are both inclusive bar positions, so the window spans
/// `end - start + 1` candles. Every mutation keeps
/// `0 <= start`, `end <= N - 1` and `min_width <= width <= N`, and marks the
/// cached price range dirty until [`Viewport::refresh`] runs.
#[derive(Debug, Clone)]
pub struct Viewport {
    start: f32,
    end: f32,
    bar_count: usize,
    min_width: f32,
    min_price: f32,
    max_price: f32,
    dirty: bool,
}

impl Viewport {
    pub fn new(bar_count: usize, min_view_width: f32, initial_visible: usize) -> Self {
        let bar_count = bar_count.max(1);
        let last = (bar_count - 1) as f32;
        // a series shorter than the minimum can only be shown whole
        let min_width = min_view_width.max(1.0).min(bar_count as f32);

        let visible = (initial_visible as f32).clamp(min_width, bar_count as f32);

        Self {
            start: (last - visible + 1.0).max(0.0),
            end: last,
            bar_count,
            min_width,
            min_price: 0.0,
            max_price: 0.0,
            dirty: true,
        }
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    /// Number of candles spanned, `end - start + 1`.
    pub fn width(&self) -> f32 {
        self.end - self.start + 1.0
    }

    pub fn min_width(&self) -> f32 {
        self.min_width
    }

    pub fn max_width(&self) -> f32 {
        self.bar_count as f32
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// `(min_price, max_price)` of the whole bars in view.
    pub fn price_range(&self) -> (f32, f32) {
        debug_assert!(!self.dirty, "price range read before refresh");
        (self.min_price, self.max_price)
    }

    /// Whole bar indices touched by the window, `floor(start)..=ceil(end)`.
    pub fn visible_indices(&self) -> RangeInclusive<usize> {
        let first = self.start.max(0.0).floor() as usize;
        let last = (self.end.ceil() as usize).min(self.bar_count - 1);

        first..=last.max(first)
    }

    pub fn pan(&mut self, direction: PanDirection, fraction: f32) {
        let width = self.width();
        let shift = width * fraction;
        let shift = match direction {
            PanDirection::Older => -shift,
            PanDirection::Newer => shift,
        };

        self.start += shift;
        self.end += shift;
        self.slide_into_range(width);
        self.dirty = true;
    }

    /// Scales the window around `cursor_candle`; `factor < 1` zooms in.
    ///
    /// The candle under the cursor keeps its relative position unless the
    /// resized window runs past either end of the data, in which case the
    /// window is pushed back against that end with its new width intact.
    pub fn zoom_at(&mut self, cursor_candle: f32, factor: f32) {
        let width = self.width();
        let new_width = (width * factor).clamp(self.min_width, self.max_width());
        let focus_ratio = (cursor_candle - self.start) / width;

        self.start = cursor_candle - new_width * focus_ratio;
        self.end = self.start + new_width - 1.0;
        self.slide_into_range(new_width);
        self.dirty = true;
    }

    pub fn reset_to_full(&mut self) {
        self.start = 0.0;
        self.end = (self.bar_count - 1) as f32;
        self.dirty = true;
    }

    /// Recomputes the price range from `series` if the window moved since the
    /// last call. Returns whether a recomputation happened.
    pub fn refresh(&mut self, series: &Series) -> bool {
        if !self.dirty {
            return false;
        }

        let bars = series.slice(self.visible_indices());

        let lowest = bars.iter().map(|bar| OrderedFloat(bar.low)).min();
        let highest = bars.iter().map(|bar| OrderedFloat(bar.high)).max();

        if let (Some(OrderedFloat(low)), Some(OrderedFloat(high))) = (lowest, highest) {
            let (low, high) = widen_flat_range(low, high);
            self.min_price = low;
            self.max_price = high;
        }

        self.dirty = false;

        log::trace!(
            "Viewport {:.2}..{:.2} priced {:.2}..{:.2}",
            self.start,
            self.end,
            self.min_price,
            self.max_price
        );

        true
    }

    // Moves the whole window back inside the data without changing its width.
    fn slide_into_range(&mut self, width: f32) {
        let last = (self.bar_count - 1) as f32;

        if self.start < 0.0 {
            self.start = 0.0;
            self.end = width - 1.0;
        }
        if self.end > last {
            self.end = last;
            self.start = (last - width + 1.0).max(0.0);
        }
    }
}

fn widen_flat_range(low: f32, high: f32) -> (f32, f32) {
    if high - low > f32::EPSILON * high.abs().max(1.0) {
        return (low, high);
    }

    let pad = (high.abs() * 0.005).max(0.5);
    (low - pad, high + pad)
}
