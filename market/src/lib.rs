pub mod loader;

pub use loader::{LoadError, load_series, parse_series};

use std::ops::RangeInclusive;

/// One trading period.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub open: f32,
    pub close: f32,
    pub high: f32,
    pub low: f32,
    pub volume: f32,
    pub date: String,
}

impl Bar {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Chronologically ordered, never empty sequence of bars.
#[derive(Debug, Clone)]
pub struct Series {
    bars: Vec<Bar>,
}

#[allow(clippy::len_without_is_empty)]
impl Series {
    /// Returns `None` for an empty input; the viewer needs at least one bar.
    pub fn new(bars: Vec<Bar>) -> Option<Self> {
        if bars.is_empty() {
            None
        } else {
            Some(Self { bars })
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn last_index(&self) -> usize {
        self.bars.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Bars in `range`, with the upper bound cut at the last bar.
    pub fn slice(&self, range: RangeInclusive<usize>) -> &[Bar] {
        let (start, end) = range.into_inner();
        let end = end.min(self.last_index());

        if start > end {
            &[]
        } else {
            &self.bars[start..=end]
        }
    }
}
