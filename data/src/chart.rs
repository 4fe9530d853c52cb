pub mod hover;
pub mod scene;
pub mod transform;
pub mod viewport;

pub use transform::PlotArea;
pub use viewport::{PanDirection, Viewport};

use iced_core::{Point, Size};
use market::Series;

use crate::annotation::Annotations;
use crate::config::ChartConfig;

pub const CANDLE_WIDTH_FACTOR: f32 = 0.8;
pub const SPACING_FACTOR: f32 = 0.2;

/// A position measured in (candle index, price).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DataPoint {
    pub candle: f32,
    pub price: f32,
}

impl DataPoint {
    pub fn new(candle: f32, price: f32) -> Self {
        Self { candle, price }
    }
}

/// Everything the chart owns for the lifetime of the process: the loaded
/// bars, the visible window over them and the committed annotations.
pub struct Chart {
    series: Series,
    viewport: Viewport,
    annotations: Annotations,
    config: ChartConfig,
    window: Size,
    plot: PlotArea,
}

impl Chart {
    pub fn new(series: Series, config: ChartConfig, window: Size) -> Self {
        let mut viewport = Viewport::new(
            series.len(),
            config.min_view_width,
            config.initial_visible_bars,
        );
        viewport.refresh(&series);

        log::debug!(
            "Chart created with {} bars, visible {:.1}..{:.1}",
            series.len(),
            viewport.start(),
            viewport.end()
        );

        Self {
            plot: PlotArea::from_window(window, config.margin_x, config.margin_y),
            series,
            viewport,
            annotations: Annotations::default(),
            config,
            window,
        }
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut Annotations {
        &mut self.annotations
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn window(&self) -> Size {
        self.window
    }

    pub fn plot(&self) -> &PlotArea {
        &self.plot
    }

    pub fn resize(&mut self, window: Size) {
        self.window = window;
        self.plot = PlotArea::from_window(window, self.config.margin_x, self.config.margin_y);
    }

    /// Recomputes the visible price range if the viewport moved.
    pub fn refresh(&mut self) {
        self.viewport.refresh(&self.series);
    }

    pub fn to_data(&self, position: Point) -> DataPoint {
        transform::screen_to_data(position, &self.viewport, &self.plot)
    }

    pub fn hovered_bar(&self, cursor: Point) -> Option<usize> {
        hover::find_hovered_bar(cursor, &self.viewport, &self.plot, &self.series)
    }
}
