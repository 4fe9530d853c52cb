//! Mapping between data space (candle index, price) and screen space.
//!
//! All functions read the viewport's cached price range, so the viewport must
//! be refreshed after any pan or zoom before projecting through it.

use iced_core::{Point, Size};

use super::{CANDLE_WIDTH_FACTOR, DataPoint, SPACING_FACTOR, Viewport};

/// Pixel rectangle the chart geometry is projected into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PlotArea {
    /// Margins are fractions of the window size. The bottom margin is doubled
    /// to leave room for the rotated date labels.
    pub fn from_window(window: Size, margin_x: f32, margin_y: f32) -> Self {
        let margin_x = window.width * margin_x;
        let margin_y = window.height * margin_y;

        Self {
            left: margin_x,
            top: margin_y,
            width: (window.width - 2.0 * margin_x).max(1.0),
            height: (window.height - 4.0 * margin_y).max(1.0),
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Horizontal footprint of one candle at the current zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleMetrics {
    pub slot: f32,
    pub body: f32,
    pub spacing: f32,
}

pub fn candle_metrics(viewport: &Viewport, plot: &PlotArea) -> CandleMetrics {
    let slot = plot.width / viewport.width();

    CandleMetrics {
        slot,
        body: slot * CANDLE_WIDTH_FACTOR,
        spacing: slot * SPACING_FACTOR,
    }
}

pub fn candle_to_screen_x(index: f32, viewport: &Viewport, plot: &PlotArea) -> f32 {
    plot.left + (index - viewport.start()) / viewport.width() * plot.width
}

pub fn price_to_screen_y(price: f32, viewport: &Viewport, plot: &PlotArea) -> f32 {
    let (min_price, max_price) = viewport.price_range();
    plot.top + (max_price - price) / (max_price - min_price) * plot.height
}

pub fn screen_to_candle(x: f32, viewport: &Viewport, plot: &PlotArea) -> f32 {
    viewport.start() + (x - plot.left) / plot.width * viewport.width()
}

pub fn screen_to_price(y: f32, viewport: &Viewport, plot: &PlotArea) -> f32 {
    let (min_price, max_price) = viewport.price_range();
    max_price - (y - plot.top) / plot.height * (max_price - min_price)
}

pub fn screen_to_data(position: Point, viewport: &Viewport, plot: &PlotArea) -> DataPoint {
    DataPoint {
        candle: screen_to_candle(position.x, viewport, plot),
        price: screen_to_price(position.y, viewport, plot),
    }
}

pub fn data_to_screen(point: DataPoint, viewport: &Viewport, plot: &PlotArea) -> Point {
    Point::new(
        candle_to_screen_x(point.candle, viewport, plot),
        price_to_screen_y(point.price, viewport, plot),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::PanDirection;
    use market::{Bar, Series};
    use proptest::prelude::*;

    fn series(len: usize) -> Series {
        let bars = (0..len)
            .map(|i| {
                let base = 50.0 + (i as f32 * 0.7).sin() * 10.0;
                Bar {
                    open: base,
                    close: base + 1.0,
                    high: base + 3.0,
                    low: base - 2.0,
                    volume: 10.0,
                    date: String::new(),
                }
            })
            .collect();

        Series::new(bars).unwrap()
    }

    fn plot() -> PlotArea {
        PlotArea::from_window(Size::new(1400.0, 800.0), 0.05, 0.05)
    }

    #[test]
    fn plot_area_reserves_double_bottom_margin() {
        let plot = plot();

        assert_eq!(plot.left, 70.0);
        assert_eq!(plot.top, 40.0);
        assert_eq!(plot.width, 1260.0);
        assert_eq!(plot.height, 640.0);
        assert_eq!(plot.bottom(), 680.0);
    }

    #[test]
    fn window_edges_map_to_plot_edges() {
        let series = series(40);
        let mut viewport = Viewport::new(40, 5.0, 30);
        viewport.refresh(&series);
        let plot = plot();

        assert_eq!(candle_to_screen_x(viewport.start(), &viewport, &plot), plot.left);
        assert!((candle_to_screen_x(viewport.end() + 1.0, &viewport, &plot) - plot.right()).abs() < 1e-3);

        let (low, high) = viewport.price_range();
        assert_eq!(price_to_screen_y(high, &viewport, &plot), plot.top);
        assert!((price_to_screen_y(low, &viewport, &plot) - plot.bottom()).abs() < 1e-3);
    }

    #[test]
    fn candle_slots_split_into_body_and_spacing() {
        let series = series(40);
        let mut viewport = Viewport::new(40, 5.0, 30);
        viewport.refresh(&series);

        let metrics = candle_metrics(&viewport, &plot());

        assert!((metrics.slot - 42.0).abs() < 1e-4);
        assert!((metrics.body - 33.6).abs() < 1e-4);
        assert!((metrics.spacing - 8.4).abs() < 1e-4);
        assert!((metrics.body + metrics.spacing - metrics.slot).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn screen_positions_round_trip(
            x in 0.0f32..1400.0,
            y in 0.0f32..800.0,
            zoom in 0.3f32..2.0,
            focus in 0.0f32..120.0,
            pans in 0usize..5,
        ) {
            let series = series(120);
            let mut viewport = Viewport::new(120, 5.0, 30);
            viewport.zoom_at(focus, zoom);
            for _ in 0..pans {
                viewport.pan(PanDirection::Older, 0.1);
            }
            viewport.refresh(&series);
            let plot = plot();

            let candle = screen_to_candle(x, &viewport, &plot);
            prop_assert!((candle_to_screen_x(candle, &viewport, &plot) - x).abs() < 1e-2);

            let price = screen_to_price(y, &viewport, &plot);
            prop_assert!((price_to_screen_y(price, &viewport, &plot) - y).abs() < 1e-2);

            let point = Point::new(x, y);
            let back = data_to_screen(screen_to_data(point, &viewport, &plot), &viewport, &plot);
            prop_assert!(back.distance(point) < 2e-2);
        }

        #[test]
        fn zoom_keeps_cursor_candle_under_cursor(
            x in 200.0f32..1200.0,
            factor in 0.8f32..1.0,
        ) {
            let series = series(400);
            let mut viewport = Viewport::new(400, 5.0, 100);
            viewport.pan(PanDirection::Older, 1.0);
            viewport.refresh(&series);
            let plot = plot();

            let candle = screen_to_candle(x, &viewport, &plot);
            viewport.zoom_at(candle, factor);
            viewport.refresh(&series);

            // far from both walls, so the zoom is a pure rescale around the cursor
            prop_assert!((screen_to_candle(x, &viewport, &plot) - candle).abs() < 1e-2);
            prop_assert!((candle_to_screen_x(candle, &viewport, &plot) - x).abs() < 1e-2);
        }
    }
}
