use iced_core::{Point, Size};
use market::{Bar, Series};

use super::transform::{PlotArea, candle_metrics, candle_to_screen_x, price_to_screen_y};
use super::Viewport;

pub const TOOLTIP_TEXT_SIZE: f32 = 12.0;
pub const TOOLTIP_PADDING: f32 = 5.0;
pub const TOOLTIP_OFFSET: f32 = 10.0;

const LINE_HEIGHT: f32 = TOOLTIP_TEXT_SIZE * 1.3;

/// Index of the bar whose high-low envelope contains `cursor`.
///
/// Only whole bars inside the visible range are tested, in ascending order;
/// slots never overlap so at most one can match.
pub fn find_hovered_bar(
    cursor: Point,
    viewport: &Viewport,
    plot: &PlotArea,
    series: &Series,
) -> Option<usize> {
    let body = candle_metrics(viewport, plot).body;

    viewport.visible_indices().find(|&index| {
        let Some(bar) = series.get(index) else {
            return false;
        };

        let x = candle_to_screen_x(index as f32, viewport, plot);
        let high_y = price_to_screen_y(bar.high, viewport, plot);
        let low_y = price_to_screen_y(bar.low, viewport, plot);

        cursor.x >= x && cursor.x <= x + body && cursor.y >= high_y && cursor.y <= low_y
    })
}

pub fn tooltip_lines(bar: &Bar) -> [String; 6] {
    [
        format!("Date:   {}", bar.date),
        format!("Open:   {:.2}", bar.open),
        format!("High:   {:.2}", bar.high),
        format!("Low:    {:.2}", bar.low),
        format!("Close:  {:.2}", bar.close),
        format!("Volume: {}", bar.volume),
    ]
}

/// Approximate advance of `content` at `size`, for layout decisions that
/// have to be made before the text is shaped.
pub fn estimate_text_width(content: &str, size: f32) -> f32 {
    content.chars().count() as f32 * size * 0.6
}

/// Data box shown next to the cursor while a bar is hovered.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub origin: Point,
    pub size: Size,
    pub lines: [String; 6],
}

impl Tooltip {
    /// Places the box below-right of the cursor, pushed back inside `window`
    /// when it would overflow.
    pub fn new(bar: &Bar, cursor: Point, window: Size) -> Self {
        let lines = tooltip_lines(bar);

        let text_width = lines
            .iter()
            .map(|line| estimate_text_width(line, TOOLTIP_TEXT_SIZE))
            .fold(0.0, f32::max);

        let size = Size::new(
            text_width + 2.0 * TOOLTIP_PADDING,
            lines.len() as f32 * LINE_HEIGHT + 2.0 * TOOLTIP_PADDING,
        );

        let mut origin = Point::new(cursor.x + TOOLTIP_OFFSET, cursor.y + TOOLTIP_OFFSET);

        if origin.x + size.width > window.width {
            origin.x = window.width - size.width;
        }
        if origin.y + size.height > window.height {
            origin.y = window.height - size.height;
        }
        origin.x = origin.x.max(0.0);
        origin.y = origin.y.max(0.0);

        Self {
            origin,
            size,
            lines,
        }
    }

    /// Top-left position of each text line.
    pub fn line_positions(&self) -> impl Iterator<Item = (Point, &str)> {
        self.lines.iter().enumerate().map(|(i, line)| {
            (
                Point::new(
                    self.origin.x + TOOLTIP_PADDING,
                    self.origin.y + TOOLTIP_PADDING + i as f32 * LINE_HEIGHT,
                ),
                line.as_str(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(i: usize) -> Bar {
        let base = 100.0 + i as f32;
        Bar {
            open: base,
            close: base + 1.0,
            high: base + 2.0,
            low: base - 2.0,
            volume: 1_500_000.0,
            date: format!("01/{:02}/2024", i + 1),
        }
    }

    fn setup() -> (Series, Viewport, PlotArea) {
        let series = Series::new((0..40).map(bar).collect()).unwrap();
        let mut viewport = Viewport::new(40, 5.0, 30);
        viewport.refresh(&series);
        let plot = PlotArea::from_window(Size::new(1400.0, 800.0), 0.05, 0.05);

        (series, viewport, plot)
    }

    fn center_of(index: usize, series: &Series, viewport: &Viewport, plot: &PlotArea) -> Point {
        let bar = series.get(index).unwrap();
        let body = candle_metrics(viewport, plot).body;
        let x = candle_to_screen_x(index as f32, viewport, plot) + body / 2.0;
        let y = price_to_screen_y((bar.high + bar.low) / 2.0, viewport, plot);

        Point::new(x, y)
    }

    #[test]
    fn cursor_over_a_candle_hits_it() {
        let (series, viewport, plot) = setup();

        for index in [10, 25, 39] {
            let cursor = center_of(index, &series, &viewport, &plot);
            assert_eq!(find_hovered_bar(cursor, &viewport, &plot, &series), Some(index));
        }
    }

    #[test]
    fn wick_area_counts_as_hit() {
        let (series, viewport, plot) = setup();
        let mut cursor = center_of(20, &series, &viewport, &plot);
        // just under the high, above the body
        cursor.y = price_to_screen_y(series.get(20).unwrap().high - 0.1, &viewport, &plot);

        assert_eq!(find_hovered_bar(cursor, &viewport, &plot, &series), Some(20));
    }

    #[test]
    fn spacing_between_candles_is_not_a_hit() {
        let (series, viewport, plot) = setup();
        let metrics = candle_metrics(&viewport, &plot);
        let mut cursor = center_of(20, &series, &viewport, &plot);
        cursor.x = candle_to_screen_x(20.0, &viewport, &plot) + metrics.body + metrics.spacing / 2.0;

        assert_eq!(find_hovered_bar(cursor, &viewport, &plot, &series), None);
    }

    #[test]
    fn bars_outside_the_window_are_ignored() {
        let (series, viewport, plot) = setup();
        let cursor = Point::new(plot.left - 5.0, plot.top + 10.0);

        assert_eq!(find_hovered_bar(cursor, &viewport, &plot, &series), None);
    }

    #[test]
    fn tooltip_formats_prices_with_two_decimals() {
        let lines = tooltip_lines(&Bar {
            open: 133.98,
            close: 135.7,
            high: 136.625,
            low: 131.0,
            volume: 264_879_700.0,
            date: "10/16/2024".to_string(),
        });

        assert_eq!(lines[0], "Date:   10/16/2024");
        assert_eq!(lines[1], "Open:   133.98");
        assert_eq!(lines[4], "Close:  135.70");
        assert_eq!(lines[3], "Low:    131.00");
        assert!(lines[5].starts_with("Volume: 2648797"));
    }

    #[test]
    fn tooltip_stays_inside_the_window() {
        let window = Size::new(400.0, 300.0);

        let inside = Tooltip::new(&bar(0), Point::new(20.0, 20.0), window);
        assert_eq!(inside.origin, Point::new(30.0, 30.0));

        let corner = Tooltip::new(&bar(0), Point::new(395.0, 295.0), window);
        assert!((corner.origin.x + corner.size.width - window.width).abs() < 1e-3);
        assert!((corner.origin.y + corner.size.height - window.height).abs() < 1e-3);

        let tiny = Tooltip::new(&bar(0), Point::new(5.0, 5.0), Size::new(50.0, 50.0));
        assert_eq!(tiny.origin, Point::ORIGIN);
    }
}
