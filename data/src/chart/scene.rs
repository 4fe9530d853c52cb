//! Screen-space geometry for one frame.
//!
//! [`compose`] turns the chart state into a flat, ordered list of primitives;
//! the renderer paints them in order without knowing anything about candles
//! or prices.

use std::f32::consts::FRAC_PI_4;

use iced_core::{Color, Point, Size};

use super::hover::{Tooltip, TOOLTIP_TEXT_SIZE, estimate_text_width};
use super::transform::{candle_metrics, candle_to_screen_x, data_to_screen, price_to_screen_y};
use super::{Chart, DataPoint};
use crate::annotation::{Pending, Segment};

pub const BACKGROUND: Color = Color::WHITE;
pub const GRID: Color = Color::from_rgb8(240, 240, 240);
pub const WICK: Color = Color::BLACK;
pub const BULLISH: Color = Color::from_rgb8(0, 255, 0);
pub const BEARISH: Color = Color::from_rgb8(255, 0, 0);
pub const LINE: Color = Color::from_rgb8(0, 0, 255);
pub const RECT_FILL: Color = Color::from_rgba8(0, 0, 0, 0.2);
pub const OUTLINE: Color = Color::BLACK;
pub const TEXT: Color = Color::BLACK;
pub const TOOLTIP_FILL: Color = Color::from_rgb8(255, 255, 200);

pub const DATE_LABEL_SIZE: f32 = 12.0;
pub const ANNOTATION_TEXT_SIZE: f32 = 16.0;
const DATE_LABEL_OFFSET: f32 = 50.0;
const CARET: char = '_';

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub content: String,
    /// Pivot point; rotation happens around it.
    pub anchor: Point,
    /// Horizontal shift of the text start from the pivot, before rotation.
    pub offset_x: f32,
    pub size: f32,
    pub color: Color,
    /// Radians, clockwise on screen.
    pub rotation: f32,
}

impl Label {
    fn plain(content: String, anchor: Point, size: f32) -> Self {
        Self {
            content,
            anchor,
            offset_x: 0.0,
            size,
            color: TEXT,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Clear(Color),
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Color,
    },
    Rect {
        origin: Point,
        size: Size,
        fill: Option<Color>,
        outline: Option<Color>,
    },
    Text(Label),
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    primitives: Vec<Primitive>,
    hovered: Option<usize>,
}

impl Scene {
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Bar under the cursor this frame, if any.
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    fn line(&mut self, from: Point, to: Point, width: f32, color: Color) {
        self.push(Primitive::Line {
            from,
            to,
            width,
            color,
        });
    }
}

/// Builds the frame: grid, candles, date labels, committed annotations, the
/// annotation in progress and the hover tooltip, in paint order.
pub fn compose(chart: &Chart, pending: Pending<'_>, cursor: Option<Point>) -> Scene {
    let mut scene = Scene::default();
    scene.push(Primitive::Clear(BACKGROUND));

    draw_grid(&mut scene, chart);
    draw_candles(&mut scene, chart);
    draw_date_labels(&mut scene, chart);
    draw_annotations(&mut scene, chart);
    draw_pending(&mut scene, chart, pending);

    if let Some(cursor) = cursor {
        scene.hovered = chart.hovered_bar(cursor);

        if let Some(bar) = scene.hovered.and_then(|index| chart.series().get(index)) {
            draw_tooltip(&mut scene, &Tooltip::new(bar, cursor, chart.window()));
        }
    }

    scene
}

fn draw_grid(scene: &mut Scene, chart: &Chart) {
    let viewport = chart.viewport();
    let plot = chart.plot();
    let (min_price, max_price) = viewport.price_range();

    let lines = chart.config().grid_lines;
    if lines > 1 {
        let step = (max_price - min_price) / (lines - 1) as f32;

        for i in 0..lines {
            let y = price_to_screen_y(min_price + i as f32 * step, viewport, plot);
            scene.line(
                Point::new(plot.left, y),
                Point::new(plot.right(), y),
                1.0,
                GRID,
            );
        }
    }

    let body = candle_metrics(viewport, plot).body;

    for index in viewport.visible_indices() {
        let x = candle_to_screen_x(index as f32, viewport, plot) + body / 2.0;
        scene.line(
            Point::new(x, plot.top),
            Point::new(x, plot.bottom()),
            1.0,
            GRID,
        );
    }
}

fn draw_candles(scene: &mut Scene, chart: &Chart) {
    let viewport = chart.viewport();
    let plot = chart.plot();
    let body = candle_metrics(viewport, plot).body;

    for index in viewport.visible_indices() {
        let Some(bar) = chart.series().get(index) else {
            continue;
        };

        let x = candle_to_screen_x(index as f32, viewport, plot);
        let y_high = price_to_screen_y(bar.high, viewport, plot);
        let y_low = price_to_screen_y(bar.low, viewport, plot);
        let y_open = price_to_screen_y(bar.open, viewport, plot);
        let y_close = price_to_screen_y(bar.close, viewport, plot);

        scene.push(Primitive::Rect {
            origin: Point::new(x + body / 2.0, y_high),
            size: Size::new(1.0, y_low - y_high),
            fill: Some(WICK),
            outline: None,
        });

        scene.push(Primitive::Rect {
            origin: Point::new(x + 0.5, y_open.min(y_close)),
            size: Size::new(body, (y_open - y_close).abs()),
            fill: Some(if bar.is_bullish() { BULLISH } else { BEARISH }),
            outline: None,
        });
    }
}

/// Every how many visible candles a date label is drawn.
pub fn label_step(view_width: f32, plot_width: f32, label_spacing: f32) -> usize {
    let labels = view_width.max(0.0) as usize;
    let slots = ((plot_width / label_spacing.max(1.0)) as usize).max(1);

    (labels / slots).max(1)
}

fn draw_date_labels(scene: &mut Scene, chart: &Chart) {
    let viewport = chart.viewport();
    let plot = chart.plot();
    let body = candle_metrics(viewport, plot).body;
    let step = label_step(viewport.width(), plot.width, chart.config().label_spacing);

    for index in viewport.visible_indices().step_by(step) {
        let Some(bar) = chart.series().get(index) else {
            continue;
        };

        let x = candle_to_screen_x(index as f32, viewport, plot) + body / 2.0;

        scene.push(Primitive::Text(Label {
            offset_x: -estimate_text_width(&bar.date, DATE_LABEL_SIZE) / 2.0,
            rotation: FRAC_PI_4,
            ..Label::plain(
                bar.date.clone(),
                Point::new(x, plot.bottom() + DATE_LABEL_OFFSET),
                DATE_LABEL_SIZE,
            )
        }));
    }
}

fn draw_annotations(scene: &mut Scene, chart: &Chart) {
    let annotations = chart.annotations();

    for line in annotations.lines() {
        draw_line(scene, chart, line);
    }
    for rect in annotations.rects() {
        draw_rect(scene, chart, rect);
    }
    for text in annotations.texts() {
        draw_text(scene, chart, text.anchor(), text.text.clone());
    }
}

fn draw_pending(scene: &mut Scene, chart: &Chart, pending: Pending<'_>) {
    match pending {
        Pending::None => {}
        Pending::Line(line) => draw_line(scene, chart, line),
        Pending::Rect(rect) => draw_rect(scene, chart, rect),
        Pending::Text(draft) => {
            let mut content = draft.buffer().to_string();
            content.push(CARET);
            draw_text(scene, chart, draft.anchor(), content);
        }
    }
}

fn draw_line(scene: &mut Scene, chart: &Chart, line: &Segment) {
    let from = data_to_screen(line.start(), chart.viewport(), chart.plot());
    let to = data_to_screen(line.end(), chart.viewport(), chart.plot());

    scene.line(from, to, 1.0, LINE);
}

fn draw_rect(scene: &mut Scene, chart: &Chart, rect: &Segment) {
    let a = data_to_screen(rect.start(), chart.viewport(), chart.plot());
    let b = data_to_screen(rect.end(), chart.viewport(), chart.plot());

    scene.push(Primitive::Rect {
        origin: Point::new(a.x.min(b.x), a.y.min(b.y)),
        size: Size::new((b.x - a.x).abs(), (b.y - a.y).abs()),
        fill: Some(RECT_FILL),
        outline: Some(OUTLINE),
    });
}

fn draw_text(scene: &mut Scene, chart: &Chart, anchor: DataPoint, content: String) {
    let position = data_to_screen(anchor, chart.viewport(), chart.plot());

    scene.push(Primitive::Text(Label::plain(
        content,
        position,
        ANNOTATION_TEXT_SIZE,
    )));
}

fn draw_tooltip(scene: &mut Scene, tooltip: &Tooltip) {
    scene.push(Primitive::Rect {
        origin: tooltip.origin,
        size: tooltip.size,
        fill: Some(TOOLTIP_FILL),
        outline: Some(OUTLINE),
    });

    for (position, line) in tooltip.line_positions() {
        scene.push(Primitive::Text(Label::plain(
            line.to_string(),
            position,
            TOOLTIP_TEXT_SIZE,
        )));
    }
}
