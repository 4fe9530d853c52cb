use std::mem;

use iced_core::{Point, Size};

use crate::annotation::{Pending, Segment, TextDraft};
use crate::chart::transform::screen_to_candle;
use crate::chart::{Chart, PanDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
}

/// Input events, already stripped of toolkit specifics. Positions are in
/// chart-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    CloseRequested,
    KeyPressed(Key),
    /// A printable character produced by the keyboard.
    Text(char),
    Backspace,
    ButtonPressed(Button, Point),
    ButtonReleased(Button, Point),
    /// Wheel delta; positive scrolls up.
    Scrolled(f32),
    PointerMoved(Point),
    ModifiersChanged { shift: bool },
    Resized(Size),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Exit,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum State {
    #[default]
    Idle,
    DraggingLine(Segment),
    DraggingRect(Segment),
    TypingText {
        draft: TextDraft,
        /// Swallows the character of the key that started typing.
        suppress_trigger: bool,
    },
}

/// Turns inputs into chart mutations.
///
/// Owns the gesture in progress, the last known pointer position and the
/// shift state; everything persistent lives in the [`Chart`] passed in.
#[derive(Debug, Default)]
pub struct Controller {
    state: State,
    cursor: Option<Point>,
    shift: bool,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    pub fn pending(&self) -> Pending<'_> {
        match &self.state {
            State::Idle => Pending::None,
            State::DraggingLine(line) => Pending::Line(line),
            State::DraggingRect(rect) => Pending::Rect(rect),
            State::TypingText { draft, .. } => Pending::Text(draft),
        }
    }

    /// Applies one input, then brings the viewport's price range up to date so
    /// the next conversion sees the current window.
    pub fn handle(&mut self, input: Input, chart: &mut Chart) -> Option<Action> {
        match input {
            Input::PointerMoved(position) => self.cursor = Some(position),
            Input::ModifiersChanged { shift } => self.shift = shift,
            Input::Resized(size) => chart.resize(size),
            _ => {}
        }

        let state = mem::take(&mut self.state);
        let (next, action) = self.transition(state, input, chart);
        self.state = next;

        chart.refresh();

        action
    }

    fn transition(
        &mut self,
        state: State,
        input: Input,
        chart: &mut Chart,
    ) -> (State, Option<Action>) {
        if input == Input::CloseRequested {
            if state != State::Idle {
                log::info!("Closing with an unfinished annotation, discarded");
            }
            return (State::Idle, Some(Action::Exit));
        }

        match state {
            State::Idle => self.idle(input, chart),
            State::DraggingLine(mut line) => match input {
                Input::PointerMoved(position) => {
                    line.update(chart.to_data(position));
                    (State::DraggingLine(line), None)
                }
                Input::ButtonReleased(Button::Left, position) => {
                    let at = chart.to_data(position);
                    chart.annotations_mut().commit_line(line, at, self.shift);
                    (State::Idle, None)
                }
                _ => (State::DraggingLine(line), None),
            },
            State::DraggingRect(mut rect) => match input {
                Input::PointerMoved(position) => {
                    rect.update(chart.to_data(position));
                    (State::DraggingRect(rect), None)
                }
                Input::ButtonReleased(Button::Right, position) => {
                    let at = chart.to_data(position);
                    chart.annotations_mut().commit_rect(rect, at);
                    (State::Idle, None)
                }
                _ => (State::DraggingRect(rect), None),
            },
            State::TypingText {
                mut draft,
                suppress_trigger,
            } => match input {
                Input::Text(c) => {
                    if !(suppress_trigger && c.eq_ignore_ascii_case(&'t')) {
                        draft.append_char(c);
                    }
                    let next = State::TypingText {
                        draft,
                        suppress_trigger: false,
                    };
                    (next, None)
                }
                Input::Backspace => {
                    draft.backspace();
                    let next = State::TypingText {
                        draft,
                        suppress_trigger,
                    };
                    (next, None)
                }
                Input::KeyPressed(Key::Enter) => {
                    chart.annotations_mut().commit_text(draft);
                    (State::Idle, None)
                }
                // hotkeys stay inert while a label is being typed
                _ => (
                    State::TypingText {
                        draft,
                        suppress_trigger,
                    },
                    None,
                ),
            },
        }
    }

    fn idle(&mut self, input: Input, chart: &mut Chart) -> (State, Option<Action>) {
        match input {
            Input::ButtonPressed(Button::Left, position) => {
                (State::DraggingLine(Segment::begin(chart.to_data(position))), None)
            }
            Input::ButtonPressed(Button::Right, position) => {
                (State::DraggingRect(Segment::begin(chart.to_data(position))), None)
            }
            Input::Scrolled(delta) if delta != 0.0 => {
                let factor = if delta > 0.0 {
                    chart.config().zoom_in_factor
                } else {
                    chart.config().zoom_out_factor
                };
                let focus = self.focus_candle(chart);
                chart.viewport_mut().zoom_at(focus, factor);
                (State::Idle, None)
            }
            Input::KeyPressed(key) => self.hotkey(key, chart),
            _ => (State::Idle, None),
        }
    }

    fn hotkey(&mut self, key: Key, chart: &mut Chart) -> (State, Option<Action>) {
        let pan_fraction = chart.config().pan_fraction;

        match key {
            Key::ArrowLeft => chart.viewport_mut().pan(PanDirection::Older, pan_fraction),
            Key::ArrowRight => chart.viewport_mut().pan(PanDirection::Newer, pan_fraction),
            Key::Enter => {}
            Key::Char(c) => match c.to_ascii_lowercase() {
                'q' => return (State::Idle, Some(Action::Exit)),
                't' => {
                    let anchor = chart.to_data(self.cursor.unwrap_or_else(|| plot_center(chart)));
                    let state = State::TypingText {
                        draft: TextDraft::begin(anchor),
                        suppress_trigger: true,
                    };
                    return (state, None);
                }
                'f' => chart.viewport_mut().reset_to_full(),
                'd' => {
                    chart.annotations_mut().undo_last_line();
                }
                'r' => {
                    chart.annotations_mut().undo_last_rect();
                }
                'y' => {
                    chart.annotations_mut().undo_last_text();
                }
                _ => {}
            },
        }

        (State::Idle, None)
    }

    fn focus_candle(&self, chart: &Chart) -> f32 {
        match self.cursor {
            Some(cursor) => screen_to_candle(cursor.x, chart.viewport(), chart.plot()),
            None => {
                let viewport = chart.viewport();
                viewport.start() + viewport.width() / 2.0
            }
        }
    }
}

fn plot_center(chart: &Chart) -> Point {
    let plot = chart.plot();
    Point::new(plot.left + plot.width / 2.0, plot.top + plot.height / 2.0)
}
