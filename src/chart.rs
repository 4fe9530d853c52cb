use data::Controller;
use data::chart::Chart;
use data::chart::scene::{self, Label, Primitive};
use data::interaction::{Button, Input, Key};

use iced::keyboard::{self, key::Named};
use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Stroke};
use iced::{Point, Rectangle, Renderer, Theme, Vector, mouse};

#[derive(Debug, Clone)]
pub enum Message {
    Input(Vec<Input>),
}

/// Canvas over the chart: translates toolkit events into [`Input`]s and
/// paints the composed scene.
pub struct ChartCanvas<'a> {
    pub chart: &'a Chart,
    pub controller: &'a Controller,
}

impl canvas::Program<Message> for ChartCanvas<'_> {
    type State = ();

    fn update(
        &self,
        _state: &mut (),
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let mut inputs = Vec::new();

        if self.chart.window() != bounds.size() {
            inputs.push(Input::Resized(bounds.size()));
        }

        if let Some(input) = self.translate(event, bounds, cursor) {
            inputs.extend(input);
        }

        if inputs.is_empty() {
            return None;
        }

        Some(canvas::Action::publish(Message::Input(inputs)).and_capture())
    }

    fn draw(
        &self,
        _state: &(),
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        let scene = scene::compose(
            self.chart,
            self.controller.pending(),
            cursor.position_in(bounds),
        );

        for primitive in scene.primitives() {
            paint(&mut frame, primitive, bounds);
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &(),
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

impl ChartCanvas<'_> {
    fn translate(
        &self,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Vec<Input>> {
        match event {
            Event::Mouse(mouse_event) => self.translate_mouse(mouse_event, bounds, cursor),
            Event::Keyboard(keyboard_event) => translate_keyboard(keyboard_event),
            _ => None,
        }
    }

    fn translate_mouse(
        &self,
        event: &mouse::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Vec<Input>> {
        // releases and drags keep tracking once the pointer leaves the canvas
        let local = cursor
            .position()
            .map(|p| Point::new(p.x - bounds.x, p.y - bounds.y))
            .or(self.controller.cursor());

        let input = match event {
            mouse::Event::ButtonPressed(button) => {
                let position = cursor.position_in(bounds)?;
                Input::ButtonPressed(translate_button(*button)?, position)
            }
            mouse::Event::ButtonReleased(button) => {
                Input::ButtonReleased(translate_button(*button)?, local?)
            }
            mouse::Event::CursorMoved { .. } => Input::PointerMoved(local?),
            mouse::Event::WheelScrolled { delta } => {
                cursor.position_in(bounds)?;

                let y = match delta {
                    mouse::ScrollDelta::Lines { y, .. } | mouse::ScrollDelta::Pixels { y, .. } => {
                        *y
                    }
                };
                Input::Scrolled(y)
            }
            _ => return None,
        };

        Some(vec![input])
    }
}

fn translate_button(button: mouse::Button) -> Option<Button> {
    match button {
        mouse::Button::Left => Some(Button::Left),
        mouse::Button::Right => Some(Button::Right),
        _ => None,
    }
}

fn translate_keyboard(event: &keyboard::Event) -> Option<Vec<Input>> {
    match event {
        keyboard::Event::KeyPressed { key, text, .. } => {
            let inputs = translate_key_press(key.as_ref(), text.as_deref());
            (!inputs.is_empty()).then_some(inputs)
        }
        keyboard::Event::ModifiersChanged(modifiers) => Some(vec![Input::ModifiersChanged {
            shift: modifiers.shift(),
        }]),
        _ => None,
    }
}

/// The key itself comes first, then the characters it typed, so the
/// controller sees a `T` press before the `t` that would start the label.
fn translate_key_press(key: keyboard::Key<&str>, text: Option<&str>) -> Vec<Input> {
    let mut inputs = Vec::with_capacity(2);

    match key {
        keyboard::Key::Named(Named::Enter) => inputs.push(Input::KeyPressed(Key::Enter)),
        keyboard::Key::Named(Named::ArrowLeft) => inputs.push(Input::KeyPressed(Key::ArrowLeft)),
        keyboard::Key::Named(Named::ArrowRight) => {
            inputs.push(Input::KeyPressed(Key::ArrowRight));
        }
        keyboard::Key::Named(Named::Backspace) => return vec![Input::Backspace],
        keyboard::Key::Character(c) => {
            if let Some(c) = c.chars().next() {
                inputs.push(Input::KeyPressed(Key::Char(c)));
            }
        }
        _ => {}
    }

    inputs.extend(
        text.into_iter()
            .flat_map(str::chars)
            .filter(|c| !c.is_control())
            .map(Input::Text),
    );

    inputs
}

fn paint(frame: &mut Frame, primitive: &Primitive, bounds: Rectangle) {
    match primitive {
        Primitive::Clear(color) => frame.fill_rectangle(Point::ORIGIN, bounds.size(), *color),
        Primitive::Line {
            from,
            to,
            width,
            color,
        } => frame.stroke(
            &Path::line(*from, *to),
            Stroke::default().with_color(*color).with_width(*width),
        ),
        Primitive::Rect {
            origin,
            size,
            fill,
            outline,
        } => {
            if let Some(fill) = fill {
                frame.fill_rectangle(*origin, *size, *fill);
            }
            if let Some(outline) = outline {
                frame.stroke(
                    &Path::rectangle(*origin, *size),
                    Stroke::default().with_color(*outline).with_width(1.0),
                );
            }
        }
        Primitive::Text(label) => paint_label(frame, label),
    }
}

fn paint_label(frame: &mut Frame, label: &Label) {
    let text = |position: Point| canvas::Text {
        content: label.content.clone(),
        position,
        size: iced::Pixels(label.size),
        color: label.color,
        ..canvas::Text::default()
    };

    if label.rotation == 0.0 {
        frame.fill_text(text(Point::new(
            label.anchor.x + label.offset_x,
            label.anchor.y,
        )));
        return;
    }

    frame.with_save(|frame| {
        frame.translate(Vector::new(label.anchor.x, label.anchor.y));
        frame.rotate(label.rotation);
        frame.fill_text(text(Point::new(label.offset_x, 0.0)));
    });
}
