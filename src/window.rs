use iced::{Size, Subscription, window};

pub use iced::window::Settings;

/// Closing is routed through the app so the chart can log and drop any
/// unfinished annotation before exiting.
pub fn settings(size: Size) -> Settings {
    Settings {
        size,
        min_size: Some(Size::new(400.0, 300.0)),
        exit_on_close_request: false,
        ..Default::default()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum WindowEvent {
    CloseRequested(window::Id),
}

pub fn window_events() -> Subscription<WindowEvent> {
    iced::event::listen_with(filtered_events)
}

fn filtered_events(
    event: iced::Event,
    _status: iced::event::Status,
    window: window::Id,
) -> Option<WindowEvent> {
    match &event {
        iced::Event::Window(window::Event::CloseRequested) => {
            Some(WindowEvent::CloseRequested(window))
        }
        _ => None,
    }
}
