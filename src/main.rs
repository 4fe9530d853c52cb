#![windows_subsystem = "windows"]

mod chart;
mod logger;
mod window;

use chart::ChartCanvas;
use data::chart::Chart;
use data::{Action, Config, Controller, Input};
use market::Series;
use window::{WindowEvent, window_events};

use iced::widget::canvas::Canvas;
use iced::{Element, Length, Subscription, Task};

fn main() {
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("candleview: {e}");
        std::process::exit(1);
    }
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("Failed to initialize logger: {0}")]
    Log(#[from] logger::Error),
    #[error("Failed to load price data: {0}")]
    Load(#[from] market::LoadError),
    #[error("Window system error: {0}")]
    Gui(#[from] iced::Error),
}

fn run() -> Result<(), StartupError> {
    let config_path = data::data_path(Some(data::CONFIG_FILE));
    let config = data::config::read(&config_path);

    let (log_level, log_max_size_mb) = match &config {
        Ok(config) => (config.log_level.as_str(), config.log_max_size_mb),
        Err(_) => (
            data::config::DEFAULT_LOG_LEVEL,
            data::config::DEFAULT_LOG_MAX_SIZE_MB,
        ),
    };
    logger::setup(cfg!(debug_assertions), log_level, log_max_size_mb)?;

    let config = match config {
        Ok(config) => {
            log::info!("Loaded config from {}", config_path.display());
            config
        }
        Err(e) if e.is_not_found() => {
            log::info!("No config at {}, using defaults", config_path.display());
            Config::default()
        }
        Err(e) => {
            log::warn!("Ignoring unreadable config {}: {e}", config_path.display());
            Config::default()
        }
    };

    let series = market::load_series(&config.data_file)?;
    let window_size = config.window.size();

    iced::application("Candlesticks", Viewer::update, Viewer::view)
        .window(window::settings(window_size))
        .subscription(Viewer::subscription)
        .run_with(move || Viewer::new(series, &config))?;

    Ok(())
}

#[derive(Debug, Clone)]
enum Message {
    Chart(chart::Message),
    WindowEvent(WindowEvent),
}

struct Viewer {
    chart: Chart,
    controller: Controller,
}

impl Viewer {
    fn new(series: Series, config: &Config) -> (Self, Task<Message>) {
        let viewer = Self {
            chart: Chart::new(series, config.chart, config.window.size()),
            controller: Controller::new(),
        };

        (viewer, Task::none())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        let inputs = match message {
            Message::Chart(chart::Message::Input(inputs)) => inputs,
            Message::WindowEvent(WindowEvent::CloseRequested(_)) => vec![Input::CloseRequested],
        };

        for input in inputs {
            if let Some(Action::Exit) = self.controller.handle(input, &mut self.chart) {
                log::info!("Exiting");
                return iced::exit();
            }
        }

        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let canvas = Canvas::new(ChartCanvas {
            chart: &self.chart,
            controller: &self.controller,
        })
        .width(Length::Fill)
        .height(Length::Fill);

        Element::from(canvas).map(Message::Chart)
    }

    fn subscription(&self) -> Subscription<Message> {
        window_events().map(Message::WindowEvent)
    }
}
