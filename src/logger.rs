use std::{
    fs,
    io::{self, Write},
    path::Path,
    process,
    sync::mpsc,
    thread,
};

pub use data::log::Error;

/// Crates whose records reach the sink at the configured level.
const APP_TARGETS: [&str; 3] = ["candleview", "data", "market"];

enum LogMessage {
    Content(Vec<u8>),
    Flush,
    Shutdown,
}

/// Installs the global logger. Debug builds write to stdout, release builds
/// to a file in the data directory capped at `max_size_mb`.
pub fn setup(is_debug: bool, level: &str, max_size_mb: u64) -> Result<(), Error> {
    let level_filter = level.parse::<log::Level>()?.to_level_filter();

    let mut io_sink = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}:{} -- {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            message
        ));
    });

    if is_debug {
        io_sink = io_sink.chain(io::stdout());
    } else {
        let log_path = data::log::path()?;
        rotate_previous(&log_path)?;

        let limit = max_size_mb.saturating_mul(1024 * 1024);
        let sink: Box<dyn Write + Send> = Box::new(BackgroundWriter::spawn(log_path, limit)?);
        io_sink = io_sink.chain(sink);
    }

    APP_TARGETS
        .iter()
        .fold(
            fern::Dispatch::new()
                .level(log::LevelFilter::Off)
                .level_for("panic", log::LevelFilter::Error)
                .level_for("iced_wgpu", log::LevelFilter::Warn),
            |dispatch, target| dispatch.level_for(*target, level_filter),
        )
        .chain(io_sink)
        .apply()?;

    Ok(())
}

/// Keeps exactly one previous session's log around.
fn rotate_previous(log_path: &Path) -> io::Result<()> {
    let dir = log_path.parent().unwrap_or(Path::new("."));
    let previous = dir.join(data::log::PREVIOUS_LOG_FILE);

    if previous.exists() {
        fs::remove_file(&previous)?;
    }
    if log_path.exists() {
        fs::rename(log_path, &previous)?;
    }

    Ok(())
}

/// Hands formatted records to a dedicated thread so the UI thread never
/// blocks on disk.
struct BackgroundWriter {
    sender: mpsc::Sender<LogMessage>,
    _handle: thread::JoinHandle<()>,
}

impl BackgroundWriter {
    fn spawn(path: impl AsRef<Path> + Send + 'static, limit: u64) -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("candleview-log".to_string())
            .spawn(move || {
                let mut file = match CappedFile::open(path.as_ref(), limit) {
                    Ok(file) => file,
                    Err(e) => {
                        eprintln!("Failed to open log file: {e}");
                        return;
                    }
                };

                while let Ok(message) = receiver.recv() {
                    let result = match message {
                        LogMessage::Content(bytes) => file.write_all(&bytes),
                        LogMessage::Flush => file.flush(),
                        LogMessage::Shutdown => break,
                    };
                    if let Err(e) = result {
                        eprintln!("Logging error: {e}");
                    }
                }
            })?;

        Ok(Self {
            sender,
            _handle: handle,
        })
    }

    fn send(&self, message: LogMessage) -> io::Result<()> {
        self.sender
            .send(message)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "Log thread disconnected"))
    }
}

impl Write for BackgroundWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.send(LogMessage::Content(buf.to_vec()))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send(LogMessage::Flush)
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        let _ = self.send(LogMessage::Shutdown);
    }
}

struct CappedFile {
    file: fs::File,
    written: u64,
    limit: u64,
}

impl CappedFile {
    fn open(path: &Path, limit: u64) -> io::Result<Self> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            file,
            written,
            limit,
        })
    }

    fn fits(&self, len: usize) -> bool {
        self.written.saturating_add(len as u64) <= self.limit
    }
}

impl Write for CappedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.fits(buf.len()) {
            let notice = format!(
                "\n{}:FATAL -- Log file reached {} bytes, aborting\n",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                self.limit
            );
            eprintln!("{notice}");

            let _ = self.file.write_all(notice.as_bytes());
            let _ = self.file.flush();

            process::abort();
        }

        let bytes = self.file.write(buf)?;
        self.written += bytes as u64;

        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
