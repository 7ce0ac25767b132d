use crate::{
    config::Config,
    log::{log_level::LogLevel, log_msg::LogMsg, logger_handle::LoggerHandle},
};

use std::{
    fs::{self, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc::{self, TrySendError},
    },
    thread,
    time::{SystemTime, UNIX_EPOCH},
};

/// Flush to disk every 50 lines when debugging, so a crash leaves a useful tail.
#[cfg(feature = "log-debug")]
const FLUSH_BATCH_SIZE: u32 = 50;

/// Flush to disk every 500 lines otherwise.
#[cfg(not(feature = "log-debug"))]
const FLUSH_BATCH_SIZE: u32 = 500;

/// Default capacity of the log queue.
pub const DEFAULT_LOG_CAPACITY: usize = 4_096;

/// Bounded, non-blocking logger writing to a per-process log file.
///
/// Producers enqueue through a [`LoggerHandle`]; a dedicated `room-logger`
/// thread drains the queue and writes lines to disk. When the queue is full
/// the line is dropped and counted, the count is written out the next time
/// the queue drains.
pub struct Logger {
    handle: LoggerHandle,
    dropped: Arc<AtomicU64>,
    _thread: Option<thread::JoinHandle<()>>,
    file_path: PathBuf,
}

impl Logger {
    /// Starts the logger using the `[Logging]` section of the client config.
    ///
    /// Keys: `client_log_path` (directory, `~` is expanded),
    /// `client_log_filename` (file prefix) and `level` (minimum level).
    #[must_use]
    pub fn start_client(config: &Config, cap: usize) -> Self {
        let app_name = config.get_non_empty("Logging", "client_log_filename");
        let min_level = config
            .get_non_empty("Logging", "level")
            .and_then(LogLevel::parse)
            .unwrap_or(LogLevel::Trace);

        let dir = config
            .get_non_empty("Logging", "client_log_path")
            .map_or_else(|| exe_dir_fallback_cwd().join("logs"), expand_path);

        Self::start_in_dir(dir, app_name, cap, min_level)
    }

    /// Starts the logger in `dir`, creating it if missing.
    ///
    /// The file is named `<app_name>-<unix secs>-pid<pid>.log`.
    pub fn start_in_dir<D: AsRef<Path>>(
        dir: D,
        app_name: Option<&str>,
        cap: usize,
        min_level: LogLevel,
    ) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let _ = fs::create_dir_all(&dir);

        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let fname = format!(
            "{}-{}-pid{}.log",
            app_name.unwrap_or("rustyroom"),
            secs,
            std::process::id()
        );
        let file_path = dir.join(fname);

        let (tx, rx) = mpsc::sync_channel::<LogMsg>(cap.max(1));
        let dropped = Arc::new(AtomicU64::new(0));
        let handle = LoggerHandle {
            tx,
            min_level,
            dropped: Arc::clone(&dropped),
        };

        let path_for_worker = file_path.clone();
        let dropped_for_worker = Arc::clone(&dropped);
        let _thread = thread::Builder::new()
            .name("room-logger".into())
            .spawn(move || {
                // Target file, then a temp file, then nowhere. Never panic.
                let writer: Box<dyn Write + Send> = match OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path_for_worker)
                {
                    Ok(f) => Box::new(f),
                    Err(_) => {
                        let fallback = std::env::temp_dir().join("rustyroom-fallback.log");
                        match OpenOptions::new().create(true).append(true).open(&fallback) {
                            Ok(f) => Box::new(f),
                            Err(_) => Box::new(io::sink()),
                        }
                    }
                };
                let mut out = BufWriter::new(writer);
                let mut lines_written: u32 = 0;

                while let Ok(m) = rx.recv() {
                    let lost = dropped_for_worker.swap(0, Ordering::Relaxed);
                    if lost > 0 {
                        let _ = writeln!(&mut out, "[WARN] (logger) dropped {lost} lines");
                    }
                    let _ = writeln!(&mut out, "{}", m.render());
                    lines_written = lines_written.wrapping_add(1);
                    if lines_written.is_multiple_of(FLUSH_BATCH_SIZE) {
                        let _ = out.flush();
                    }
                }
                let _ = out.flush();
            })
            .ok();

        Self {
            handle,
            dropped,
            _thread,
            file_path,
        }
    }

    /// Enqueues a line without blocking; see [`LoggerHandle::try_log`].
    ///
    /// # Errors
    ///
    /// Returns the rejected message when the queue is full or the worker is gone.
    pub fn try_log<S: Into<String>>(
        &self,
        level: LogLevel,
        text: S,
        target: &'static str,
    ) -> Result<(), TrySendError<LogMsg>> {
        self.handle.try_log(level, text, target)
    }

    /// Cloneable sink for the components of one room client.
    #[must_use]
    pub fn handle(&self) -> LoggerHandle {
        self.handle.clone()
    }

    /// Lines dropped since the worker last drained the queue.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

fn exe_dir_fallback_cwd() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Expands a leading `~` to the user's home directory.
fn expand_path(path_str: &str) -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .map(PathBuf::from);

    match (path_str, home) {
        ("~", Some(home)) => home,
        (p, Some(mut home)) if p.starts_with("~/") || p.starts_with("~\\") => {
            home.push(&p[2..]);
            home
        }
        (p, _) => PathBuf::from(p),
    }
}
