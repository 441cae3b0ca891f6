use {
    anyhow::{Result, bail},
    std::{
        fs::{File, OpenOptions, create_dir_all},
        io::Write,
        path::PathBuf,
        str::FromStr,
        sync::{
            Mutex,
            atomic::{AtomicU8, Ordering},
        },
        time::{SystemTime, UNIX_EPOCH},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Debug => write!(f, "DEBUG"),
            Level::Info => write!(f, "INFO"),
            Level::Warn => write!(f, "WARN"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => bail!("unknown log level: {other}"),
        }
    }
}

impl Level {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            _ => Level::Error,
        }
    }
}

pub trait Logger: Send + Sync {
    fn log(&self, level: Level, file: &str, line: usize, message: &str);
}

pub static LOGGER: Mutex<Option<Box<dyn Logger>>> = Mutex::new(None);

static MAX_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Messages below this level are dropped before they reach the logger.
pub fn set_level(level: Level) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn level() -> Level {
    Level::from_u8(MAX_LEVEL.load(Ordering::Relaxed))
}

pub fn enabled(level: Level) -> bool {
    level >= self::level()
}

/// Route one message to the installed logger. Called by the `log_*!` macros.
pub fn dispatch(level: Level, file: &str, line: usize, message: &str) {
    if !enabled(level) {
        return;
    }
    if let Some(logger) = LOGGER.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
        logger.log(level, file, line, message);
    }
}

pub fn init_logger(logger: impl Logger + 'static) {
    LOGGER
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .replace(Box::new(logger));
}

fn now() -> (u64, u32) {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (elapsed.as_secs(), elapsed.subsec_millis())
}

pub fn format_timestamp() -> String {
    let (secs, millis) = now();
    let (year, month, day) = civil_from_days((secs / 86400) as i64);
    let time_of_day = secs % 86400;
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}",
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60,
        millis
    )
}

pub fn format_today() -> String {
    let (secs, _) = now();
    let (year, month, day) = civil_from_days((secs / 86400) as i64);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

// days since 1970-01-01 to proleptic Gregorian (y, m, d)
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

fn format_line(level: Level, file: &str, line: usize, message: &str) -> String {
    format!(
        "[{}:{} - {}:{}] {}",
        level,
        format_timestamp(),
        file,
        line,
        message
    )
}

pub struct StdoutLogger;

impl Logger for StdoutLogger {
    fn log(&self, level: Level, file: &str, line: usize, message: &str) {
        println!("{}", format_line(level, file, line, message));
    }
}

pub fn init_stdout_logger() {
    init_logger(StdoutLogger);
}

struct FileLoggerState {
    dir: PathBuf,
    current_date: String,
    file: File,
}

/// Appends to `<dir>/<YYYY-MM-DD>.log`, switching files when the date changes.
pub struct FileLogger {
    state: Mutex<FileLoggerState>,
}

impl FileLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        create_dir_all(&dir)?;
        let current_date = format_today();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{}.log", current_date)))?;
        Ok(FileLogger {
            state: Mutex::new(FileLoggerState {
                dir,
                current_date,
                file,
            }),
        })
    }
}

impl Logger for FileLogger {
    fn log(&self, level: Level, file: &str, line: usize, message: &str) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let today = format_today();
        if today != state.current_date {
            let new_path = state.dir.join(format!("{}.log", today));
            match OpenOptions::new().create(true).append(true).open(&new_path) {
                Ok(new_file) => {
                    state.file = new_file;
                    state.current_date = today;
                }
                Err(error) => {
                    eprintln!("Failed to open new log file {:?}: {}", new_path, error);
                }
            }
        }
        let log_line = format_line(level, file, line, message);
        if let Err(error) = writeln!(state.file, "{}", log_line) {
            eprintln!("Failed to write to log file: {}", error);
            eprintln!("{}", log_line);
        }
    }
}

pub fn init_file_logger(dir: impl Into<PathBuf>) -> Result<()> {
    init_logger(FileLogger::new(dir)?);
    Ok(())
}

/// Forwards every message to each of its loggers in order.
pub struct TeeLogger {
    loggers: Vec<Box<dyn Logger>>,
}

impl TeeLogger {
    pub fn new() -> Self {
        Self {
            loggers: Vec::new(),
        }
    }

    pub fn with(mut self, logger: impl Logger + 'static) -> Self {
        self.loggers.push(Box::new(logger));
        self
    }
}

impl Default for TeeLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for TeeLogger {
    fn log(&self, level: Level, file: &str, line: usize, message: &str) {
        for logger in &self.loggers {
            logger.log(level, file, line, message);
        }
    }
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ if $crate::log::enabled($crate::log::Level::Debug) { $crate::log::dispatch($crate::log::Level::Debug, file!(), line!() as usize, &format!($($arg)*)); } }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{ if $crate::log::enabled($crate::log::Level::Info) { $crate::log::dispatch($crate::log::Level::Info, file!(), line!() as usize, &format!($($arg)*)); } }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ if $crate::log::enabled($crate::log::Level::Warn) { $crate::log::dispatch($crate::log::Level::Warn, file!(), line!() as usize, &format!($($arg)*)); } }};
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{ if $crate::log::enabled($crate::log::Level::Error) { $crate::log::dispatch($crate::log::Level::Error, file!(), line!() as usize, &format!($($arg)*)); } }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_civil_from_days_epoch() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
    }

    #[test]
    fn test_civil_from_days_leap_day() {
        // 2024-02-29 is day 19782 since the epoch
        assert_eq!(civil_from_days(19782), (2024, 2, 29));
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("WARNING".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!(" debug ".parse::<Level>().unwrap(), Level::Debug);
        assert!("verbose".parse::<Level>().is_err());
    }
}
