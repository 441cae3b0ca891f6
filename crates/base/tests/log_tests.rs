use base::{FileLogger, Level, Logger, TeeLogger, Vec2};
use std::{
    fs,
    sync::{Arc, Mutex},
};

struct Capture(Arc<Mutex<Vec<(Level, String)>>>);

impl Logger for Capture {
    fn log(&self, level: Level, _file: &str, _line: usize, message: &str) {
        self.0.lock().unwrap().push((level, message.to_string()));
    }
}

#[test]
fn test_file_logger_creates_directory_and_daily_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");

    let logger = FileLogger::new(&log_dir).expect("Failed to create FileLogger");
    logger.log(Level::Info, "main.rs", 7, "hello");

    let path = log_dir.join(format!("{}.log", base::format_today()));
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("INFO"));
    assert!(contents.contains("main.rs:7] hello"));
    assert!(contents.ends_with('\n'));
}

#[test]
fn test_file_logger_appends_lines() {
    let dir = tempfile::tempdir().unwrap();
    let logger = FileLogger::new(dir.path()).unwrap();
    logger.log(Level::Warn, "a.rs", 1, "first");
    logger.log(Level::Error, "b.rs", 2, "second");

    let path = dir.path().join(format!("{}.log", base::format_today()));
    let contents = fs::read_to_string(path).unwrap();
    assert_eq!(contents.lines().count(), 2);
}

#[test]
fn test_tee_logger_forwards_to_all() {
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));
    let tee = TeeLogger::new()
        .with(Capture(Arc::clone(&first)))
        .with(Capture(Arc::clone(&second)));

    tee.log(Level::Info, "x.rs", 1, "frame 1");

    assert_eq!(first.lock().unwrap().len(), 1);
    assert_eq!(second.lock().unwrap()[0].1, "frame 1");
}

#[test]
fn test_vec2_display_and_area() {
    let size = Vec2::new(640usize, 480);
    assert_eq!(size.to_string(), "640x480");
    assert_eq!(size.area(), 640 * 480);
    assert!(!size.is_empty());
    assert!(Vec2::new(0usize, 10).is_empty());
}
