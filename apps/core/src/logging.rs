use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use tracing_subscriber::EnvFilter;

const LOG_STEM: &str = "recentpick";
const ROTATE_AT_BYTES: u64 = 1_000_000;
const KEEP_ARCHIVES: usize = 5;
const FILTER_ENV: &str = "RECENTPICK_LOG";

static PANIC_HOOK: Once = Once::new();

pub fn logs_dir() -> PathBuf {
    crate::config::stable_app_data_dir().join("logs")
}

/// `recentpick.log` is live; `recentpick.1.log` is the newest archive.
fn log_file(dir: &Path, generation: usize) -> PathBuf {
    match generation {
        0 => dir.join(format!("{LOG_STEM}.log")),
        n => dir.join(format!("{LOG_STEM}.{n}.log")),
    }
}

/// Routes `tracing` output to the log file. A second call keeps the first subscriber.
pub fn init() -> io::Result<PathBuf> {
    let dir = logs_dir();
    fs::create_dir_all(&dir)?;
    rotate(&dir)?;

    let live = log_file(&dir, 0);
    let writer = OpenOptions::new().create(true).append(true).open(&live)?;
    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(writer))
        .try_init();

    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "recentpick::panic", "{info}");
            previous(info);
        }));
    });
    Ok(live)
}

/// Shifts archives up one generation once the live file is too large.
/// The oldest generation past `KEEP_ARCHIVES` is deleted.
fn rotate(dir: &Path) -> io::Result<()> {
    let size = match fs::metadata(log_file(dir, 0)) {
        Ok(meta) => meta.len(),
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(error),
    };
    if size < ROTATE_AT_BYTES {
        return Ok(());
    }

    match fs::remove_file(log_file(dir, KEEP_ARCHIVES)) {
        Err(error) if error.kind() != io::ErrorKind::NotFound => return Err(error),
        _ => {}
    }
    for generation in (0..KEEP_ARCHIVES).rev() {
        let from = log_file(dir, generation);
        if from.exists() {
            fs::rename(&from, log_file(dir, generation + 1))?;
        }
    }
    Ok(())
}
