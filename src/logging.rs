use std::io;
use std::path::PathBuf;
use std::{env, fs};

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::options::Options;

/// Install the tracing subscriber: output on stderr plus a session log file
/// for postmortems of flaky copytool tests. Returns the guard keeping the
/// file writer alive; hold it for the life of `main`.
///
/// The default filter mirrors gdb's own chatter (the `gdb` target) the way
/// the interactive session would have shown it; `RUST_LOG` overrides.
pub fn init(options: &Options) -> Result<WorkerGuard> {
    let log_file = resolve_log_file(&options.log_file)?;
    let directory = log_file
        .parent()
        .ok_or_else(|| anyhow!("log file {:?} has no parent directory", log_file))?;
    fs::create_dir_all(directory)
        .with_context(|| format!("creating log directory {:?}", directory))?;
    let file_name = log_file
        .file_name()
        .ok_or_else(|| anyhow!("log file {:?} has no file name", log_file))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,gdb=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}

fn resolve_log_file(log_file: &Option<PathBuf>) -> Result<PathBuf> {
    let mut path = match log_file {
        Some(p) => p.clone(),
        None => {
            let cache_dir = dirs::cache_dir()
                .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
                .ok_or_else(|| anyhow!("neither a cache directory nor HOME is available"))?;
            cache_dir.join("ctgate").join("session.log")
        }
    };

    if let Some(s) = path.to_str()
        && s.starts_with("~/")
    {
        let home = env::var_os("HOME").ok_or_else(|| anyhow!("HOME is not set"))?;
        path = PathBuf::from(home).join(&s[2..]);
    }

    Ok(path)
}
