use std::{
    env,
    fs, io,
    net::SocketAddr,
    panic,
    path::{Path, PathBuf},
    str::FromStr,
    thread,
    time::{Duration, SystemTime},
};
use tokio::net::TcpListener;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

const DEBUG_LOG_FILE: &str = "debug.log";

/// Logging settings resolved once at startup and handed to [`init_tracing`].
#[derive(Clone, Debug)]
pub struct LogConfig {
    pub service_name: String,
    pub debug: bool,
    pub log_dir: PathBuf,
    pub retention_days: u64,
    pub cleanup_interval_minutes: u64,
}

impl LogConfig {
    pub fn from_env(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            debug: env_flag("DEBUG"),
            log_dir: PathBuf::from(env::var("LOG_DIR").unwrap_or_else(|_| "data".to_string())),
            retention_days: env_or("LOG_RETENTION_DAYS", 14u64),
            cleanup_interval_minutes: env_or("LOG_CLEANUP_INTERVAL_MINUTES", 360u64),
        }
    }

    fn default_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

pub struct TracingGuards {
    _file_guard: Option<WorkerGuard>,
}

pub fn init_tracing(config: &LogConfig) -> TracingGuards {
    // RUST_LOG wins over the debug flag when both are present.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);
    let mut file_guard: Option<WorkerGuard> = None;
    let mut file_layer = None;

    // The file sink only exists in debug mode; stdout is always on.
    if config.debug && fs::create_dir_all(&config.log_dir).is_ok() {
        let appender = panic::catch_unwind(|| {
            tracing_appender::rolling::daily(&config.log_dir, DEBUG_LOG_FILE)
        })
        .ok();

        if let Some(appender) = appender {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_layer = Some(fmt::layer().with_ansi(false).with_writer(writer));
            file_guard = Some(guard);
        }
    }

    if let Some(layer) = file_layer {
        let subscriber = Registry::default()
            .with(filter)
            .with(stdout_layer)
            .with(layer);
        let _ = tracing::subscriber::set_global_default(subscriber);
    } else {
        let subscriber = Registry::default().with(filter).with(stdout_layer);
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    if file_guard.is_some() {
        spawn_log_cleanup(
            config.log_dir.clone(),
            config.retention_days,
            config.cleanup_interval_minutes,
        );
    }

    TracingGuards {
        _file_guard: file_guard,
    }
}

pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    // Parse typed environment values with a fallback.
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

pub fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| parse_flag(&value)).unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn spawn_log_cleanup(log_root: PathBuf, retention_days: u64, cleanup_interval_minutes: u64) {
    if retention_days == 0 || cleanup_interval_minutes == 0 {
        return;
    }

    let retention = Duration::from_secs(retention_days * 24 * 60 * 60);
    let interval = Duration::from_secs(cleanup_interval_minutes * 60);

    thread::spawn(move || loop {
        let cutoff = SystemTime::now().checked_sub(retention);
        if let Some(cutoff) = cutoff {
            cleanup_old_logs(&log_root, cutoff);
        }
        thread::sleep(interval);
    });
}

fn cleanup_old_logs(root: &Path, cutoff: SystemTime) {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        // Only rotated debug logs; the database may share this directory.
        let is_debug_log = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(DEBUG_LOG_FILE))
            .unwrap_or(false);
        if !is_debug_log || path.is_dir() {
            continue;
        }
        let modified = match fs::metadata(&path).and_then(|metadata| metadata.modified()) {
            Ok(modified) => modified,
            Err(_) => continue,
        };
        if modified < cutoff {
            let _ = fs::remove_file(&path);
        }
    }
}

pub async fn bind_listener(port: u16) -> io::Result<TcpListener> {
    // Bind on all interfaces for container compatibility.
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr).await
}

pub async fn shutdown_signal() {
    // Handle ctrl-c and SIGTERM to allow graceful shutdown.
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "sigterm handler unavailable");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
