use std::collections::HashMap;
use std::io::stdout;
use std::path::{Path, PathBuf};

use tracing::dispatcher::Dispatch;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::Layer as TraceLayer;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::{Layer as LayerIntf, Registry};

use crate::config::{AppBasepathCfg, AppLogHandlerCfg, AppLoggerCfg, AppLoggingCfg};
use crate::constant::logging::{Destination as DstOption, Level as AppLogLevelInner};

pub type AppLogLevel = AppLogLevelInner;

/// in `tracing` ecosystem the order is TRACE > DEBUG > INFO > WARN > ERROR,
/// FATAL has no counterpart and is reported as ERROR
pub const fn tracing_level(lvl: &AppLogLevel) -> tracing::Level {
    match lvl {
        AppLogLevel::FATAL | AppLogLevel::ERROR => tracing::Level::ERROR,
        AppLogLevel::WARNING => tracing::Level::WARN,
        AppLogLevel::INFO => tracing::Level::INFO,
        AppLogLevel::DEBUG => tracing::Level::DEBUG,
        AppLogLevel::TRACE => tracing::Level::TRACE,
    }
}

struct LogHandler {
    writer: NonBlocking,
    min_level: tracing::Level,
}

/// Log dispatchers keyed by module path.
///
/// An event emitted from `delivery_staff::workflow::state` is routed to the
/// logger configured for that exact path, or else to the closest configured
/// parent such as `delivery_staff::workflow`. Modules without any configured
/// logger go to the console at INFO level.
pub struct AppLogContext {
    loggers: HashMap<String, Dispatch>,
    fallback: Dispatch,
    // writers stop flushing once their guard is dropped
    _io_guards: Vec<WorkerGuard>,
}

fn localfs_path(basepath: &str, relative: &str) -> PathBuf {
    let mut fullpath = PathBuf::from(basepath);
    fullpath.push(relative.trim_start_matches('/'));
    fullpath
}

fn open_writer(basepath: &AppBasepathCfg, cfg: &AppLogHandlerCfg) -> (NonBlocking, WorkerGuard) {
    match &cfg.destination {
        DstOption::CONSOLE => tracing_appender::non_blocking(stdout()),
        DstOption::LOCALFS => {
            // file-type handlers without path are rejected by the config loader
            let relative = cfg.path.as_deref().unwrap_or_default();
            let fullpath = localfs_path(basepath.system.as_str(), relative);
            let dir = fullpath.parent().unwrap_or(Path::new("."));
            let fname = fullpath.file_name().unwrap_or_default();
            let appender = RollingFileAppender::new(Rotation::NEVER, dir, fname);
            tracing_appender::non_blocking(appender)
        }
    }
}

fn build_dispatch(outputs: Vec<(NonBlocking, tracing::Level)>) -> Dispatch {
    let layers = outputs
        .into_iter()
        .map(|(writer, lvl)| {
            TraceLayer::new()
                .with_writer(writer)
                .with_file(false)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(LevelFilter::from_level(lvl))
        })
        .collect::<Vec<_>>();
    Dispatch::new(Registry::default().with(layers))
}

fn build_logger(cfg: &AppLoggerCfg, handlers: &HashMap<String, LogHandler>) -> Dispatch {
    let outputs = cfg
        .handlers
        .iter()
        .filter_map(|alias| handlers.get(alias.as_str()))
        .map(|h| {
            // level of the logger overrides minimum level of its handlers
            let lvl = cfg
                .level
                .as_ref()
                .map(tracing_level)
                .unwrap_or(h.min_level);
            (h.writer.clone(), lvl)
        })
        .collect::<Vec<_>>();
    build_dispatch(outputs)
}

impl AppLogContext {
    pub fn new(basepath: &AppBasepathCfg, cfg: &AppLoggingCfg) -> Self {
        let mut _io_guards = Vec::with_capacity(cfg.handlers.len() + 1);
        let mut handlers = HashMap::new();
        for item in cfg.handlers.iter() {
            let (writer, guard) = open_writer(basepath, item);
            _io_guards.push(guard);
            let hdlr = LogHandler {
                writer,
                min_level: tracing_level(&item.min_level),
            };
            handlers.insert(item.alias.to_string(), hdlr);
        }
        let loggers = cfg
            .loggers
            .iter()
            .map(|item| (item.alias.to_string(), build_logger(item, &handlers)))
            .collect::<HashMap<_, _>>();
        let (console, guard) = tracing_appender::non_blocking(stdout());
        _io_guards.push(guard);
        let fallback = build_dispatch(vec![(console, tracing::Level::INFO)]);
        Self {
            loggers,
            fallback,
            _io_guards,
        }
    }

    pub fn get_assigner(&self, modpath: &str) -> &Dispatch {
        let mut key = modpath;
        loop {
            if let Some(d) = self.loggers.get(key) {
                break d;
            }
            match key.rsplit_once("::") {
                Some((parent, _)) => key = parent,
                None => break &self.fallback,
            }
        }
    }
} // end of impl AppLogContext

#[macro_export]
macro_rules! app_log_event {
    ( $ctx:ident, $lvl:expr, $($arg:tt)+ ) => {{
        const LVL_INNER: tracing::Level = $crate::logging::tracing_level(&$lvl);
        let assigner = $ctx.get_assigner(module_path!());
        tracing::dispatcher::with_default(assigner, || {
            tracing::event!(LVL_INNER, $($arg)+);
        });
    }};
}

pub use app_log_event;
