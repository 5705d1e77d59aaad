use log::LevelFilter;
use log4rs::Config;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::{Result, RunnerError};

// ISO 8601 timestamp, color coded level tag, then the emitting module
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

/// Installs the global logger. Messages go to stderr so that tables written
/// to stdout stay machine readable.
pub fn init_logging(level: LevelFilter) -> Result<log4rs::Handle> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| RunnerError::Logging(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| RunnerError::Logging(e.to_string()))
}
