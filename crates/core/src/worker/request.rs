use std::path::PathBuf;

use crate::shared::constants::PING;

/// One classified input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Blank line or end of input: stop the worker.
    Shutdown,
    /// Health check, answered with `pong`.
    Ping,
    /// Path of an image to extract faces from.
    Extract(PathBuf),
}

impl Request {
    /// Classifies a raw line. Surrounding whitespace (including the
    /// line terminator) is ignored.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Request::Shutdown,
            PING => Request::Ping,
            path => Request::Extract(PathBuf::from(path)),
        }
    }
}
