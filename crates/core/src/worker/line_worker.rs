use std::io::{BufRead, Write};
use std::ops::ControlFlow;
use std::path::Path;

use crate::pipeline::extract_faces_use_case::ExtractFacesUseCase;
use crate::shared::constants::PONG;

use super::error::WorkerError;
use super::request::Request;

/// Counters reported when the worker shuts down cleanly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub pings: usize,
    pub extractions: usize,
    pub faces: usize,
}

/// Line-oriented request loop over an input and output stream.
///
/// Protocol, one request per line:
/// - blank line or end of input: stop, no output
/// - `ping`: reply `pong`
/// - anything else: an image path, replied with one JSON line
///
/// Every reply is flushed before the next line is read. The first
/// failure ends the loop without writing a reply for that request.
pub struct LineWorker<R, W> {
    use_case: ExtractFacesUseCase,
    input: R,
    output: W,
    stats: WorkerStats,
}

impl<R: BufRead, W: Write> LineWorker<R, W> {
    pub fn new(use_case: ExtractFacesUseCase, input: R, output: W) -> Self {
        Self {
            use_case,
            input,
            output,
            stats: WorkerStats::default(),
        }
    }

    /// Serves requests until shutdown or the first error.
    pub fn run(&mut self) -> Result<WorkerStats, WorkerError> {
        log::info!("Worker ready");
        let mut line = String::new();
        loop {
            line.clear();
            let request = match self.input.read_line(&mut line)? {
                0 => Request::Shutdown,
                _ => Request::parse(&line),
            };
            if self.handle(request)?.is_break() {
                break;
            }
        }
        log::info!(
            "Worker shutting down: {} extraction(s), {} face(s), {} ping(s)",
            self.stats.extractions,
            self.stats.faces,
            self.stats.pings
        );
        Ok(self.stats)
    }

    /// Handles a single request, writing its reply if it has one.
    pub fn handle(&mut self, request: Request) -> Result<ControlFlow<()>, WorkerError> {
        match request {
            Request::Shutdown => Ok(ControlFlow::Break(())),
            Request::Ping => {
                self.write_line(PONG)?;
                self.stats.pings += 1;
                Ok(ControlFlow::Continue(()))
            }
            Request::Extract(path) => {
                let json = self.extract(&path)?;
                self.write_line(&json)?;
                Ok(ControlFlow::Continue(()))
            }
        }
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats
    }

    fn extract(&mut self, path: &Path) -> Result<String, WorkerError> {
        log::debug!("Extracting faces from {}", path.display());
        let extraction = self
            .use_case
            .execute(path)
            .map_err(|e| WorkerError::Extraction {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let json = extraction.to_json_line().map_err(|e| WorkerError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.stats.extractions += 1;
        self.stats.faces += extraction.len();
        Ok(json)
    }

    fn write_line(&mut self, line: &str) -> Result<(), WorkerError> {
        writeln!(self.output, "{line}")?;
        self.output.flush()?;
        Ok(())
    }
}
