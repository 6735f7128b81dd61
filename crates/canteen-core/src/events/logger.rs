//! Event Logger
//!
//! Writes the event stream as JSON lines, one event per line, in the order
//! events were recorded.

use bevy_ecs::prelude::*;
use canteen_events::Event;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::EventLog;

/// Resource: destination for persisted events.
#[derive(Resource)]
pub struct EventLogger {
    sink: Option<(PathBuf, BufWriter<File>)>,
    written: u64,
}

impl EventLogger {
    /// Opens `path` for writing, replacing any previous run's log and
    /// creating missing parent directories.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        tracing::debug!(path = %path.display(), "event log opened");
        Ok(Self {
            sink: Some((path.to_path_buf(), BufWriter::new(file))),
            written: 0,
        })
    }

    /// A logger that counts events and writes nothing.
    pub fn null() -> Self {
        Self {
            sink: None,
            written: 0,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|(path, _)| path.as_path())
    }

    /// Events accepted so far.
    pub fn event_count(&self) -> u64 {
        self.written
    }

    pub fn log(&mut self, event: &Event) -> io::Result<()> {
        if let Some((_, writer)) = self.sink.as_mut() {
            let line = event.to_jsonl()?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        self.written += 1;
        Ok(())
    }

    pub fn log_batch(&mut self, events: &[Event]) -> io::Result<()> {
        events.iter().try_for_each(|event| self.log(event))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self.sink.as_mut() {
            Some((_, writer)) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "failed to flush event log");
        }
    }
}

/// System: moves this tick's events into the logger, when one is installed.
pub fn persist_events(mut log: ResMut<EventLog>, logger: Option<ResMut<EventLogger>>) {
    let Some(mut logger) = logger else {
        return;
    };
    let events = log.drain();
    if let Err(e) = logger.log_batch(&events) {
        tracing::warn!(error = %e, dropped = events.len(), "failed to write events");
    }
}
