//! Session: the parse loop and the cross-thread grid hand-off.
//!
//! The core runs single-threaded per terminal session: a dedicated reader
//! pulls bytes from the PTY side and applies them here. The only
//! concurrency at the core's edge is the hand-off to the render thread,
//! which shares the screen through one coarse-grained mutex: the parse
//! side holds it while applying a chunk's effects, the render side holds
//! it while reading lines to paint. Lines and cells themselves are not
//! synchronized and must only be touched under that lock.
//!
//! Stopping is cooperative: the flag is checked between chunks, never
//! mid-sequence, so a pending partial sequence is abandoned, never
//! partially applied.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use anzu_parser::Parser;

use crate::screen::Screen;

/// Read chunk size for the pump loop.
const READ_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("terminal read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle used to request a stop from another thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// One terminal session: parser plus the shared screen.
pub struct Session {
    parser: Parser,
    screen: Arc<Mutex<Screen>>,
    stop: StopHandle,
}

impl Session {
    pub fn new(rows: usize, cols: usize) -> Self {
        Session {
            parser: Parser::new(),
            screen: Arc::new(Mutex::new(Screen::new(rows, cols))),
            stop: StopHandle::default(),
        }
    }

    /// Shared screen handle for the render side. Lock it to read lines;
    /// the parse side locks the same mutex while applying input.
    pub fn screen(&self) -> Arc<Mutex<Screen>> {
        Arc::clone(&self.screen)
    }

    /// Handle for requesting a cooperative stop of [`Session::run`].
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Apply one chunk of raw bytes under the screen lock.
    pub fn feed(&mut self, bytes: &[u8]) {
        let mut screen = self.screen.lock();
        self.parser.feed(bytes, &mut *screen);
    }

    /// Resize the terminal (driven by the windowing collaborator).
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.screen.lock().resize(rows, cols);
    }

    /// Blocking pump loop: read chunks from `reader` and apply them until
    /// end of stream or a stop request. The stop flag is only honored
    /// between chunks.
    pub fn run<R: Read>(&mut self, mut reader: R) -> Result<(), SessionError> {
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        loop {
            if self.stop.is_stopped() {
                return Ok(());
            }
            match reader.read(&mut buffer) {
                Ok(0) => return Ok(()),
                Ok(n) => self.feed(&buffer[..n]),
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(SessionError::Io(err)),
            }
        }
    }
}
