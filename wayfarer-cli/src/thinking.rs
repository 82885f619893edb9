//! # Thinking Indicator
//!
//! Console animation shown while the model is working: a label followed by
//! zero to five dots, redrawn in place on a background thread.

use std::io::{self, Write};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const MAX_DOTS: usize = 5;
const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

struct Running {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct ThinkingDots {
    label: String,
    interval: Duration,
    out: SharedWriter,
    running: Option<Running>,
}

impl ThinkingDots {
    /// Indicator drawing to stdout.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_writer(label, DEFAULT_INTERVAL, Box::new(io::stdout()))
    }

    pub fn with_writer(
        label: impl Into<String>,
        interval: Duration,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            label: label.into(),
            interval,
            out: Arc::new(Mutex::new(out)),
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start animating. Does nothing when already running.
    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }

        let (stop, stopped) = mpsc::channel();
        let label = self.label.clone();
        let interval = self.interval;
        let out = Arc::clone(&self.out);

        let handle = thread::spawn(move || {
            let mut count = 0usize;
            loop {
                draw(&out, &format_line(&label, count));
                count += 1;
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            let blank = " ".repeat(label.len() + MAX_DOTS);
            draw(&out, &blank);
            draw(&out, "");
        });

        self.running = Some(Running { stop, handle });
    }

    /// Stop animating, wait for the thread and clear the line.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.stop.send(());
        if running.handle.join().is_err() {
            tracing::warn!("Thinking indicator thread panicked");
        }
    }

    /// Start now and stop when the returned guard is dropped.
    pub fn guard(&mut self) -> DotsGuard<'_> {
        self.start();
        DotsGuard { dots: self }
    }
}

impl Drop for ThinkingDots {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Keeps a [`ThinkingDots`] running for the guard's lifetime.
pub struct DotsGuard<'a> {
    dots: &'a mut ThinkingDots,
}

impl Drop for DotsGuard<'_> {
    fn drop(&mut self) {
        self.dots.stop();
    }
}

fn format_line(label: &str, count: usize) -> String {
    let dots = count % (MAX_DOTS + 1);
    format!("{}{}{}", label, ".".repeat(dots), " ".repeat(MAX_DOTS - dots))
}

fn draw(out: &SharedWriter, line: &str) {
    if let Ok(mut out) = out.lock() {
        let _ = write!(out, "\r{}", line);
        let _ = out.flush();
    }
}
