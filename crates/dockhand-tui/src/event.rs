//! Terminal event handling
//!
//! A reader thread polls crossterm and forwards key presses and resizes into
//! the message queue. It can be paused while a foreground process owns the
//! terminal.

use crate::message::Message;
use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const PARK_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Default)]
struct Flags {
    paused: AtomicBool,
    parked: AtomicBool,
    stop: AtomicBool,
}

/// Input reader running on its own thread
pub struct EventHandler {
    flags: Arc<Flags>,
    handle: Option<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(tx: UnboundedSender<Message>) -> Self {
        let flags = Arc::new(Flags::default());
        let thread_flags = Arc::clone(&flags);
        let log = tracing::dispatcher::get_default(|d| d.clone());
        let handle = std::thread::spawn(move || {
            tracing::dispatcher::with_default(&log, || read_loop(tx, thread_flags))
        });
        Self {
            flags,
            handle: Some(handle),
        }
    }

    /// Stop reading input and wait until the reader is idle
    pub fn pause(&self) {
        self.flags.paused.store(true, Ordering::SeqCst);
        let deadline = Instant::now() + PARK_TIMEOUT;
        while !self.flags.parked.load(Ordering::SeqCst) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    pub fn resume(&self) {
        self.flags.paused.store(false, Ordering::SeqCst);
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.flags.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_loop(tx: UnboundedSender<Message>, flags: Arc<Flags>) {
    while !flags.stop.load(Ordering::SeqCst) {
        if flags.paused.load(Ordering::SeqCst) {
            flags.parked.store(true, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            continue;
        }
        flags.parked.store(false, Ordering::SeqCst);

        let message = match event::poll(POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    Some(Message::Key(key))
                }
                Ok(CrosstermEvent::Resize(w, h)) => Some(Message::Resize(w, h)),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!("Failed to read terminal event: {}", e);
                    None
                }
            },
            Ok(false) => None,
            Err(e) => {
                tracing::warn!("Failed to poll terminal events: {}", e);
                std::thread::sleep(POLL_INTERVAL);
                None
            }
        };

        if let Some(message) = message {
            if tx.send(message).is_err() {
                break;
            }
        }
    }
}
