use std::collections::VecDeque;
use std::time::Instant;

use crate::time::{FrameClock, FrameTime};

/// Window messages as seen by the frame loop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Message {
    Paint,
    /// New client size in physical pixels.
    Resized { width: u32, height: u32 },
    /// The window is being destroyed; posts `Quit(0)`.
    Destroy,
    /// Terminates the loop with the payload as exit code.
    Quit(i32),
    Other,
}

/// Where the loop is in its current iteration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// No iteration has run yet.
    Idle,
    ProcessingMessages,
    Ticking,
    /// Terminal.
    Quit(i32),
}

/// Outcome of one loop iteration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Step {
    /// A pending message was dispatched; no tick this iteration.
    Dispatched(Message),
    /// No message was pending: run update then render with this frame time.
    Tick(FrameTime),
    /// The loop has terminated.
    Quit(i32),
}

/// Single-threaded, non-blocking message/tick loop.
///
/// Each iteration dispatches one pending message if there is one, otherwise
/// produces a tick with a clamped delta time. A `Quit` message ends the loop
/// and no further ticks are produced.
#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    pending: VecDeque<Message>,
    clock: FrameClock,
}

impl FrameLoop {
    pub fn new(clock: FrameClock) -> Self {
        Self {
            state: LoopState::Idle,
            pending: VecDeque::new(),
            clock,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.state {
            LoopState::Quit(code) => Some(code),
            _ => None,
        }
    }

    pub fn is_quit(&self) -> bool {
        self.exit_code().is_some()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Queues a message for the next iteration.
    pub fn post(&mut self, message: Message) {
        self.pending.push_back(message);
    }

    /// Posts `Quit(code)`.
    pub fn post_quit(&mut self, code: i32) {
        self.post(Message::Quit(code));
    }

    /// Dispatches the next pending message, if any.
    pub fn next_message(&mut self) -> Option<Message> {
        if self.is_quit() {
            return None;
        }

        let message = self.pending.pop_front()?;
        self.state = LoopState::ProcessingMessages;
        match message {
            Message::Destroy => self.post_quit(0),
            Message::Quit(code) => {
                log::debug!("quit received (exit code {code})");
                self.state = LoopState::Quit(code);
            }
            _ => {}
        }
        Some(message)
    }

    /// Produces a tick against the wall clock, unless the loop has quit.
    pub fn tick(&mut self) -> Option<FrameTime> {
        self.enter_tick().then(|| self.clock.tick())
    }

    /// Produces a tick at `now`, unless the loop has quit.
    pub fn tick_at(&mut self, now: Instant) -> Option<FrameTime> {
        self.enter_tick().then(|| self.clock.advance(now))
    }

    fn enter_tick(&mut self) -> bool {
        if self.is_quit() {
            return false;
        }
        self.state = LoopState::Ticking;
        true
    }

    /// Runs one iteration at `now`.
    pub fn step_at(&mut self, now: Instant) -> Step {
        if let Some(code) = self.exit_code() {
            return Step::Quit(code);
        }
        if let Some(message) = self.next_message() {
            return Step::Dispatched(message);
        }
        match self.tick_at(now) {
            Some(time) => Step::Tick(time),
            None => Step::Quit(self.exit_code().unwrap_or_default()),
        }
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(FrameClock::new())
    }
}
