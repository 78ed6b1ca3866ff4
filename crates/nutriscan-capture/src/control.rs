use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};

/// A user command issued while a live session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Stop the session without a result.
    Quit,
    /// Analyze the most recently detected barcode now, ignoring the debounce
    /// window.
    ForceAnalyze,
    /// Drop the current result and forget the last detection.
    Clear,
    /// Save the current result to a timestamped file.
    Save,
}

impl Control {
    /// Maps a keypress to a command: `q` quits, space forces analysis, `c`
    /// clears and `s` saves.
    #[must_use]
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'q' => Some(Self::Quit),
            ' ' => Some(Self::ForceAnalyze),
            'c' => Some(Self::Clear),
            's' => Some(Self::Save),
            _ => None,
        }
    }
}

/// Non-blocking source of [`Control`] commands, polled once per frame.
pub trait ControlInput: Send {
    fn poll(&mut self) -> Option<Control>;
}

/// No interactive input. Auto-stop sessions run until a result or timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControls;

impl ControlInput for NoControls {
    fn poll(&mut self) -> Option<Control> {
        None
    }
}

/// Commands delivered over a channel, typically from a task reading a
/// terminal or a window's key events.
///
/// A closed channel reads as [`Control::Quit`] so a session cannot outlive
/// its input.
#[derive(Debug)]
pub struct ChannelControls {
    rx: UnboundedReceiver<Control>,
    closed: bool,
}

impl ChannelControls {
    #[must_use]
    pub fn new(rx: UnboundedReceiver<Control>) -> Self {
        Self { rx, closed: false }
    }
}

impl ControlInput for ChannelControls {
    fn poll(&mut self) -> Option<Control> {
        if self.closed {
            return None;
        }
        match self.rx.try_recv() {
            Ok(control) => Some(control),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                Some(Control::Quit)
            }
        }
    }
}
