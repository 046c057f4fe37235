//! Optional user-facing log sink.
//!
//! Scripts emit progress messages on named channels. A caller can attach
//! callbacks to one channel or to all of them; nothing is emitted when no
//! callback is attached.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

/// Callback invoked with each emitted message.
pub type LogCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// A log channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogChannel {
    /// Gate decisions.
    Debug,
    /// Queued statements and raw query results.
    Trace,
}

impl LogChannel {
    /// Every channel, in subscription order.
    pub const ALL: [LogChannel; 2] = [LogChannel::Debug, LogChannel::Trace];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogChannel::Debug => "debug",
            LogChannel::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a callback subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Channel(LogChannel),
    /// Expanded to every channel when the callback is attached.
    All,
}

impl LogTarget {
    /// The channels this target covers.
    pub fn channels(&self) -> &[LogChannel] {
        match self {
            LogTarget::Channel(channel) => std::slice::from_ref(channel),
            LogTarget::All => &LogChannel::ALL,
        }
    }
}

impl From<LogChannel> for LogTarget {
    fn from(channel: LogChannel) -> Self {
        LogTarget::Channel(channel)
    }
}

impl std::fmt::Display for LogTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogTarget::Channel(channel) => channel.fmt(f),
            LogTarget::All => f.write_str("all"),
        }
    }
}

/// Error for parsing LogTarget from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLogTargetError(pub String);

impl std::fmt::Display for ParseLogTargetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid log channel: {}", self.0)
    }
}

impl std::error::Error for ParseLogTargetError {}

impl FromStr for LogTarget {
    type Err = ParseLogTargetError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogTarget::Channel(LogChannel::Debug)),
            "trace" => Ok(LogTarget::Channel(LogChannel::Trace)),
            "all" => Ok(LogTarget::All),
            _ => Err(ParseLogTargetError(s.to_string())),
        }
    }
}

/// Fans messages out to the callbacks subscribed per channel.
#[derive(Default)]
pub struct LogEmitter {
    listeners: HashMap<LogChannel, Vec<LogCallback>>,
}

impl LogEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `callback` to every channel covered by `target`.
    pub fn subscribe(&mut self, target: LogTarget, callback: LogCallback) {
        for channel in target.channels() {
            self.listeners
                .entry(*channel)
                .or_default()
                .push(Arc::clone(&callback));
        }
    }

    /// Deliver `message` to the callbacks on `channel`. A panicking callback
    /// is contained and reported through `tracing`.
    pub fn emit(&self, channel: LogChannel, message: &str) {
        let Some(callbacks) = self.listeners.get(&channel) else {
            return;
        };
        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(message))).is_err() {
                tracing::warn!(channel = %channel, "log callback panicked");
            }
        }
    }

    pub fn listener_count(&self, channel: LogChannel) -> usize {
        self.listeners.get(&channel).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for LogEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogEmitter")
            .field("debug", &self.listener_count(LogChannel::Debug))
            .field("trace", &self.listener_count(LogChannel::Trace))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, LogCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (
            count,
            Arc::new(move |_: &str| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn test_channel_subscription() {
        let (count, cb) = counter();
        let mut emitter = LogEmitter::new();
        emitter.subscribe(LogChannel::Debug.into(), cb);

        emitter.emit(LogChannel::Debug, "DEBUUUUG!!");
        emitter.emit(LogChannel::Debug, "How are you doing?");
        emitter.emit(LogChannel::Trace, "not delivered");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_all_fans_out_at_subscribe_time() {
        let (count, cb) = counter();
        let mut emitter = LogEmitter::new();
        emitter.subscribe(LogTarget::All, cb);

        assert_eq!(emitter.listener_count(LogChannel::Debug), 1);
        assert_eq!(emitter.listener_count(LogChannel::Trace), 1);

        emitter.emit(LogChannel::Debug, "a");
        emitter.emit(LogChannel::Trace, "b");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_emit_without_listeners() {
        let emitter = LogEmitter::new();
        emitter.emit(LogChannel::Trace, "nobody listens");
        assert_eq!(emitter.listener_count(LogChannel::Trace), 0);
    }

    #[test]
    fn test_panicking_callback_is_contained() {
        let (count, cb) = counter();
        let mut emitter = LogEmitter::new();
        emitter.subscribe(LogTarget::All, Arc::new(|_: &str| panic!("sink failure")));
        emitter.subscribe(LogTarget::All, cb);

        emitter.emit(LogChannel::Debug, "still delivered");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_target_parsing() {
        assert_eq!(
            "debug".parse::<LogTarget>(),
            Ok(LogTarget::Channel(LogChannel::Debug))
        );
        assert_eq!(
            "TRACE".parse::<LogTarget>(),
            Ok(LogTarget::Channel(LogChannel::Trace))
        );
        assert_eq!("all".parse::<LogTarget>(), Ok(LogTarget::All));
        assert!("info".parse::<LogTarget>().is_err());
        assert_eq!(LogTarget::All.to_string(), "all");
    }
}
