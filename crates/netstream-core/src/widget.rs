//! Player widget boundary
//!
//! The external player library is reached only through these two traits. The
//! browser build implements them over the script-injected `jwplayer` global;
//! tests implement them with recording fakes.

use crate::error::Result;
use crate::types::ContainerId;
use serde_json::Value;

/// Lifecycle events the adapter listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEventKind {
    Ready,
    Error,
    Play,
    Pause,
}

impl PlayerEventKind {
    pub const ALL: [PlayerEventKind; 4] = [
        PlayerEventKind::Ready,
        PlayerEventKind::Error,
        PlayerEventKind::Play,
        PlayerEventKind::Pause,
    ];

    /// Event name in the widget's vocabulary
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerEventKind::Ready => "ready",
            PlayerEventKind::Error => "error",
            PlayerEventKind::Play => "play",
            PlayerEventKind::Pause => "pause",
        }
    }
}

/// Listener registered with a widget; receives the raw event payload
pub type EventHandler = Box<dyn FnMut(Value)>;

/// Opaque error payload raised by the widget
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackFault(pub Value);

impl PlaybackFault {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// The payload's `message` field, when it has one
    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }
}

/// A mounted instance of the external player
pub trait PlayerWidget {
    /// Initial configuration; called once per instance
    fn setup(&mut self, config: &Value) -> Result<()>;

    /// Replace the playlist on a set-up instance
    fn load(&mut self, playlist: &[Value]) -> Result<()>;

    /// Register a lifecycle listener
    fn on(&mut self, event: PlayerEventKind, handler: EventHandler) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn set_mute(&mut self, muted: bool) -> Result<()>;

    /// Tear the instance down and release its DOM
    fn remove(&mut self) -> Result<()>;
}

/// Constructor for widget instances, available once the library has loaded
pub trait PlayerFactory {
    fn create(&self, container: &ContainerId) -> Result<Box<dyn PlayerWidget>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_names() {
        let names: Vec<_> = PlayerEventKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, ["ready", "error", "play", "pause"]);
    }

    #[test]
    fn test_fault_message() {
        let fault = PlaybackFault::new(json!({ "code": 232011, "message": "Cannot load M3U8" }));
        assert_eq!(fault.message(), Some("Cannot load M3U8"));
        assert_eq!(PlaybackFault::new(json!("boom")).message(), None);
    }
}
