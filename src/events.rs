use std::sync::Mutex;

/// Observer injected into the engine and optimizer in place of a
/// process-wide logger, so the core carries no global mutable state.
pub trait EventSink: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn info(&self, message: &str) {
        log::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        log::warn!("{}", message);
    }
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn info(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}
}

/// Buffers events in memory for later inspection, mainly from tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    infos: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().expect("sink lock poisoned").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().expect("sink lock poisoned").clone()
    }
}

impl EventSink for MemorySink {
    fn info(&self, message: &str) {
        self.infos
            .lock()
            .expect("sink lock poisoned")
            .push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings
            .lock()
            .expect("sink lock poisoned")
            .push(message.to_string());
    }
}
