use crate::monitoring::health::EngineStatus;
use std::sync::atomic::{AtomicBool, Ordering};

/// A subsystem that runs beside the core and only reports whether it is
/// running. The signal optimizer and the traffic simulator are both of
/// this kind for now.
#[derive(Debug)]
pub struct SubsystemEngine {
    name: &'static str,
    running: AtomicBool,
}

impl SubsystemEngine {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            running: AtomicBool::new(false),
        }
    }

    pub const fn signal_optimizer() -> Self {
        Self::new("signal_optimizer")
    }

    pub const fn traffic_simulator() -> Self {
        Self::new("traffic_simulator")
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::Release);
        log::info!("{} started", self.name);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        log::info!("{} stopped", self.name);
    }
}

impl EngineStatus for SubsystemEngine {
    fn name(&self) -> &str {
        self.name
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_stop_toggle_flag() {
        let engine = SubsystemEngine::signal_optimizer();
        assert!(!engine.is_running());
        engine.start();
        assert!(engine.is_running());
        engine.stop();
        assert!(!engine.is_running());
        assert_eq!(engine.name(), "signal_optimizer");
    }
}
