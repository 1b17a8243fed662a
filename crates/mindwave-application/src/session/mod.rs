//! Session orchestration: the use case facade and the 1 Hz phase driver.

pub mod driver;
pub mod usecase;

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use mindwave_core::clock::Clock;
use mindwave_core::durable::StateRepository;
use mindwave_core::gateway::PersistenceGateway;
use mindwave_core::output::{AudioOutput, HapticOutput};
use mindwave_core::session::{SessionEvent, SessionStore};

/// Shared wiring for the session use case and its driver task.
///
/// All session-state mutations go through the single `store` mutex, which
/// serializes the 1 Hz driver tick against UI-triggered actions.
pub(crate) struct SessionContext {
    pub store: Mutex<SessionStore>,
    pub events: broadcast::Sender<SessionEvent>,
    pub audio: Arc<dyn AudioOutput>,
    pub haptics: Arc<dyn HapticOutput>,
    pub state_repository: Arc<dyn StateRepository>,
    pub gateway: Option<Arc<dyn PersistenceGateway>>,
    pub clock: Arc<dyn Clock>,
}

impl SessionContext {
    pub(crate) fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine; the session runs headless in tests.
        let _ = self.events.send(event);
    }
}
