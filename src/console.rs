//! Console output for interactive mode.

use std::sync::Arc;

use crate::meter_session::Reading;
use crate::polling_loop::ReadingSink;
use crate::shared_state::SharedStateStore;
use crate::smoother::SmoothedState;

/// Sink for interactive mode: publishes each reading, then prints the resulting state.
pub struct ConsolePrinter {
    store: Arc<SharedStateStore>,
}

impl ConsolePrinter {
    pub fn new(store: Arc<SharedStateStore>) -> Self {
        Self { store }
    }
}

impl ReadingSink for ConsolePrinter {
    fn on_reading(&self, reading: Reading) {
        let state = self.store.publish(reading);
        println!("{}", console_line(&state));
    }
}

/// One console line. Watts are truncated toward zero.
pub fn console_line(state: &SmoothedState) -> String {
    format!(
        "Watts: {} volts: {:.2} frequency: {:.4} hz",
        state.watts_ewma as i64, state.volts, state.frequency_hz
    )
}
