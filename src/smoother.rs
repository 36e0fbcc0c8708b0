use crate::config::WATTS_ALPHA;
use crate::meter_session::Reading;

/// The published view of the meter: smoothed power plus the latest voltage and frequency.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothedState {
    pub watts_ewma: f32,
    pub volts: f32,
    pub frequency_hz: f32,
    /// False until the first reading has been applied.
    pub initialized: bool,
}

/// Exponential moving average over the power samples.
///
/// Voltage and frequency are passed through untouched.
#[derive(Debug, Clone)]
pub struct Smoother {
    alpha: f32,
    state: SmoothedState,
}

impl Smoother {
    pub fn new() -> Self {
        Self {
            alpha: WATTS_ALPHA,
            state: SmoothedState::default(),
        }
    }

    /// Applies a reading and returns the resulting state.
    ///
    /// The first reading seeds the average directly so it does not ramp up from zero.
    pub fn update(&mut self, reading: &Reading) -> SmoothedState {
        self.state.watts_ewma = if self.state.initialized {
            self.state.watts_ewma * (1.0 - self.alpha) + reading.watts * self.alpha
        } else {
            reading.watts
        };
        self.state.volts = reading.volts;
        self.state.frequency_hz = reading.frequency_hz;
        self.state.initialized = true;
        self.state
    }

    pub fn state(&self) -> SmoothedState {
        self.state
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new()
    }
}
