//! Single-compartment passive soma.

use crate::capability::{
    CurrentInjection, Model, SomaProducesMembranePotential, SomaReceivesStepCurrent,
};
use crate::trace::Trace;
use crate::{Error, Result};

/// Leaky RC soma integrated with forward Euler.
///
/// ```text
/// tau_m * dV/dt = -(V - E_leak) + R_m * I(t)
/// ```
///
/// With mV, MOhm and nA the steady-state deflection of a step is
/// `R_m * I`, so the resting potential is `E_leak` and the input
/// resistance is `R_m`. Each recording starts from rest, and an injected
/// pulse applies to the next recording only.
#[derive(Debug, Clone, PartialEq)]
pub struct PassiveSoma {
    name: String,
    e_leak: f64,
    r_m: f64,
    tau_m: f64,
    dt: f64,
    stimulus: Option<CurrentInjection>,
}

impl PassiveSoma {
    /// Create a builder with default parameters.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> PassiveSomaBuilder {
        PassiveSomaBuilder::new(name)
    }

    /// Leak reversal potential in mV.
    #[must_use]
    pub const fn e_leak(&self) -> f64 {
        self.e_leak
    }

    /// Membrane resistance in MOhm.
    #[must_use]
    pub const fn r_m(&self) -> f64 {
        self.r_m
    }

    /// Pulse pending for the next recording.
    #[must_use]
    pub const fn stimulus(&self) -> Option<&CurrentInjection> {
        self.stimulus.as_ref()
    }

    /// Drop the pending pulse.
    pub fn clear_stimulus(&mut self) {
        self.stimulus = None;
    }
}

impl SomaProducesMembranePotential for PassiveSoma {
    fn get_soma_membrane_potential(&mut self, stop_time_ms: f64) -> Result<Trace> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (stop_time_ms / self.dt).ceil().max(0.0) as usize;
        let mut time = Vec::with_capacity(steps + 1);
        let mut voltage = Vec::with_capacity(steps + 1);

        let stimulus = self.stimulus.take();
        let mut v = self.e_leak;
        for i in 0..=steps {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 * self.dt;
            time.push(t);
            voltage.push(v);
            let current = stimulus.map_or(0.0, |pulse| pulse.current_at(t));
            let dv = (self.r_m.mul_add(current, self.e_leak - v)) / self.tau_m;
            v = dv.mul_add(self.dt, v);
        }
        Trace::new(time, voltage)
    }
}

impl SomaReceivesStepCurrent for PassiveSoma {
    fn inject_soma_square_current(&mut self, current: CurrentInjection) -> Result<()> {
        self.stimulus = Some(current);
        Ok(())
    }
}

impl Model for PassiveSoma {
    fn name(&self) -> &str {
        &self.name
    }

    fn membrane_potential(&mut self) -> Option<&mut dyn SomaProducesMembranePotential> {
        Some(self)
    }

    fn step_current(&mut self) -> Option<&mut dyn SomaReceivesStepCurrent> {
        Some(self)
    }
}

/// Builder for `PassiveSoma`.
#[derive(Debug)]
pub struct PassiveSomaBuilder {
    name: String,
    e_leak: f64,
    r_m: f64,
    tau_m: f64,
    dt: f64,
}

impl PassiveSomaBuilder {
    /// Create a builder: E_leak -65 mV, R_m 100 MOhm, tau_m 10 ms, dt 0.025 ms.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            e_leak: -65.0,
            r_m: 100.0,
            tau_m: 10.0,
            dt: 0.025,
        }
    }

    /// Set the leak reversal potential (mV).
    #[must_use]
    pub const fn e_leak(mut self, e_leak: f64) -> Self {
        self.e_leak = e_leak;
        self
    }

    /// Set the membrane resistance (MOhm).
    #[must_use]
    pub const fn r_m(mut self, r_m: f64) -> Self {
        self.r_m = r_m;
        self
    }

    /// Set the membrane time constant (ms).
    #[must_use]
    pub const fn tau_m(mut self, tau_m: f64) -> Self {
        self.tau_m = tau_m;
        self
    }

    /// Set the integration step (ms).
    #[must_use]
    pub const fn dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Build the `PassiveSoma`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Other` unless `tau_m` and `dt` are positive and
    /// `dt < tau_m` (forward Euler is unstable otherwise).
    pub fn build(self) -> Result<PassiveSoma> {
        if !(self.tau_m > 0.0 && self.dt > 0.0 && self.dt < self.tau_m) {
            return Err(Error::Other(format!(
                "passive soma needs 0 < dt < tau_m (dt = {}, tau_m = {})",
                self.dt, self.tau_m
            )));
        }
        Ok(PassiveSoma {
            name: self.name,
            e_leak: self.e_leak,
            r_m: self.r_m,
            tau_m: self.tau_m,
            dt: self.dt,
            stimulus: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rests_at_leak_reversal() {
        let mut soma = PassiveSoma::builder("cell").build().unwrap();
        let trace = soma.get_soma_membrane_potential(50.0).unwrap();
        assert!(trace.voltage().iter().all(|&v| (v + 65.0).abs() < 1e-9));
        assert!(*trace.time().last().unwrap() >= 50.0);
    }

    #[test]
    fn test_step_reaches_ohmic_steady_state() {
        let mut soma = PassiveSoma::builder("cell").tau_m(2.0).build().unwrap();
        soma.inject_soma_square_current(CurrentInjection::new(20.0, 50.0, -0.1))
            .unwrap();
        let trace = soma.get_soma_membrane_potential(100.0).unwrap();
        let at_69 = trace
            .time()
            .iter()
            .position(|&t| t >= 69.0)
            .map(|i| trace.voltage()[i])
            .unwrap();
        assert!((at_69 - (-75.0)).abs() < 1e-6);
    }

    #[test]
    fn test_pulse_applies_to_next_recording_only() {
        let mut soma = PassiveSoma::builder("cell").build().unwrap();
        soma.inject_soma_square_current(CurrentInjection::new(20.0, 50.0, -5.0))
            .unwrap();
        let stepped = soma.get_soma_membrane_potential(100.0).unwrap();
        assert!(stepped.voltage().iter().any(|&v| v < -100.0));
        assert!(soma.stimulus().is_none());

        let rest = soma.get_soma_membrane_potential(50.0).unwrap();
        assert!((rest.mean_voltage().unwrap() + 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_stimulus() {
        let mut soma = PassiveSoma::builder("cell").build().unwrap();
        soma.inject_soma_square_current(CurrentInjection::new(1.0, 1.0, 1.0))
            .unwrap();
        assert!(soma.stimulus().is_some());
        soma.clear_stimulus();
        assert!(soma.stimulus().is_none());
    }

    #[test]
    fn test_rejects_unstable_step() {
        assert!(PassiveSoma::builder("cell").dt(20.0).build().is_err());
        assert!(PassiveSoma::builder("cell").tau_m(0.0).build().is_err());
    }
}
