//! Reference neuron models
//!
//! Small models with analytically known answers, used to exercise tests
//! end to end and as a template for wrapping real simulators.

mod passive;

pub use passive::{PassiveSoma, PassiveSomaBuilder};
