//! # soma-validation: Data-Driven Validation of Neuron Models
//!
//! Scores the somatic electrophysiology of simulated neurons against
//! experimental statistics.
//!
//! A model declares what it can do through capability traits (record the
//! somatic membrane potential, receive a step current). A validation test
//! drives the model through those capabilities, reduces the trace to one
//! number and scores it against an observed `{mean, std}` with a Z-score,
//! writing JSON data and a plot for every run.
//!
//! ## Tests
//!
//! - [`validation::RestingPotential`]: mean Vm over 50 ms without stimulus
//! - [`validation::InputResistance`]: ohmic input resistance from a
//!   -5 nA, 50 ms step
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use soma_validation::models::PassiveSoma;
//! use soma_validation::observation::Observation;
//! use soma_validation::output::OutputConfig;
//! use soma_validation::validation::{InputResistance, RestingPotential, TestSuite};
//! use soma_validation::capability::Model;
//!
//! # fn main() -> soma_validation::Result<()> {
//! let mut models: Vec<Box<dyn Model>> = vec![Box::new(PassiveSoma::builder("passive").build()?)];
//!
//! let mut suite = TestSuite::new("soma")
//!     .with_test(RestingPotential::new(Observation::new(-65.0, 5.0)))
//!     .with_test(InputResistance::new(Observation::new(100.0, 20.0)));
//!
//! let report = suite.judge(&mut models, &OutputConfig::default());
//! for run in report.completed() {
//!     println!("{} / {}: {:?}", run.test_name(), run.model_name(), run.score());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod capability;
pub mod error;
pub mod features;
pub mod models;
pub mod observation;
pub mod output;
pub mod plot;
pub mod score;
pub mod trace;
pub mod validation;

pub use error::{Error, Result};
