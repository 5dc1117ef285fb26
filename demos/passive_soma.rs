//! Passive Soma Validation Example
//!
//! Runs both somatic tests against two passive cells and prints the scores.
//! Artifacts land in ./validation_results/<test>/<model>/.
//!
//! Run with: RUST_LOG=info cargo run --example passive_soma

use soma_validation::capability::Model;
use soma_validation::models::PassiveSoma;
use soma_validation::observation::Observation;
use soma_validation::output::OutputConfig;
use soma_validation::validation::{InputResistance, RestingPotential, SuiteOutcome, TestSuite};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Somatic Validation: Passive Cells ===\n");

    let mut models: Vec<Box<dyn Model>> = vec![
        Box::new(PassiveSoma::builder("passive_default").build()?),
        Box::new(
            PassiveSoma::builder("passive_leaky")
                .e_leak(-70.0)
                .r_m(60.0)
                .tau_m(6.0)
                .build()?,
        ),
    ];

    let mut suite = TestSuite::new("somatic")
        .with_test(RestingPotential::new(Observation::new(-68.0, 3.0)))
        .with_test(InputResistance::new(Observation::new(90.0, 15.0)));

    let output = OutputConfig::default();
    let report = suite.judge(&mut models, &output);

    for entry in report.entries() {
        match entry.outcome() {
            SuiteOutcome::Completed(run) => {
                let prediction = run.prediction().map_or(f64::NAN, |p| p.value());
                let score = run.score().map(ToString::to_string).unwrap_or_default();
                println!(
                    "{:<34} {:<16} prediction {:>9.3}  {}",
                    entry.test_name(),
                    entry.model_name(),
                    prediction,
                    score
                );
                for artifact in run.artifacts() {
                    println!("    {}", artifact.path().display());
                }
            }
            SuiteOutcome::Skipped(missing) => {
                println!("{:<34} {:<16} skipped, missing {missing:?}", entry.test_name(), entry.model_name());
            }
            SuiteOutcome::Failed { error, .. } => {
                println!("{:<34} {:<16} failed: {error}", entry.test_name(), entry.model_name());
            }
        }
    }

    println!("\nResults written under {}", output.root().display());
    Ok(())
}
