pub mod intake_flow;
pub mod review_flow;

pub use intake_flow::{IntakeFlow, IntakeOutcome};
pub use review_flow::{ReviewFlow, ReviewInput, SaveDisposition};
