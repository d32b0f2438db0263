pub mod routes;
pub mod startup;
pub mod errors;
pub mod extract;

pub use startup::{build_app, run, run_with_config};
