//! Tracing initialization shared by binaries, benches and test harnesses.

mod tracing_setup;

pub use tracing_setup::{init, init_for_tests};
