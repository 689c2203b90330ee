//! CLI surface for TIV
//!
//! This crate carries the manual entry adapter (clap arguments to a vehicle
//! descriptor) and the terminal rendering: banner, live stage progress fed
//! by orchestrator events, and the final advice report.

mod args;
mod ui;

pub use args::VehicleArgs;
pub use ui::{display_banner, print_report, render_progress};
