//! Comparison charts from network-simulator output.
//!
//! ```text
//!   plan (Config) ──► ChartJob ──resolve(metric)──► ResolvedChart
//!                                                       │
//!        load_table ──► with_tag ──► Table::concat ◄────┘
//!                                        │
//!                                FilterPredicate::apply
//!                                        │
//!                                   build_plot ──► Renderer ──► .png / .svg
//! ```

pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod runner;
