// All checking lives in thesisfmt-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod batch;
pub mod output;

// Re-export core types for convenience
pub use thesisfmt_core::*;

// Re-export CLI utilities
pub use batch::check_inputs;
pub use output::{output_path_for, render, render_text, OutputError, OutputFormat};
