pub mod args;
pub mod status;

pub use args::parse_runtime_args;
pub use status::{emit_config_status, render_json, render_text};
