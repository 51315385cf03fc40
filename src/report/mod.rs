//! Report generation.

pub mod generator;

pub use generator::{
    generate_json_report, render_text_outputs, write_report, DEFAULT_TITLE, JSON_FILE_NAME,
};
