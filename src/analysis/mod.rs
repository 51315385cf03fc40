//! Analysis modules.
//!
//! Manual statistics over the dataset and the catalog of questions asked
//! of the answer provider.

pub mod aggregator;
pub mod questions;

pub use aggregator::*;
pub use questions::default_sections;
