//! Answer provider modules.
//!
//! This module provides the provider abstraction, the DashScope client and
//! the sequential answer collector.

pub mod collector;
pub mod provider;
pub mod qwen;

pub use collector::collect_answers;
pub use provider::{AnswerProvider, OfflineProvider};
pub use qwen::{QwenConfig, QwenProvider};
