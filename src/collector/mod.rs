//! The sample collection loop and its pause scheduler (§4.3).

mod loop_;
mod pause;

pub use loop_::{collect, BenchFn, NullHooks, RuntimeHooks};
pub use pause::should_pause;
