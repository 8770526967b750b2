//! Test helpers shared across parley crates.

pub mod interceptor;
pub mod memory;
pub mod model;

pub use interceptor::{RecordingInterceptor, RecordingLogSink};
pub use memory::FailingRepository;
pub use model::{FailingModel, FixedModel, RecordingModel, StreamingModel};
