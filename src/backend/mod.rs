//! Backend abstraction layer
//!
//! Provides common traits and types that both the wgpu and the dummy backends implement.

pub mod dummy;
pub mod release;
pub mod traits;
pub mod types;
pub mod wgpu_backend;

pub use dummy::{DummyBackend, RecordedCommand};
pub use release::{ReleaseQueue, ReleasedResource};
pub use traits::*;
pub use types::*;
