//! Shared test utilities for glab.

pub mod fixtures;
pub mod logging;
pub mod mock_backend;

pub use fixtures::StoreFixture;
pub use logging::TestLogger;
pub use mock_backend::MockBackend;
