//! quizkit-loaders: question sources.
//!
//! Implements the `QuestionLoader` trait over in-memory quizzes and paged
//! on-disk question banks, allowing quizkit to run attempts against sources
//! too large to materialize up front.

pub mod config;
pub mod error;
pub mod memory;
pub mod mock;
pub mod paged;

pub use config::{create_loader, load_config, QuizkitConfig, SourceConfig};
pub use error::LoaderError;
pub use memory::InMemoryLoader;
pub use mock::MockLoader;
pub use paged::PagedFileLoader;
