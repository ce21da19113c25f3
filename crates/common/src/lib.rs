//! Common utilities and shared types for aerodict.
//!
//! This crate provides foundational components used across all aerodict crates:
//!
//! - **Configuration**: Process settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Storage**: Media storage backends (local filesystem, in-memory)
//! - **Text**: Slugs, markup stripping and URL normalization
//! - **Video**: Recognition of video-sharing links
//!
//! # Example
//!
//! ```no_run
//! use aerodict_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;
pub mod text;
pub mod video;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{LocalStorage, MemoryStorage, StorageBackend, StorageService, UploadedFile};
pub use text::{normalize_url, slugify, split_entries, strip_tags};
pub use video::{extract_video_id, validate_video_url};
