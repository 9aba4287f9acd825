//! Core types for the ROM-patch archive: config tables, metadata front
//! matter, and the canonical filename rules.
//!
//! Everything here is pure apart from the small loaders; directory walking
//! and renaming live in `rompatch-lib`.

pub mod config;
pub mod decision;
pub mod error;
pub mod metadata;
pub mod standardize;

pub use config::{BadgeColors, BaseRomRecord, ConfigTables, CrcVariant, SystemRecord};
pub use decision::{RenameDecision, resolve_decision, standardize_from_metadata};
pub use error::{ConfigError, MetadataError};
pub use metadata::{PatchMetadata, load_metadata, parse_metadata, rewrite_file_field};
pub use standardize::{extract_year, generate_filename, normalize_title, parse_version};
