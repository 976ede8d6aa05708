#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod cache;
pub mod combine;
pub mod config;
pub mod error;
pub mod minify;
pub mod models;
pub mod rewrite;
pub mod scan;

pub use config::MinifierConfig;
pub use error::ProcessError;
pub use minify::{AssetMinifier, DefaultMinifier, MinifyFailure};
pub use models::{AssetKind, AssetReference, Bundle, ResolvedAsset};
pub use rewrite::PageProcessor;
