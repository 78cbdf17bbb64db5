//! Business logic layer.
//!
//! The inference provider seam, its Together AI implementation, and the
//! static model catalog.

pub mod catalog;
pub mod provider;
pub mod sse;
pub mod together;
pub mod wire;

pub use catalog::{ModelCatalog, ModelDescriptor};
pub use provider::{ChatParams, FragmentStream, ImageParams, InferenceProvider};
pub use together::TogetherClient;
