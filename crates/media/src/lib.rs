//! Media pipeline: content-addressed store, source materialization, resource
//! resolution, MIME sniffing, image probing and video tooling.

pub mod error;
pub mod files;
pub mod image_ops;
pub mod mime;
pub mod resolver;
pub mod source;
pub mod store;
pub mod tools;
pub mod video;

pub use {
    error::{Error, Result},
    resolver::{CachedResolver, ResourceResolver},
    source::{FetchOptions, Materializer, SourceFetcher},
    store::{ContentStore, MediaResource},
    video::{FfmpegVideoTools, VideoTools},
};
