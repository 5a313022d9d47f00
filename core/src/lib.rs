//! Client core for the pets catalog and image upload service.
//!
//! # Overview
//! Lists pet records from a JSON endpoint, filters them locally, and uploads
//! a JPEG of a chosen image to a one-time, server-issued upload target as
//! multipart/form-data.
//!
//! # Design
//! - Every network step is split into `build_*` (produces an `HttpRequest`)
//!   and `parse_*` (consumes an `HttpResponse`), so a mobile host can run
//!   the I/O itself through the FFI crate.
//! - Composite operations (`fetch_all`, `upload`) run those pairs through an
//!   `HttpTransport`. `UreqTransport` is available with the default
//!   `transport` feature.
//! - `PetsClient` adds the fixed configuration and callback delivery on top.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod jpeg;
pub mod multipart;
pub mod types;
pub mod upload;

pub use catalog::{filter_pets, PetCatalogClient};
pub use client::{LocalImageStore, PetsClient, PetsDelegate};
pub use config::ClientConfig;
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
#[cfg(feature = "transport")]
pub use http::UreqTransport;
pub use jpeg::{decode_image, encode_jpeg};
pub use types::{PetRecord, UploadRequest, UploadResult, UploadTarget};
pub use upload::ImageUploadPipeline;

pub use image;
pub use image::DynamicImage;
