//! Transport layer for the style conversion backend.
//!
//! Four remote operations (list styles, upload, convert, delete) sit behind
//! the [`Backend`] trait; [`StyleClient`] implements it over HTTP.

mod backend;
mod client;
mod error;

pub use backend::{Backend, ConvertedMedia, DeleteAck, UploadResponse};
pub use client::{
    StyleClient, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_CONVERT_TIMEOUT,
    STYLE_API_URL_ENV,
};
pub use error::{
    ApiError, ConversionError, DELETE_FAILED_MESSAGE, PROCESSING_TIMEOUT_MESSAGE,
    UPLOAD_FAILED_MESSAGE,
};
