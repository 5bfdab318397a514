//! style-converter library crate.
//!
//! Client for a style conversion server: upload an image or video, apply an
//! artistic style, blend the result with the original and compare or save it.

pub mod api;
pub mod ascii;
pub mod blend;
pub mod camera;
pub mod cli;
pub mod compare;
pub mod config;
pub mod data_url;
pub mod media;
pub mod render;
pub mod session;
pub mod styles;
pub mod workflow;
