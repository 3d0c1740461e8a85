//! Certforge - certificate image renderer
//!
//! Renders hackathon certificates as PNG images: the participant name is drawn
//! onto a template image using styles and templates resolved from layered
//! configuration. This library exposes modules for integration testing.

pub mod api;
pub mod assets;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
