//! Revision-tracked contact document store contracts and reference backends.

pub mod document;
pub mod memory;
pub mod service;
