//! Document stages that run before any model call.
//!
//! ```text
//! RawDocument ──▶ input ──▶ (pdf) ──▶ fields
//! (bytes+kind)   (decode)  (pdfium)  (FieldSet)
//! ```
//!
//! 1. [`input`]: validate the declared kind and decode plain text
//! 2. [`pdf`]: concatenate page text; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`fields`]: forgiving `Key: value` parser producing the nine known fields

pub mod fields;
pub mod input;
pub mod pdf;
