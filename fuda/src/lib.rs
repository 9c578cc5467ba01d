//! # fuda
//!
//! Core traits for encoding and decoding in the fuda document toolkit.
//!
//! This crate defines the fundamental `Decoder` and `Encoder` traits that
//! establish a type-safe conversion pattern used throughout fuda.
//!
//! ## Overview
//!
//! The conversion pattern flows like this:
//! ```text
//! text → Document → resolved Value → typed value
//! ```
//!
//! Each step uses the `Decoder` trait to convert from one representation to
//! the next, and the `Encoder` trait to convert in the reverse direction.
//!
//! ## Type Safety
//!
//! The traits use marker traits (`DecodableFrom` and `EncodableTo`) so that
//! only conversions that a crate has explicitly declared are expressible.
//!
//! ## Example
//!
//! Specific implementations are provided by the `text` and `bind` crates:
//!
//! ```ignore
//! use fuda::decoder::Decoder;
//! use text::Document;
//!
//! // Decode raw text to a document tree
//! let doc: Document = "ac: 16".decode().unwrap();
//! ```
//!
//! Encoding works in the reverse direction:
//!
//! ```ignore
//! use fuda::encoder::Encoder;
//! use text::Document;
//!
//! let doc = Document::new(node);
//! let rendered: String = doc.encode().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
