//! Decoder trait for type-safe conversions.
//!
//! The `Decoder` trait enables converting from a source type `T` to a
//! destination type `D`. It is used throughout fuda to move between the
//! textual form of a document and its in-memory representations.
//!
//! # Design Pattern
//!
//! The decoder uses a two-trait pattern:
//!
//! 1. `Decoder<T, D>` - Performs the actual conversion
//! 2. `DecodableFrom<T>` - Marker trait constraining valid conversions
//!
//! A conversion is only expressible when the destination type declares
//! itself decodable from the source type, so an invalid chain (say, bytes
//! straight to a typed record without going through the document tree)
//! fails to compile instead of failing at run time.
//!
//! # Implementation Guide
//!
//! To add a new decodable type, implement both traits:
//!
//! ```no_run
//! use fuda::decoder::{Decoder, DecodableFrom};
//!
//! struct Source(Vec<u8>);
//! struct Dest(String);
//!
//! #[derive(Debug)]
//! struct MyError;
//!
//! // 1. Mark the destination type as decodable from the source type
//! impl DecodableFrom<Source> for Dest {}
//!
//! // 2. Implement the decoder on the source type
//! impl Decoder<Source, Dest> for Source {
//!     type Error = MyError;
//!
//!     fn decode(&self) -> Result<Dest, Self::Error> {
//!         Ok(Dest(String::from_utf8_lossy(&self.0).to_string()))
//!     }
//! }
//! ```

/// Decoder trait for converting from type `T` to type `D`.
///
/// Implemented by the source type `T` to enable conversion to the
/// destination type `D`. The destination type must implement
/// `DecodableFrom<T>`.
///
/// # Type Parameters
///
/// * `T` - The source type (usually `Self`)
/// * `D` - The destination type that can be decoded from `T`
///
/// # Examples
///
/// The `text` crate implements decoding from strings to document trees:
///
/// ```ignore
/// use fuda::decoder::Decoder;
/// use text::Document;
///
/// let doc: Document = "[3, 6]".decode().unwrap();
/// ```
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails. The specific error
    /// conditions depend on the implementing type.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
///
/// This trait has no methods and serves only as a compile-time guard:
/// without an explicit `DecodableFrom` impl for a type pair, no `Decoder`
/// for that pair can be written or called.
///
/// ```no_run
/// use fuda::decoder::DecodableFrom;
///
/// struct MySource;
/// struct MyDest;
///
/// // Allow MyDest to be decoded from MySource
/// impl DecodableFrom<MySource> for MyDest {}
/// ```
pub trait DecodableFrom<T> {}
