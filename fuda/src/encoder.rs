//! Encoder trait for the reverse direction of the conversion chain.
//!
//! Mirrors the `Decoder`/`DecodableFrom` pair: a type implements
//! `Encoder<T, E>` to convert itself into `E`, and `E` must declare
//! `EncodableTo<T>` for the conversion to be expressible.

/// Encoder trait for converting from type `T` to type `E`.
///
/// The `text` crate implements encoding from document trees back to
/// strings:
///
/// ```ignore
/// use fuda::encoder::Encoder;
/// use text::Document;
///
/// let doc = Document::new(node);
/// let rendered: String = doc.encode().unwrap();
/// ```
pub trait Encoder<T, E: EncodableTo<T>> {
    /// The error type returned when encoding fails.
    type Error;

    /// Encodes `self` into type `E`.
    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker trait indicating that type `E` can be encoded from type `T`.
pub trait EncodableTo<T> {}
