use crate::layout::slots::LayerSlot;

/// Convenience result type used across Plumage.
pub type PlumageResult<T> = Result<T, PlumageError>;

/// Top-level error taxonomy used by the thumbnail pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PlumageError {
    /// Required assets could not be loaded; no composite can ever be produced.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Malformed request identifier.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Selection does not match the loaded assets.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Output encoding failed.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Invalid layout or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlumageError {
    /// Build a [`PlumageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the error was caused by the request rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Failure while populating the asset store.
///
/// `Clone` so that one failed population can be reported to every waiting caller.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The asset bytes could not be read.
    #[error("read '{path}': {reason}")]
    Read {
        /// Logical asset path.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// The asset bytes could not be decoded as an image.
    #[error("decode '{path}': {reason}")]
    Decode {
        /// Logical asset path.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// A slot collection could not be enumerated.
    #[error("list collection '{collection}': {reason}")]
    List {
        /// Logical collection name.
        collection: String,
        /// Underlying cause.
        reason: String,
    },

    /// A slot collection contains no variants.
    #[error("slot '{slot}' has no variants in collection '{collection}'")]
    EmptySlot {
        /// The slot left without variants.
        slot: LayerSlot,
        /// Logical collection name.
        collection: String,
    },
}

/// Malformed request identifier.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// Identifier length differs from the number of slot positions.
    #[error("identifier has {actual} characters, expected {expected}")]
    BadLength {
        /// Required number of characters.
        expected: usize,
        /// Number of characters received.
        actual: usize,
    },

    /// Identifier contains a character outside the hex alphabet.
    #[error("identifier character {character:?} at position {position} is not a hex digit")]
    BadCharacter {
        /// Zero-based character position.
        position: usize,
        /// The offending character.
        character: char,
    },
}

/// Selection cannot be composited with the loaded assets.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// Variant index is past the end of the slot's variant list.
    #[error("variant index out of range for slot '{slot}': {index} >= {len}")]
    IndexOutOfRange {
        /// Slot being drawn.
        slot: LayerSlot,
        /// Requested variant index.
        index: usize,
        /// Number of loaded variants for the slot.
        len: usize,
    },

    /// The layout has no placement rectangle for the slot.
    #[error("no placement for slot '{slot}'")]
    MissingPlacement {
        /// Slot without placement.
        slot: LayerSlot,
    },
}

/// Output encoding failure.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    /// Quality outside `1..=100`.
    #[error("quality must be in 1..=100, got {0}")]
    Quality(u8),

    /// The codec rejected the image.
    #[error("{format} codec: {source}")]
    Codec {
        /// Output format name.
        format: &'static str,
        /// Codec error.
        #[source]
        source: image::ImageError,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
