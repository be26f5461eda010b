//! The displayable value produced by a completed load.

use std::sync::Arc;

use bytes::Bytes;

/// A loaded, displayable piece of media.
///
/// Cheap to clone: raster payloads are reference-counted [`Bytes`], vector
/// markup is a shared string. How the value is attached to the page is the
/// embedder's concern; mosaic only produces it.
#[derive(Clone, Debug, PartialEq)]
pub enum Media {
    /// Encoded raster image bytes, as served.
    Raster {
        bytes: Bytes,
        /// Content type reported by the transport, if any.
        content_type: Option<String>,
        /// Alternate text for the rendered element.
        alt: Option<String>,
    },
    /// Inline vector markup (SVG), ready to be embedded as a fragment.
    Vector {
        markup: Arc<str>,
        /// Alternate text for the rendered element.
        alt: Option<String>,
    },
}

impl Media {
    /// Alternate text attached to this media, if any.
    #[must_use]
    pub fn alt(&self) -> Option<&str> {
        match self {
            Self::Raster { alt, .. } | Self::Vector { alt, .. } => alt.as_deref(),
        }
    }

    /// Byte length of the payload (markup length for vector media).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Raster { bytes, .. } => bytes.len(),
            Self::Vector { markup, .. } => markup.len(),
        }
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_raster_payload() {
        let media = Media::Raster {
            bytes: Bytes::from_static(b"\x89PNG"),
            content_type: Some("image/png".into()),
            alt: Some("logo".into()),
        };
        let copy = media.clone();
        assert_eq!(media, copy);
        assert_eq!(copy.alt(), Some("logo"));
        assert_eq!(copy.len(), 4);
    }

    #[test]
    fn vector_markup_alt() {
        let media = Media::Vector {
            markup: Arc::from("<svg/>"),
            alt: None,
        };
        assert_eq!(media.alt(), None);
        assert!(!media.is_empty());
    }
}
