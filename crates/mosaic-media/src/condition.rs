#![forbid(unsafe_code)]

//! Parsed viewport conditions.

use crate::{
    error::{MediaError, MediaResult},
    viewport::Viewport,
};

/// Viewport orientation, CSS semantics: portrait when height >= width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Clause {
    MinWidth(u32),
    MaxWidth(u32),
    MinHeight(u32),
    MaxHeight(u32),
    Orientation(Orientation),
}

impl Clause {
    fn holds(&self, viewport: Viewport) -> bool {
        match *self {
            Self::MinWidth(px) => viewport.width >= px,
            Self::MaxWidth(px) => viewport.width <= px,
            Self::MinHeight(px) => viewport.height >= px,
            Self::MaxHeight(px) => viewport.height <= px,
            Self::Orientation(Orientation::Portrait) => viewport.height >= viewport.width,
            Self::Orientation(Orientation::Landscape) => viewport.width > viewport.height,
        }
    }
}

/// A parsed viewport condition: a conjunction of feature clauses.
///
/// Supported syntax is the media-query subset that gates source selection:
/// `(min-width: 800px)`, `(max-height: 400px)`,
/// `(orientation: landscape)`, and `and`-combinations thereof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaCondition {
    clauses: Vec<Clause>,
    raw: String,
}

impl MediaCondition {
    /// Parse a condition expression.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError`] on empty input, malformed syntax, an
    /// unsupported feature name, or an invalid feature value.
    pub fn parse(input: &str) -> MediaResult<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(MediaError::EmptyCondition);
        }

        let mut clauses = Vec::new();
        let mut rest = raw;
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            if !clauses.is_empty() {
                rest = rest
                    .strip_prefix("and")
                    .ok_or_else(|| MediaError::Syntax(raw.to_owned()))?
                    .trim_start();
            }
            let body = rest
                .strip_prefix('(')
                .ok_or_else(|| MediaError::Syntax(raw.to_owned()))?;
            let end = body
                .find(')')
                .ok_or_else(|| MediaError::Syntax(raw.to_owned()))?;
            clauses.push(Self::parse_clause(&body[..end])?);
            rest = &body[end + 1..];
        }

        Ok(Self {
            clauses,
            raw: raw.to_owned(),
        })
    }

    fn parse_clause(text: &str) -> MediaResult<Clause> {
        let (feature, value) = text
            .split_once(':')
            .ok_or_else(|| MediaError::Syntax(text.to_owned()))?;
        let feature = feature.trim().to_ascii_lowercase();
        let value = value.trim();

        match feature.as_str() {
            "min-width" => Ok(Clause::MinWidth(parse_px(value)?)),
            "max-width" => Ok(Clause::MaxWidth(parse_px(value)?)),
            "min-height" => Ok(Clause::MinHeight(parse_px(value)?)),
            "max-height" => Ok(Clause::MaxHeight(parse_px(value)?)),
            "orientation" => match value.to_ascii_lowercase().as_str() {
                "landscape" => Ok(Clause::Orientation(Orientation::Landscape)),
                "portrait" => Ok(Clause::Orientation(Orientation::Portrait)),
                other => Err(MediaError::InvalidOrientation(other.to_owned())),
            },
            other => Err(MediaError::UnsupportedFeature(other.to_owned())),
        }
    }

    /// Evaluate the condition against a viewport snapshot.
    #[must_use]
    pub fn evaluate(&self, viewport: Viewport) -> bool {
        self.clauses.iter().all(|clause| clause.holds(viewport))
    }
}

fn parse_px(value: &str) -> MediaResult<u32> {
    value
        .strip_suffix("px")
        .and_then(|number| number.trim().parse::<u32>().ok())
        .ok_or_else(|| MediaError::InvalidLength(value.to_owned()))
}

impl std::fmt::Display for MediaCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
