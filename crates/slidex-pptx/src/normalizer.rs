//! Output canvas selection
//!
//! Every slide of a batch votes with its source canvas; the most frequent
//! size wins and ties go to the size seen first. Slides are never rescaled,
//! so a mixed batch is logged as a warning.

use slidex_core::SlideReference;
use tracing::{debug, warn};

use crate::canvas::TargetCanvas;
use crate::presentation::read_canvas;

/// Outcome of a canvas vote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasSelection {
    /// Chosen canvas
    pub canvas: TargetCanvas,
    /// Distinct sizes with their vote counts, in first-seen order
    pub tally: Vec<(TargetCanvas, usize)>,
    /// True when no size could be read and the default was used
    pub defaulted: bool,
}

impl CanvasSelection {
    /// Whether more than one distinct size was observed
    pub fn is_mixed(&self) -> bool {
        self.tally.len() > 1
    }
}

/// Picks one canvas for a batch of slides
#[derive(Debug, Clone, Copy)]
pub struct DimensionNormalizer {
    default: TargetCanvas,
}

impl Default for DimensionNormalizer {
    fn default() -> Self {
        Self::new(TargetCanvas::WIDESCREEN)
    }
}

impl DimensionNormalizer {
    /// Create a normalizer falling back to `default`
    pub fn new(default: TargetCanvas) -> Self {
        Self { default }
    }

    /// Vote over already-read sizes (`None` for an unreadable source)
    pub fn select<I>(&self, sizes: I) -> CanvasSelection
    where
        I: IntoIterator<Item = Option<TargetCanvas>>,
    {
        let mut tally: Vec<(TargetCanvas, usize)> = Vec::new();
        for canvas in sizes.into_iter().flatten() {
            match tally.iter_mut().find(|(seen, _)| *seen == canvas) {
                Some((_, count)) => *count += 1,
                None => tally.push((canvas, 1)),
            }
        }

        // Strictly greater keeps the earliest size on ties
        let winner = tally
            .iter()
            .fold(None::<&(TargetCanvas, usize)>, |best, entry| match best {
                Some(b) if b.1 >= entry.1 => Some(b),
                _ => Some(entry),
            })
            .map(|(canvas, _)| *canvas);

        let selection = CanvasSelection {
            canvas: winner.unwrap_or(self.default),
            defaulted: winner.is_none(),
            tally,
        };

        if selection.is_mixed() {
            warn!(
                chosen = %selection.canvas,
                sizes = selection.tally.len(),
                "Slides have differing canvas sizes; minority slides will not be rescaled"
            );
        } else if selection.defaulted {
            debug!(canvas = %selection.canvas, "No readable canvas size; using default");
        }
        selection
    }

    /// Read each slide's source canvas and vote
    ///
    /// The standalone file is read first; the deck is only consulted when
    /// the standalone file is absent or unreadable.
    pub fn select_for(&self, references: &[SlideReference]) -> CanvasSelection {
        self.select(references.iter().map(source_canvas))
    }
}

fn source_canvas(reference: &SlideReference) -> Option<TargetCanvas> {
    reference.sources().iter().find_map(|source| match read_canvas(source.path()) {
        Ok(canvas) => canvas,
        Err(e) => {
            debug!(path = %source.path().display(), error = %e, "Canvas not readable");
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: TargetCanvas = TargetCanvas::WIDESCREEN;
    const B: TargetCanvas = TargetCanvas {
        width: 9_144_000,
        height: 6_858_000,
    };

    #[test]
    fn test_majority_wins() {
        let selection = DimensionNormalizer::default().select([Some(B), Some(A), Some(A), Some(A)]);
        assert_eq!(selection.canvas, A);
        assert_eq!(selection.tally, vec![(B, 1), (A, 3)]);
        assert!(selection.is_mixed());
        assert!(!selection.defaulted);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let selection = DimensionNormalizer::default().select([Some(B), Some(A), Some(A), Some(B)]);
        assert_eq!(selection.canvas, B);
    }

    #[test]
    fn test_nothing_readable_uses_default() {
        let custom = TargetCanvas::new(100, 50);
        let selection = DimensionNormalizer::new(custom).select([None, None]);
        assert_eq!(selection.canvas, custom);
        assert!(selection.defaulted);
        assert!(selection.tally.is_empty());

        let selection = DimensionNormalizer::default().select(std::iter::empty());
        assert_eq!(selection.canvas, TargetCanvas::WIDESCREEN);
    }

    #[test]
    fn test_unreadable_entries_do_not_vote() {
        let selection = DimensionNormalizer::default().select([None, Some(B), None]);
        assert_eq!(selection.canvas, B);
        assert!(!selection.is_mixed());
    }

    #[test]
    fn test_missing_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let references = vec![SlideReference::new("x", dir.path().join("missing.pptx"), 0)];
        let selection = DimensionNormalizer::default().select_for(&references);
        assert!(selection.defaulted);
    }
}
