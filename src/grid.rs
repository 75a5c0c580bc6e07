//! Contact-sheet composition.
//!
//! [`resolve_layout`] turns a frame count and a requested column count into
//! a [`GridLayout`]. When the request does not divide the frame count
//! evenly, the nearest column count that does is searched for within
//! [`DIVISOR_SEARCH_RADIUS`], preferring the larger candidate on a tie.
//! [`resolve`] then tiles the frames row by row into one image.
//!
//! ```
//! use framegrid::resolve_layout;
//!
//! // 18 frames do not fit 5 columns; 6 (distance 1) beats 3 (distance 2).
//! let layout = resolve_layout(18, 5)?;
//! assert_eq!((layout.columns(), layout.rows()), (6, 3));
//! # Ok::<(), framegrid::FramegridError>(())
//! ```

use std::path::Path;

use image::{DynamicImage, GenericImage, GenericImageView, codecs::jpeg::JpegEncoder};

use crate::error::FramegridError;

/// How far above the requested column count the divisor search looks.
///
/// Candidates `requested + 1 .. requested + DIVISOR_SEARCH_RADIUS` are
/// tried; the bound itself is the fallback when none divides.
pub const DIVISOR_SEARCH_RADIUS: usize = 10;

/// Fallback for the downward search. Never reached in practice since one
/// divides every count.
pub const MIN_COLUMNS: usize = 1;

/// First divisor of `count` in `from + 1 .. from + radius`.
pub fn divisor_above(count: usize, from: usize, radius: usize) -> Option<usize> {
    (from + 1..from + radius).find(|&candidate| count % candidate == 0)
}

/// First divisor of `count` scanning down from `from` to [`MIN_COLUMNS`].
pub fn divisor_at_or_below(count: usize, from: usize) -> Option<usize> {
    (MIN_COLUMNS..=from)
        .rev()
        .find(|&candidate| count % candidate == 0)
}

/// Grid dimensions chosen for a frame batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct GridLayout {
    requested_columns: usize,
    columns: usize,
    rows: usize,
    dropped: usize,
}

impl GridLayout {
    /// Column count that was asked for.
    pub fn requested_columns(&self) -> usize {
        self.requested_columns
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Trailing frames left out of the grid.
    ///
    /// Non-zero only when the search window held no divisor and the
    /// upper fallback was chosen.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Whether the requested column count had to be replaced.
    pub fn is_fallback(&self) -> bool {
        self.columns != self.requested_columns
    }

    /// Number of frames drawn.
    pub fn cells(&self) -> usize {
        self.columns * self.rows
    }
}

/// Choose the column and row counts for `frame_count` frames.
///
/// # Errors
///
/// [`FramegridError::InvalidColumnCount`] for zero columns and
/// [`FramegridError::TooManyColumns`] when more columns than frames are
/// requested. Neither case searches.
pub fn resolve_layout(
    frame_count: usize,
    requested_columns: usize,
) -> Result<GridLayout, FramegridError> {
    if requested_columns == 0 {
        return Err(FramegridError::InvalidColumnCount(requested_columns));
    }
    if requested_columns > frame_count {
        return Err(FramegridError::TooManyColumns {
            columns: requested_columns,
            frames: frame_count,
        });
    }

    let columns = if frame_count % requested_columns == 0 {
        requested_columns
    } else {
        let higher = divisor_above(frame_count, requested_columns, DIVISOR_SEARCH_RADIUS)
            .unwrap_or(requested_columns + DIVISOR_SEARCH_RADIUS);
        let lower = divisor_at_or_below(frame_count, requested_columns).unwrap_or(MIN_COLUMNS);

        let chosen = if higher - requested_columns <= requested_columns - lower {
            higher
        } else {
            lower
        };
        log::warn!(
            "Unbalanced grid: {frame_count} frames do not fit {requested_columns} columns, using {chosen}"
        );
        chosen
    };

    let rows = frame_count / columns;
    let dropped = frame_count - rows * columns;
    if dropped > 0 {
        log::warn!(
            "No column count within {DIVISOR_SEARCH_RADIUS} of {requested_columns} divides {frame_count}; \
             leaving out the last {dropped} frames"
        );
    }

    Ok(GridLayout {
        requested_columns,
        columns,
        rows,
        dropped,
    })
}

/// A composed grid image and the layout it was built with.
#[derive(Debug, Clone)]
pub struct ContactSheet {
    image: DynamicImage,
    layout: GridLayout,
}

impl ContactSheet {
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    /// Encode the sheet as a JPEG at `path`.
    pub fn save_jpeg<P: AsRef<Path>>(&self, path: P, quality: u8) -> Result<(), FramegridError> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
        self.image.to_rgb8().write_with_encoder(encoder)?;
        log::debug!("Wrote contact sheet {}", path.display());
        Ok(())
    }
}

/// Tile `frames` into a grid of about `requested_columns` columns.
///
/// Frames are laid out left to right, top to bottom, in the order given.
/// The call is deterministic: the same frames and request always give the
/// same pixels.
///
/// # Errors
///
/// Those of [`resolve_layout`], plus
/// [`FramegridError::MismatchedFrameDimensions`] if the frames differ in size.
pub fn resolve(
    frames: &[DynamicImage],
    requested_columns: usize,
) -> Result<ContactSheet, FramegridError> {
    let layout = resolve_layout(frames.len(), requested_columns)?;
    let (frame_width, frame_height) = uniform_dimensions(frames)?;

    let rows = frames[..layout.cells()]
        .chunks_exact(layout.columns)
        .map(concat_horizontal)
        .collect::<Result<Vec<_>, _>>()?;
    let image = stack_vertical(&rows)?;

    debug_assert_eq!(image.width(), frame_width * layout.columns as u32);
    debug_assert_eq!(image.height(), frame_height * layout.rows as u32);

    Ok(ContactSheet { image, layout })
}

fn uniform_dimensions(frames: &[DynamicImage]) -> Result<(u32, u32), FramegridError> {
    // resolve_layout has already rejected an empty batch.
    let (width, height) = frames[0].dimensions();
    for (index, frame) in frames.iter().enumerate().skip(1) {
        let (actual_width, actual_height) = frame.dimensions();
        if (actual_width, actual_height) != (width, height) {
            return Err(FramegridError::MismatchedFrameDimensions {
                index,
                expected_width: width,
                expected_height: height,
                actual_width,
                actual_height,
            });
        }
    }
    Ok((width, height))
}

fn concat_horizontal(frames: &[DynamicImage]) -> Result<DynamicImage, FramegridError> {
    let (width, height) = frames[0].dimensions();
    let mut row = DynamicImage::new(width * frames.len() as u32, height, frames[0].color());
    for (index, frame) in frames.iter().enumerate() {
        row.copy_from(frame, index as u32 * width, 0)?;
    }
    Ok(row)
}

fn stack_vertical(rows: &[DynamicImage]) -> Result<DynamicImage, FramegridError> {
    let (width, height) = rows[0].dimensions();
    let mut grid = DynamicImage::new(width, height * rows.len() as u32, rows[0].color());
    for (index, row) in rows.iter().enumerate() {
        grid.copy_from(row, 0, index as u32 * height)?;
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisor_above_excludes_window_end() {
        assert_eq!(divisor_above(18, 5, DIVISOR_SEARCH_RADIUS), Some(6));
        // 24 = 14 + 10 is outside the window.
        assert_eq!(divisor_above(24, 14, DIVISOR_SEARCH_RADIUS), None);
        assert_eq!(divisor_above(23, 12, DIVISOR_SEARCH_RADIUS), None);
    }

    #[test]
    fn divisor_at_or_below_includes_start() {
        assert_eq!(divisor_at_or_below(18, 6), Some(6));
        assert_eq!(divisor_at_or_below(18, 5), Some(3));
        assert_eq!(divisor_at_or_below(23, 12), Some(1));
        assert_eq!(divisor_at_or_below(7, 0), None);
    }

    #[test]
    fn exact_request_is_kept() {
        let layout = resolve_layout(16, 4).unwrap();
        assert_eq!((layout.columns(), layout.rows(), layout.dropped()), (4, 4, 0));
        assert!(!layout.is_fallback());
    }

    #[test]
    fn tie_prefers_more_columns() {
        // 12 frames, 5 requested: 6 and 4 are both one away.
        let layout = resolve_layout(12, 5).unwrap();
        assert_eq!(layout.columns(), 6);
        assert!(layout.is_fallback());
    }

    #[test]
    fn closer_lower_divisor_wins() {
        // 20 frames, 6 requested: 10 is four away, 5 is one away.
        let layout = resolve_layout(20, 6).unwrap();
        assert_eq!((layout.columns(), layout.rows()), (5, 4));
    }

    #[test]
    fn prime_count_falls_back_to_window_bound() {
        let layout = resolve_layout(23, 12).unwrap();
        assert_eq!(layout.columns(), 22);
        assert_eq!(layout.rows(), 1);
        assert_eq!(layout.dropped(), 1);
    }
}
