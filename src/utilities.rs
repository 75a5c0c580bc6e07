//! Internal helpers shared by the FFmpeg-backed video source.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy an RGB24 frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3),
/// which [`image::RgbImage::from_raw`] does not accept.
pub(crate) fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        buffer
    }
}

/// Convert a frame index to a container seek timestamp in AV_TIME_BASE
/// (microseconds), as expected by `Input::seek`.
pub(crate) fn frame_index_to_seek_timestamp(frame_index: u64, frames_per_second: f64) -> i64 {
    let seconds = frame_index as f64 / frames_per_second;
    (seconds * 1_000_000.0) as i64
}

/// Rescale a PTS value in the stream time base to the nearest frame index.
pub(crate) fn pts_to_frame_index(pts: i64, time_base: Rational, frames_per_second: f64) -> u64 {
    let seconds = pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    (seconds * frames_per_second).round().max(0.0) as u64
}

/// Scale a frame dimension by `factor`, rounding to the nearest pixel and
/// never going below one pixel.
pub(crate) fn scale_dimension(value: u32, factor: f64) -> u32 {
    ((value as f64) * factor).round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::Rational;

    use super::*;

    #[test]
    fn seek_timestamp_is_in_microseconds() {
        assert_eq!(frame_index_to_seek_timestamp(0, 25.0), 0);
        assert_eq!(frame_index_to_seek_timestamp(25, 25.0), 1_000_000);
        assert_eq!(frame_index_to_seek_timestamp(50, 25.0), 2_000_000);
    }

    #[test]
    fn pts_maps_back_to_frame_index() {
        let time_base = Rational::new(1, 12_800);
        // 512 ticks per frame at 25 fps.
        assert_eq!(pts_to_frame_index(0, time_base, 25.0), 0);
        assert_eq!(pts_to_frame_index(512 * 11, time_base, 25.0), 11);
        assert_eq!(pts_to_frame_index(-512, time_base, 25.0), 0);
    }

    #[test]
    fn scaled_dimensions_round_and_clamp() {
        assert_eq!(scale_dimension(640, 0.7), 448);
        assert_eq!(scale_dimension(480, 0.7), 336);
        assert_eq!(scale_dimension(1, 0.1), 1);
    }
}
