use crate::shared::constants::FALLBACK_FPS;

/// Native rate to use for interval computation.
///
/// Decoders frequently report no rate (or zero) for some containers; that is
/// treated as [`FALLBACK_FPS`] rather than an error.
pub fn effective_native_fps(reported: f64) -> f64 {
    if reported.is_finite() && reported > 0.0 {
        reported
    } else {
        FALLBACK_FPS
    }
}

/// Stride over source frame indices: `max(round(native / target), 1)`.
///
/// Rounds half to even, so 25 fps sampled at 10 fps keeps every 2nd frame.
/// `target_fps` must be positive and finite (see
/// [`SamplingRequest`](super::sampling_request::SamplingRequest)).
pub fn sampling_interval(native_fps: f64, target_fps: f64) -> usize {
    let native = effective_native_fps(native_fps);
    let stride = (native / target_fps).round_ties_even();
    // `as` saturates, so an overflowing or infinite stride keeps frame 0 only.
    if stride >= 1.0 {
        stride as usize
    } else {
        1
    }
}

/// Whether the frame at `frame_index` is kept for the given stride.
pub fn is_sampled(frame_index: usize, interval: usize) -> bool {
    frame_index % interval.max(1) == 0
}

/// Number of frames a source of `total_frames` yields at `interval`.
pub fn expected_sample_count(total_frames: usize, interval: usize) -> usize {
    total_frames.div_ceil(interval.max(1))
}
