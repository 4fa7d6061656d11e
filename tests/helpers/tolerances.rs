//! Tolerance constants for stream testing.
//!
//! Overlap-add splices whole pitch periods, so output lengths and measured
//! frequencies only approximate the requested factor. These bounds are
//! tuned for the steady test tones produced by [`super`].

/// Relative error allowed on an output duration (2%).
pub const DURATION_TOLERANCE: f32 = 0.02;

/// Relative error allowed on a measured fundamental (5%).
pub const PITCH_TOLERANCE: f32 = 0.05;

/// Fixed-point gain rounding, in 16-bit steps.
pub const GAIN_LSB: i32 = 2;

/// 16-bit quantization step size.
/// Use when comparing the float paths against the integer paths.
pub const INT16_EPSILON: f32 = 1.0 / 32767.0;
