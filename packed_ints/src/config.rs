//! Read-only tuning knobs.
//!
//! An acceptable overhead ratio bounds how many extra bits per value a layout
//! may waste, relative to the requested width, in exchange for faster access.

/// No memory overhead at all; the chosen layout may be slow.
pub const COMPACT: f32 = 0.0;

/// At most 25% memory overhead.
pub const DEFAULT: f32 = 0.25;

/// At most 50% memory overhead, always picks a reasonably fast layout.
pub const FAST: f32 = 0.5;

/// At most 700% memory overhead, always picks the fastest layout.
pub const FASTEST: f32 = 7.0;

/// Memory, in bytes, given to bulk encode/decode buffers.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Settings for writers and iterators that pick a layout or size a buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackedConfig {
    pub acceptable_overhead_ratio: f32,
    pub buffer_size: usize,
}

impl Default for PackedConfig {
    fn default() -> Self {
        Self {
            acceptable_overhead_ratio: DEFAULT,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl PackedConfig {
    /// Ratio is clamped to `COMPACT..=FASTEST`.
    pub fn with_overhead_ratio(mut self, ratio: f32) -> Self {
        self.acceptable_overhead_ratio = ratio.clamp(COMPACT, FASTEST);
        self
    }

    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes;
        self
    }
}
