//! Video frame types.

use std::sync::OnceLock;
use std::time::Instant;

/// Planar YUV 4:2:0 pixel buffer. The chroma planes are half the luma size
/// in each dimension, rounded up for odd sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I420Buffer {
    width: u32,
    height: u32,
    data_y: Vec<u8>,
    data_u: Vec<u8>,
    data_v: Vec<u8>,
}

impl I420Buffer {
    /// Allocates a zero-filled buffer. Returns `None` when the planes would
    /// not fit in `usize`.
    pub fn allocate(width: u32, height: u32) -> Option<Self> {
        let (luma, chroma) = plane_sizes(width, height)?;
        Some(Self {
            width,
            height,
            data_y: vec![0; luma],
            data_u: vec![0; chroma],
            data_v: vec![0; chroma],
        })
    }

    /// Total bytes a buffer of this size needs, if addressable.
    pub fn byte_len(width: u32, height: u32) -> Option<usize> {
        let (luma, chroma) = plane_sizes(width, height)?;
        luma.checked_add(chroma.checked_mul(2)?)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn chroma_width(&self) -> u32 {
        self.width.div_ceil(2)
    }

    pub fn chroma_height(&self) -> u32 {
        self.height.div_ceil(2)
    }

    pub fn stride_y(&self) -> u32 {
        self.width
    }

    pub fn stride_u(&self) -> u32 {
        self.chroma_width()
    }

    pub fn stride_v(&self) -> u32 {
        self.chroma_width()
    }

    pub fn data_y(&self) -> &[u8] {
        &self.data_y
    }

    pub fn data_u(&self) -> &[u8] {
        &self.data_u
    }

    pub fn data_v(&self) -> &[u8] {
        &self.data_v
    }

    /// Total bytes across all three planes.
    pub fn len(&self) -> usize {
        self.data_y.len() + self.data_u.len() + self.data_v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn plane_sizes(width: u32, height: u32) -> Option<(usize, usize)> {
    let dim = |v: u32| usize::try_from(v).ok();
    let luma = dim(width)?.checked_mul(dim(height)?)?;
    let chroma = dim(width.div_ceil(2))?.checked_mul(dim(height.div_ceil(2))?)?;
    luma.checked_add(chroma.checked_mul(2)?)?;
    Some((luma, chroma))
}

/// A captured frame: pixels, rotation in degrees and a capture timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    buffer: I420Buffer,
    rotation: u32,
    timestamp_ns: i64,
}

impl VideoFrame {
    pub fn new(buffer: I420Buffer, rotation: u32, timestamp_ns: i64) -> Self {
        Self {
            buffer,
            rotation,
            timestamp_ns,
        }
    }

    pub fn buffer(&self) -> &I420Buffer {
        &self.buffer
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Clockwise rotation to apply before display, in degrees.
    pub fn rotation(&self) -> u32 {
        self.rotation
    }

    pub fn timestamp_ns(&self) -> i64 {
        self.timestamp_ns
    }
}

/// Nanoseconds on a monotonic clock, measured from the first call in this
/// process.
pub fn monotonic_nanos() -> i64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let elapsed = EPOCH.get_or_init(Instant::now).elapsed();
    i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX)
}
