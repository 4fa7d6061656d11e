//! Output queue that keeps frames tagged with the format they were produced in.
//!
//! A format change starts a new segment; frames already queued keep their old
//! sample rate and channel count. Reads never span two segments, so every
//! slice handed to a caller has a single layout.

use std::collections::VecDeque;

use crate::buffer::SampleBuffer;
use crate::format::StreamFormat;

#[derive(Debug, Clone)]
struct Segment {
    format: StreamFormat,
    buffer: SampleBuffer,
}

impl Segment {
    fn new(format: StreamFormat) -> Self {
        Self {
            format,
            buffer: SampleBuffer::new(format.channels),
        }
    }
}

/// FIFO of processed frames, grouped into same-format segments.
///
/// Never empty: the back segment is the one new output is written to.
#[derive(Debug, Clone)]
pub struct Egress {
    segments: VecDeque<Segment>,
}

impl Egress {
    pub fn new(format: StreamFormat) -> Self {
        Self {
            segments: VecDeque::from([Segment::new(format)]),
        }
    }

    /// Route new output to `format`, opening a segment if it differs.
    pub fn switch_format(&mut self, format: StreamFormat) {
        let back = self.active_format();
        if back == format {
            return;
        }
        if self.segments.len() == 1 && self.segments[0].buffer.is_empty() {
            self.segments[0] = Segment::new(format);
        } else {
            self.segments.push_back(Segment::new(format));
        }
    }

    fn active_format(&self) -> StreamFormat {
        self.segments.back().map(|s| s.format).unwrap_or_else(|| unreachable!())
    }

    /// Buffer new output is appended to.
    pub fn active(&self) -> &SampleBuffer {
        match self.segments.back() {
            Some(segment) => &segment.buffer,
            None => unreachable!("egress always holds a segment"),
        }
    }

    pub fn active_mut(&mut self) -> &mut SampleBuffer {
        match self.segments.back_mut() {
            Some(segment) => &mut segment.buffer,
            None => unreachable!("egress always holds a segment"),
        }
    }

    /// Format of the next frames a read returns.
    pub fn front_format(&self) -> StreamFormat {
        self.segments
            .iter()
            .find(|s| !s.buffer.is_empty())
            .or(self.segments.back())
            .map(|s| s.format)
            .unwrap_or_else(|| unreachable!())
    }

    pub fn frames(&self) -> usize {
        self.segments.iter().map(|s| s.buffer.frames()).sum()
    }

    pub fn samples(&self) -> usize {
        self.segments.iter().map(|s| s.buffer.as_slice().len()).sum()
    }

    /// Read whole frames of the front segment into `out`, converting each sample.
    pub fn read_with<T>(&mut self, out: &mut [T], convert: impl Fn(i16) -> T) -> usize {
        if out.is_empty() {
            return 0;
        }
        while self.segments.len() > 1 && self.segments[0].buffer.is_empty() {
            self.segments.pop_front();
        }
        let frames = match self.segments.front_mut() {
            Some(front) => front.buffer.pop_with(out, convert),
            None => 0,
        };
        if self.segments.len() > 1 && self.segments[0].buffer.is_empty() {
            self.segments.pop_front();
        }
        frames
    }

    /// Drop everything queued, keeping the active format.
    pub fn clear(&mut self) {
        let format = self.active_format();
        self.segments.clear();
        self.segments.push_back(Segment::new(format));
    }
}
