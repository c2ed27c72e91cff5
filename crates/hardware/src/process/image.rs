//! Loaded program image.
//!
//! Executable parsing happens outside the ISA layer. The loader hands over the
//! result as a [`LoadedImage`]: an entry point, an optional global pointer and
//! the segments to place in memory.

/// One contiguous piece of the program placed at a fixed virtual address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Segment {
    /// Load address.
    pub vaddr: u64,
    /// File-backed contents.
    pub data: Vec<u8>,
    /// Size in memory; bytes past `data.len()` are zero (BSS).
    pub mem_size: u64,
}

impl Segment {
    /// End address (exclusive) of the segment in memory.
    pub fn end(&self) -> u64 {
        self.vaddr + self.mem_size.max(self.data.len() as u64)
    }
}

/// A program ready to be placed in simulated memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadedImage {
    /// First instruction to execute.
    pub entry: u64,
    /// Value for the global pointer register, where the ABI has one.
    pub global_pointer: Option<u64>,
    /// Segments in load order.
    pub segments: Vec<Segment>,
}

impl LoadedImage {
    /// Creates an image with no segments.
    pub const fn new(entry: u64) -> Self {
        Self {
            entry,
            global_pointer: None,
            segments: Vec::new(),
        }
    }

    /// Adds a segment whose memory size equals its contents.
    #[must_use]
    pub fn with_segment(mut self, vaddr: u64, data: Vec<u8>) -> Self {
        let mem_size = data.len() as u64;
        self.segments.push(Segment {
            vaddr,
            data,
            mem_size,
        });
        self
    }

    /// Adds a zero-filled segment.
    #[must_use]
    pub fn with_bss(mut self, vaddr: u64, mem_size: u64) -> Self {
        self.segments.push(Segment {
            vaddr,
            data: Vec::new(),
            mem_size,
        });
        self
    }

    /// Sets the global pointer.
    #[must_use]
    pub const fn with_global_pointer(mut self, gp: u64) -> Self {
        self.global_pointer = Some(gp);
        self
    }

    /// Lowest segment address, if any.
    pub fn text_base(&self) -> Option<u64> {
        self.segments.iter().map(|s| s.vaddr).min()
    }

    /// Initial program break: the end of the highest segment rounded up to a page.
    pub fn brk_start(&self, page_bytes: u64) -> u64 {
        let end = self.segments.iter().map(Segment::end).max().unwrap_or(0);
        end.next_multiple_of(page_bytes)
    }
}
