use std::fmt;

pub type BlockNumber = i64;

/// Half-open range of block numbers `[start, end)` evaluated as one unit of the scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: BlockNumber,
    pub end: BlockNumber,
}

impl Window {
    /// Bounds saturate at `i64::MAX`, the last window below it may be narrower than `size`.
    pub fn from_page(page: u64, size: u32) -> Self {
        let size = i64::from(size);
        let start = i64::try_from(page)
            .unwrap_or(i64::MAX)
            .saturating_mul(size);
        Self {
            start,
            end: start.saturating_add(size),
        }
    }

    pub fn size(&self) -> i64 {
        self.end - self.start
    }

    pub fn contains(&self, number: BlockNumber) -> bool {
        number >= self.start && number < self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Number of windows needed to cover `[0, head]`, zero for a negative head.
pub fn window_count(size: u32, head: BlockNumber) -> u64 {
    match u64::try_from(head / i64::from(size)) {
        Ok(pages) if head >= 0 => pages + 1,
        _ => 0,
    }
}

/// Windows of width `size` from zero up to and including the one holding `head`.
pub fn windows(size: u32, head: BlockNumber) -> impl Iterator<Item = Window> {
    (0..window_count(size, head)).map(move |page| Window::from_page(page, size))
}
