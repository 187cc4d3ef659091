use std::time::{Duration, Instant};

pub const WINDOW_SIZE: usize = 3;

/// Rotating three-card window over the catalog with optional auto-advance.
#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    start: usize,
    selected: Option<usize>,
    auto_scroll: bool,
    interval: Duration,
    last_advance: Instant,
}

impl Carousel {
    pub fn new(len: usize, interval: Duration, now: Instant) -> Self {
        Self {
            len,
            start: 0,
            selected: None,
            auto_scroll: true,
            interval,
            last_advance: now,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_auto_advancing(&self) -> bool {
        self.auto_scroll && self.selected.is_none() && self.len > 0
    }

    pub fn window(&self) -> Vec<usize> {
        if self.len == 0 {
            return Vec::new();
        }
        (0..WINDOW_SIZE)
            .map(|offset| (self.start + offset) % self.len)
            .collect()
    }

    /// Advances one step when the interval has elapsed. Returns whether it moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.is_auto_advancing() {
            return false;
        }
        if now.saturating_duration_since(self.last_advance) < self.interval {
            return false;
        }
        self.start = (self.start + 1) % self.len;
        self.last_advance = now;
        true
    }

    pub fn next(&mut self) {
        if self.len == 0 {
            return;
        }
        self.start = (self.start + 1) % self.len;
        self.auto_scroll = false;
    }

    pub fn prev(&mut self) {
        if self.len == 0 {
            return;
        }
        self.start = (self.start + self.len - 1) % self.len;
        self.auto_scroll = false;
    }

    /// Returns false when the index is out of range or already selected.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.auto_scroll = false;
        if self.selected == Some(index) {
            return false;
        }
        self.selected = Some(index);
        true
    }

    #[cfg(test)]
    fn with_start(mut self, start: usize) -> Self {
        self.start = start % self.len.max(1);
        self
    }
}
