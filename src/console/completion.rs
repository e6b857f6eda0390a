//! Tab completion with cycling

use heapless::String;

use super::line_buffer::LINE_CAPACITY;

/// Tab completion state
pub struct Completer {
    /// Text the user typed before the first Tab
    prefix: String<LINE_CAPACITY>,
    /// Current match index for cycling
    match_idx: usize,
    /// Whether we're actively cycling
    cycling: bool,
}

impl Completer {
    /// Create new completer
    pub const fn new() -> Self {
        Self {
            prefix: String::new(),
            match_idx: 0,
            cycling: false,
        }
    }

    /// Complete `typed`, cycling through matches on repeated calls.
    ///
    /// While cycling, `typed` is the previous completion; matching keeps
    /// using the prefix from the first Tab. Returns `None` if nothing
    /// matches.
    pub fn complete<'a, I>(&mut self, typed: &str, candidates: I) -> Option<&'a str>
    where
        I: Iterator<Item = &'a str> + Clone,
    {
        if self.cycling {
            self.match_idx += 1;
        } else {
            self.prefix.clear();
            if self.prefix.push_str(typed).is_err() {
                return None;
            }
            self.match_idx = 0;
        }

        let prefix = self.prefix.as_str();
        let match_count = candidates.clone().filter(|c| c.starts_with(prefix)).count();

        if match_count == 0 {
            self.cycling = false;
            return None;
        }

        // Wrap around
        if self.match_idx >= match_count {
            self.match_idx = 0;
        }

        self.cycling = true;
        candidates.filter(|c| c.starts_with(prefix)).nth(self.match_idx)
    }

    /// Reset completion state (call when user types non-tab)
    pub fn reset(&mut self) {
        self.cycling = false;
        self.match_idx = 0;
    }
}

impl Default for Completer {
    fn default() -> Self {
        Self::new()
    }
}
