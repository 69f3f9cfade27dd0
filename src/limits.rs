use crate::constants;

/// Represents the memory bounds of a request to protect against oversized or
/// boundaryless input.
///
/// # Examples
///
/// ```
/// use partstream::Limits;
///
/// let limits = Limits::new().buffer(4096).margin(256);
/// assert_eq!(limits.buffer_limit(), 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub(crate) head: usize,
    pub(crate) buffer: usize,
    pub(crate) margin: usize,
}

impl Limits {
    /// Creates the default limits: a 2048 byte scan buffer, a 128 byte
    /// retained margin and an 8 KiB request head.
    pub fn new() -> Limits {
        Limits::default()
    }

    /// Sets the maximum size of the request head, terminator excluded.
    pub fn head(mut self, limit: usize) -> Limits {
        self.head = limit;
        self
    }

    /// Sets the cap of the multipart scan buffer and of each part's header
    /// buffer.
    pub fn buffer(mut self, limit: usize) -> Limits {
        self.buffer = limit;
        self
    }

    /// Sets how many trailing bytes the scanner withholds from the active part
    /// while no boundary is in sight.
    ///
    /// The margin must be longer than the closing boundary marker and shorter
    /// than the buffer limit, otherwise
    /// [`MultipartScanner::new`](crate::MultipartScanner::new) rejects the
    /// body with [`Error::BoundaryTooLong`](crate::Error::BoundaryTooLong) or
    /// [`Error::InvalidLimits`](crate::Error::InvalidLimits).
    pub fn margin(mut self, margin: usize) -> Limits {
        self.margin = margin;
        self
    }

    pub fn head_limit(&self) -> usize {
        self.head
    }

    pub fn buffer_limit(&self) -> usize {
        self.buffer
    }

    pub fn retained_margin(&self) -> usize {
        self.margin
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            head: constants::DEFAULT_HEAD_LIMIT,
            buffer: constants::DEFAULT_BUFFER_LIMIT,
            margin: constants::DEFAULT_MARGIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = Limits::new();
        assert_eq!(limits.buffer_limit(), 2048);
        assert_eq!(limits.retained_margin(), 128);
        assert_eq!(limits.head_limit(), 8192);
    }

    #[test]
    fn test_builder() {
        let limits = Limits::new().head(100).buffer(512).margin(64);
        assert_eq!(limits, Limits { head: 100, buffer: 512, margin: 64 });
    }
}
