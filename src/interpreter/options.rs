/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Deepest allowed nesting of SCRIPT, EXEC, GETVALUE and macro calls.
    /// `None` leaves recursion unbounded.
    pub max_depth: Option<usize>,
    /// Seed for RND and RAND. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
