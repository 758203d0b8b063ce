/// Command outcome determining exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command completed (exit 0).
    Success,
    /// A request was made and failed (exit 1).
    Failed,
    /// Invalid invocation, unreadable input, or server startup failure (exit 2).
    Usage,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Failed => 1,
            Outcome::Usage => 2,
        }
    }
}
