#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Nudge the manual correction forward by the configured step.
    OffsetUp,
    /// Nudge the manual correction backward.
    OffsetDown,
    /// Recognize now instead of waiting for the next poll.
    ForceRecognize,
    /// Toggle between full (context lines) and compact layout.
    ToggleCompact,
    /// Scroll the plain-lyrics block.
    ScrollUp,
    ScrollDown,
    Resize,
}
