/// Classification for retry policy.
///
/// Used to determine how the paginated fetcher should respond to an error
/// raised while fetching one request window.
///
/// # Behavior Summary
///
/// | Class | Retry In Place? | Aborts The Window? |
/// |-------|-----------------|--------------------|
/// | `Never` | No | Yes |
/// | `WithBackoff` | Yes (bounded attempts) | Only after retries are exhausted |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - bad credentials, an unparseable response, or a
    /// cancelled fetch. Re-issuing the same request won't help.
    Never,

    /// Retry the same window with exponential backoff.
    ///
    /// Used for transient conditions such as rate limiting (429) or a
    /// request timeout. The fetcher re-issues the request after an
    /// increasing delay, up to a bounded number of attempts, before
    /// giving up on the window.
    WithBackoff,
}
