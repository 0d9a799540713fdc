//! Request window planning.
//!
//! Exchange history endpoints bound requests in two different ways, and
//! each gets its own planner:
//!
//! - Span-capped endpoints (KuCoin ledgers and fills) limit how much
//!   time one request may cover. [`plan_step_windows`] walks the span in
//!   step-sized windows whose union is exactly `[start, end]`.
//! - Record-capped endpoints (candles) limit how many rows one response
//!   may carry. [`plan_capped_windows`] lays a grid of period starts and
//!   slices it into non-overlapping windows of at most `max_points`
//!   grid points, so no single request can exceed the cap.

use chrono::{Duration, NaiveDateTime};

/// One bounded sub-range of a fetch span.
///
/// Both bounds are inclusive, matching how the exchanges interpret
/// `startAt`/`endAt`. Step windows share their boundary instant with
/// the next window, so a record sitting exactly on a boundary can
/// appear in two adjacent responses; downstream deduplication by
/// record id absorbs that. Capped windows never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Splits `[start, end]` into windows of at most `step` each.
///
/// Windows are contiguous and their union is exactly `[start, end]`:
/// the final window is clamped to `end` rather than running a full
/// step past it, and when the span divides evenly no zero-width
/// trailing window is emitted. Returns an empty vector for an empty or
/// inverted range or a non-positive step.
pub fn plan_step_windows(start: NaiveDateTime, end: NaiveDateTime, step: Duration) -> Vec<Window> {
    if start >= end || step <= Duration::zero() {
        return Vec::new();
    }

    let mut windows = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let next = cursor + step;
        windows.push(Window {
            start: cursor,
            end: next.min(end),
        });
        cursor = next;
    }
    windows
}

/// Splits `[start, end]` into windows of at most `max_points` period
/// starts each.
///
/// A grid of timestamps is laid out every `step` from `start` up to and
/// including `end` (when it lands on the grid); each window covers one
/// run of `max_points` consecutive grid points, inclusive of both. The
/// windows never overlap, so a request can return at most `max_points`
/// records even with inclusive bounds. Records only exist at grid
/// points, which makes the inter-window gap of one step empty by
/// construction. Returns an empty vector for an inverted range, a
/// non-positive step, or `max_points == 0`.
pub fn plan_capped_windows(
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: Duration,
    max_points: usize,
) -> Vec<Window> {
    if start > end || step <= Duration::zero() || max_points == 0 {
        return Vec::new();
    }

    let mut grid = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        grid.push(cursor);
        cursor += step;
    }

    grid.chunks(max_points)
        .map(|chunk| Window {
            start: chunk[0],
            end: chunk[chunk.len() - 1],
        })
        .collect()
}
