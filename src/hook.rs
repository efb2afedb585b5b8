//! Owns the live topology, the last-known cursor position, and decides what
//! (if anything) should happen to a mouse-move event. Kept free of Win32
//! calls so the crossing decision can be exercised directly in tests; the
//! `extern "system"` hook procedure that drives it lives in
//! [`crate::windows_callbacks`].

use crate::geometry::{exit_edge, remap_percentage};
use crate::topology::TopologyModel;

/// Where the cursor was last seen, and on which monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CursorTrace {
    monitor: isize,
    point: (i32, i32),
}

/// What the hook procedure should do with the event that was just decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Let the event proceed unchanged. If `update_trace` carries a monitor,
    /// the caller should record it as the new baseline.
    PassThrough { update_trace: Option<(isize, (i32, i32))> },
    /// Suppress the original event and synthesize a move to `mapped` instead.
    Remap { mapped: (i32, i32), dest_monitor: isize },
}

/// Single-threaded owner of everything the crossing decision needs.
///
/// Lives in a `thread_local!` on the dispatcher thread so the bare
/// `extern "system"` hook callback can reach it without a lock.
pub struct Core {
    topology: TopologyModel,
    trace: Option<CursorTrace>,
    suppressed: bool,
}

impl Core {
    pub fn bootstrap() -> color_eyre::Result<Self> {
        Ok(Self {
            topology: TopologyModel::bootstrap()?,
            trace: None,
            suppressed: false,
        })
    }

    /// Builds a `Core` around a fabricated topology rather than one from
    /// [`TopologyModel::bootstrap`]. Used by this crate's own unit tests and
    /// by the `tests/` integration crate to exercise `decide()` end-to-end
    /// without a display attached.
    #[must_use]
    pub fn from_topology(topology: TopologyModel) -> Self {
        Self {
            topology,
            trace: None,
            suppressed: false,
        }
    }

    #[must_use]
    pub fn topology(&self) -> &TopologyModel {
        &self.topology
    }

    pub fn topology_mut(&mut self) -> &mut TopologyModel {
        &mut self.topology
    }

    /// Drops the cursor trace. Called whenever the topology changes, since a
    /// trace recorded against a monitor rectangle that may no longer exist
    /// (or has moved) is not a safe crossing source.
    pub fn invalidate_trace(&mut self) {
        self.trace = None;
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    /// Pure decision logic for one non-injected mouse-move event.
    ///
    /// `monitor_handle` is the result of an OS monitor-under-point query
    /// performed by the caller; `None` means the query was inconclusive and
    /// the event should be skipped without touching the trace.
    #[must_use]
    pub fn decide(&self, monitor_handle: Option<isize>, point: (i32, i32)) -> Decision {
        let Some(handle) = monitor_handle else {
            return Decision::PassThrough { update_trace: None };
        };

        if let Some(trace) = self.trace {
            if trace.monitor != handle {
                if let Some(remap) = self.try_remap(trace, point, handle) {
                    return remap;
                }
            }
        }

        Decision::PassThrough {
            update_trace: Some((handle, point)),
        }
    }

    fn try_remap(&self, trace: CursorTrace, point: (i32, i32), handle: isize) -> Option<Decision> {
        let source = self.topology.find(trace.monitor)?;

        // "its position is valid" (SPEC_FULL.md §4.3 step 4): `exit_edge`
        // assumes `p0` is inside-or-on-boundary of the source rectangle, so
        // a trace recorded against stale geometry (e.g. a monitor resized
        // out from under it) must be rejected here rather than fed in.
        if !source.rect.contains_point(trace.point) {
            return None;
        }

        let crossing = exit_edge(trace.point, point, source.rect)?;
        let dest = self.topology.find(handle)?;
        let mapped = remap_percentage(source.rect, dest.rect, crossing.edge, crossing.along)?;

        if mapped == point {
            return None;
        }

        Some(Decision::Remap {
            mapped,
            dest_monitor: handle,
        })
    }

    /// Records the outcome of a `PassThrough { update_trace: Some(..) }` or
    /// a successful `Remap`. Call sites never call this for a failed
    /// synthetic move: the trace is left exactly as it was, per the
    /// "synthetic move failed" recovery rule.
    pub fn record_trace(&mut self, monitor: isize, point: (i32, i32)) {
        self.trace = Some(CursorTrace { monitor, point });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::topology::Monitor;

    fn core_with(monitors: Vec<Monitor>) -> Core {
        // bootstrap() would hit the OS; build a Core around a fabricated
        // topology instead, the same way the `tests/` integration crate does.
        Core::from_topology(TopologyModel::from_monitors(monitors))
    }

    fn left_monitor() -> Monitor {
        Monitor {
            handle: 1,
            rect: Rect::new(0, 0, 1920, 1080),
            primary: true,
            device_name: r"\\.\DISPLAY1".to_owned(),
        }
    }

    fn right_monitor() -> Monitor {
        Monitor {
            handle: 2,
            rect: Rect::new(1920, 0, 3840, 2160),
            primary: false,
            device_name: r"\\.\DISPLAY2".to_owned(),
        }
    }

    #[test]
    fn first_event_establishes_trace_without_remapping() {
        let mut core = core_with(vec![left_monitor(), right_monitor()]);
        let decision = core.decide(Some(1), (960, 540));
        assert_eq!(
            decision,
            Decision::PassThrough {
                update_trace: Some((1, (960, 540)))
            }
        );
        core.record_trace(1, (960, 540));
    }

    #[test]
    fn crossing_into_taller_monitor_preserves_percentage() {
        let mut core = core_with(vec![left_monitor(), right_monitor()]);
        core.record_trace(1, (1900, 864));

        let decision = core.decide(Some(2), (1940, 864));
        match decision {
            Decision::Remap { mapped, dest_monitor } => {
                assert_eq!(dest_monitor, 2);
                assert_eq!(mapped, (1921, 1728));
            }
            other => panic!("expected remap, got {other:?}"),
        }
    }

    #[test]
    fn staying_on_same_monitor_never_remaps() {
        let mut core = core_with(vec![left_monitor(), right_monitor()]);
        core.record_trace(1, (100, 100));

        let decision = core.decide(Some(1), (200, 200));
        assert_eq!(
            decision,
            Decision::PassThrough {
                update_trace: Some((1, (200, 200)))
            }
        );
    }

    #[test]
    fn none_monitor_handle_is_skipped_without_touching_trace() {
        let core = core_with(vec![left_monitor()]);
        let decision = core.decide(None, (5000, 5000));
        assert_eq!(decision, Decision::PassThrough { update_trace: None });
    }

    #[test]
    fn missing_source_monitor_falls_back_to_pass_through() {
        let mut core = core_with(vec![right_monitor()]);
        // Trace points at a monitor handle no longer present in the topology.
        core.record_trace(99, (0, 0));

        let decision = core.decide(Some(2), (1925, 10));
        assert_eq!(
            decision,
            Decision::PassThrough {
                update_trace: Some((2, (1925, 10)))
            }
        );
    }

    #[test]
    fn stale_trace_position_outside_its_own_monitor_is_not_remapped() {
        let mut core = core_with(vec![left_monitor(), right_monitor()]);
        // The trace's monitor handle still exists, but the recorded position
        // no longer lies within its rectangle (e.g. a resize raced the
        // trace). `try_remap` must reject it rather than hand an
        // out-of-bounds `p0` to `exit_edge`.
        core.record_trace(1, (5000, 5000));

        let decision = core.decide(Some(2), (1940, 864));
        assert_eq!(
            decision,
            Decision::PassThrough {
                update_trace: Some((2, (1940, 864)))
            }
        );
    }
}
