//! The monitor topology model: what monitors exist, where they are, and a
//! canonical signature used to detect when the arrangement has changed.

use crate::geometry::Rect;
use crate::windows_api::WindowsApi;

/// A single physical monitor, as understood by the rest of the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub handle: isize,
    pub rect: Rect,
    pub primary: bool,
    pub device_name: String,
}

/// An immutable view of the monitor arrangement at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    monitors: Vec<Monitor>,
    signature: String,
}

impl Snapshot {
    fn new(monitors: Vec<Monitor>) -> Self {
        let signature = signature_of(&monitors);
        Self { monitors, signature }
    }

    #[must_use]
    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    #[must_use]
    pub fn find(&self, handle: isize) -> Option<&Monitor> {
        self.monitors.iter().find(|m| m.handle == handle)
    }
}

/// Sorts monitors by device name then position and concatenates their
/// geometry into a string that is equal if and only if the arrangement is
/// equal, independent of the order `EnumDisplayMonitors` happened to report
/// them in.
#[must_use]
pub fn signature_of(monitors: &[Monitor]) -> String {
    let mut ordered: Vec<&Monitor> = monitors.iter().collect();
    ordered.sort_by(|a, b| {
        a.device_name
            .cmp(&b.device_name)
            .then(a.rect.left.cmp(&b.rect.left))
            .then(a.rect.top.cmp(&b.rect.top))
    });

    let mut signature = String::new();
    for monitor in ordered {
        signature.push_str(&format!(
            "{},{},{},{},{};{};",
            monitor.rect.left,
            monitor.rect.top,
            monitor.rect.right,
            monitor.rect.bottom,
            monitor.primary,
            monitor.device_name,
        ));
    }
    signature
}

/// Owns the current monitor snapshot and knows how to refresh it from the OS.
pub struct TopologyModel {
    snapshot: Snapshot,
}

impl TopologyModel {
    /// Enumerates monitors for the first time. Fails if none are found,
    /// since there is nothing meaningful to remap between.
    pub fn bootstrap() -> color_eyre::Result<Self> {
        let monitors = WindowsApi::enumerate_monitors()?;
        if monitors.is_empty() {
            color_eyre::eyre::bail!("no monitors reported by the display subsystem");
        }
        Ok(Self {
            snapshot: Snapshot::new(monitors),
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn find(&self, handle: isize) -> Option<&Monitor> {
        self.snapshot.find(handle)
    }

    /// Builds a topology from a fixed list of monitors rather than an OS
    /// enumeration. Production code never calls this directly (only
    /// [`Self::bootstrap`]/[`Self::refresh`] do, which always go through
    /// [`WindowsApi::enumerate_monitors`]); it exists so the decision logic
    /// that sits on top of the topology can be exercised with fabricated
    /// monitor arrangements, both from this crate's own unit tests and from
    /// the `tests/` integration crate.
    #[must_use]
    pub fn from_monitors(monitors: Vec<Monitor>) -> Self {
        Self {
            snapshot: Snapshot::new(monitors),
        }
    }

    /// Re-enumerates monitors and swaps in a new snapshot if the arrangement
    /// changed. Returns whether it changed.
    pub fn refresh(&mut self) -> color_eyre::Result<bool> {
        let monitors = WindowsApi::enumerate_monitors()?;
        let candidate = Snapshot::new(monitors);

        if candidate.signature() == self.snapshot.signature() {
            return Ok(false);
        }

        self.snapshot = candidate;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(handle: isize, rect: Rect, primary: bool, device_name: &str) -> Monitor {
        Monitor {
            handle,
            rect,
            primary,
            device_name: device_name.to_owned(),
        }
    }

    #[test]
    fn signature_is_order_independent() {
        let a = monitor(1, Rect::new(0, 0, 1920, 1080), true, r"\\.\DISPLAY1");
        let b = monitor(2, Rect::new(1920, 0, 3840, 1080), false, r"\\.\DISPLAY2");

        assert_eq!(
            signature_of(&[a.clone(), b.clone()]),
            signature_of(&[b, a]),
        );
    }

    #[test]
    fn signature_changes_with_geometry() {
        let a = monitor(1, Rect::new(0, 0, 1920, 1080), true, r"\\.\DISPLAY1");
        let mut moved = a.clone();
        moved.rect = Rect::new(0, 0, 2560, 1440);

        assert_ne!(signature_of(&[a]), signature_of(&[moved]));
    }

    #[test]
    fn snapshot_find_looks_up_by_handle() {
        let a = monitor(7, Rect::new(0, 0, 1920, 1080), true, r"\\.\DISPLAY1");
        let snapshot = Snapshot::new(vec![a]);

        assert!(snapshot.find(7).is_some());
        assert!(snapshot.find(8).is_none());
    }
}
