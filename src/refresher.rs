//! Topology refresh triggers. A refresh is just "re-enumerate and swap if
//! different" (see [`crate::topology::TopologyModel::refresh`]); this module
//! only decides *when* that happens and logs the outcome.
//!
//! Every trigger is funneled through [`on_trigger`], called from the
//! dispatcher thread: the carrier window's `WM_DISPLAYCHANGE` and
//! `WM_SETTINGCHANGE` handlers call it directly, and so does the periodic
//! `WM_TIMER` tick. There is no separate refresher thread and no channel —
//! everything that can change the topology runs on the one thread that owns
//! [`crate::Core`].

/// What caused a refresh to be attempted, logged alongside the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    DisplayChanged,
    WorkAreaChanged,
    PeriodicTick,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::DisplayChanged => "display-changed",
            Self::WorkAreaChanged => "work-area-changed",
            Self::PeriodicTick => "periodic-tick",
        };
        f.write_str(label)
    }
}

/// Re-enumerates monitors on behalf of `trigger` and invalidates the cursor
/// trace if the arrangement actually changed. A no-op if [`crate::Core`]
/// hasn't been installed yet (shouldn't happen once the message loop is
/// running, but the carrier window can in principle receive messages before
/// then).
pub fn on_trigger(trigger: Trigger) {
    let handled = crate::with_core(|core| match core.topology_mut().refresh() {
        Ok(true) => {
            core.invalidate_trace();
            tracing::info!(
                %trigger,
                monitor_count = core.topology().snapshot().monitors().len(),
                "monitor topology changed"
            );
        }
        Ok(false) => {
            tracing::trace!(%trigger, "topology refresh: no change");
        }
        Err(error) => {
            tracing::warn!(%trigger, %error, "topology refresh failed");
        }
    });

    if handled.is_none() {
        tracing::warn!(%trigger, "topology refresh skipped: core not installed");
    }
}
