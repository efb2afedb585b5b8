#![warn(clippy::all)]

pub mod carrier_window;
pub mod geometry;
pub mod hook;
pub mod refresher;
pub mod topology;
pub mod windows_api;
pub mod windows_callbacks;

use std::cell::RefCell;

pub use hook::Core;
pub use windows_api::WindowsApi;

thread_local! {
    /// The single owner of live state, confined to the dispatcher thread.
    /// Reachable from the bare `extern "system"` hook and window-procedure
    /// callbacks, which cannot carry a closure environment of their own.
    static CORE: RefCell<Option<Core>> = const { RefCell::new(None) };
}

/// Installs the process state. Must run on the dispatcher thread, before
/// the mouse hook is registered.
pub fn install_core(core: Core) {
    CORE.with(|cell| *cell.borrow_mut() = Some(core));
}

/// Drops the process state. Must run on the dispatcher thread, after the
/// mouse hook has been unregistered.
pub fn uninstall_core() {
    CORE.with(|cell| *cell.borrow_mut() = None);
}

/// Runs `f` against the installed core, if any. Returns `None` if
/// [`install_core`] hasn't been called on this thread yet.
pub fn with_core<R>(f: impl FnOnce(&mut Core) -> R) -> Option<R> {
    CORE.with(|cell| cell.borrow_mut().as_mut().map(f))
}
