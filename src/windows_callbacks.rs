//! The crate's bare `extern "system"` entry points: the only functions that
//! Windows itself calls back into. Everything they do beyond reading their
//! raw arguments is handed off to safe, testable logic elsewhere in the
//! crate via [`crate::with_core`].

use windows::Win32::Foundation::BOOL;
use windows::Win32::Foundation::LPARAM;
use windows::Win32::Foundation::LRESULT;
use windows::Win32::Foundation::RECT;
use windows::Win32::Foundation::WPARAM;
use windows::Win32::Graphics::Gdi::HDC;
use windows::Win32::Graphics::Gdi::HMONITOR;
use windows::Win32::Graphics::Gdi::MONITORINFOF_PRIMARY;
use windows::Win32::UI::WindowsAndMessaging::CallNextHookEx;
use windows::Win32::UI::WindowsAndMessaging::LLMHF_INJECTED;
use windows::Win32::UI::WindowsAndMessaging::MSLLHOOKSTRUCT;
use windows::Win32::UI::WindowsAndMessaging::WM_MOUSEMOVE;

use crate::hook::Decision;
use crate::topology::Monitor;
use crate::windows_api::WindowsApi;

/// `MONITORENUMPROC`: appends one [`Monitor`] per connected display to the
/// `Vec<Monitor>` whose address was passed as `lparam`.
pub extern "system" fn monitor_enum_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _rect: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let monitors = unsafe { &mut *(lparam.0 as *mut Vec<Monitor>) };

    if let Ok(info) = WindowsApi::monitor_info_w(hmonitor) {
        let device_name = String::from_utf16_lossy(
            &info
                .szDevice
                .iter()
                .copied()
                .take_while(|&c| c != 0)
                .collect::<Vec<_>>(),
        );

        monitors.push(Monitor {
            handle: hmonitor.0 as isize,
            rect: info.into(),
            primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
            device_name,
        });
    }

    true.into()
}

/// `WH_MOUSE_LL` hook procedure. Must always call `CallNextHookEx` except
/// when deliberately suppressing a `WM_MOUSEMOVE` that has just been
/// replaced by a synthetic one.
pub extern "system" fn mouse_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code < 0 {
        return unsafe { CallNextHookEx(None, n_code, w_param, l_param) };
    }

    if w_param.0 as u32 == WM_MOUSEMOVE {
        let data = unsafe { &*(l_param.0 as *const MSLLHOOKSTRUCT) };
        let injected = data.flags & LLMHF_INJECTED != 0;

        if injected {
            return unsafe { CallNextHookEx(None, n_code, w_param, l_param) };
        }

        let point = (data.pt.x, data.pt.y);
        let suppress = handle_mouse_move(point);

        if suppress {
            return LRESULT(1);
        }
    }

    unsafe { CallNextHookEx(None, n_code, w_param, l_param) }
}

/// What the decision phase found, carried across the `with_core` borrow
/// boundary so the actual `SetCursorPos` call can run with no borrow of
/// [`crate::Core`] held.
enum Step {
    /// Nothing to do: either already suppressed, or the decision was a plain
    /// pass-through (trace, if any, already recorded).
    Done,
    /// A crossing was found and the Suppression Flag has already been set;
    /// the synthetic move itself still needs to happen.
    Remap { mapped: (i32, i32), dest_monitor: isize },
}

/// The part of the hook procedure that touches [`crate::Core`]. Kept
/// separate from the raw callback so the re-entrancy guard and the
/// OS-effecting synthetic move are easy to read top to bottom.
///
/// Split into two `with_core` calls around the `SetCursorPos` call itself:
/// `with_core` borrows the thread-local `RefCell` mutably for the whole
/// closure, and `SetCursorPos` can synchronously re-enter this very function
/// (§5's re-entrancy contract). Calling it from inside the first closure
/// would mean the re-entrant call's own `with_core` tries to borrow an
/// already-borrowed `RefCell` and panics, aborting the process from inside
/// an `extern "system"` callback. Dropping the borrow before the OS call and
/// re-acquiring it after avoids that entirely.
fn handle_mouse_move(point: (i32, i32)) -> bool {
    let step = crate::with_core(|core| {
        if core.is_suppressed() {
            return Step::Done;
        }

        let monitor_handle = WindowsApi::monitor_from_point(point);

        match core.decide(monitor_handle, point) {
            Decision::PassThrough { update_trace } => {
                if let Some((handle, point)) = update_trace {
                    core.record_trace(handle, point);
                }
                Step::Done
            }
            Decision::Remap { mapped, dest_monitor } => {
                core.set_suppressed(true);
                Step::Remap { mapped, dest_monitor }
            }
        }
    });

    let Some(Step::Remap { mapped, dest_monitor }) = step else {
        return false;
    };

    // No borrow of Core is held here: a synchronous re-entrant hook callback
    // triggered by this call sees `is_suppressed() == true` and returns
    // `Step::Done` above without touching the `RefCell` we've already
    // released.
    let moved = WindowsApi::set_cursor_pos(mapped);

    let handled = crate::with_core(|core| {
        core.set_suppressed(false);

        match moved {
            Ok(()) => {
                core.record_trace(dest_monitor, mapped);
                true
            }
            Err(ref error) => {
                tracing::warn!(%error, "synthetic cursor move failed, passing event through");
                false
            }
        }
    });

    handled.unwrap_or(false)
}
