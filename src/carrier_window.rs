//! The hidden carrier window: a message-only-in-spirit window whose sole
//! purpose is to receive `WM_DISPLAYCHANGE` and `WM_SETTINGCHANGE` and turn
//! them into topology refresh triggers.
//!
//! Created directly on the dispatcher thread (unlike the window-manager
//! reconciliator this is adapted from, which spawns a dedicated thread for
//! it) so its `WndProc` runs inline in the same `GetMessageW` loop that
//! drives the mouse hook and the periodic timer, keeping every mutation of
//! [`crate::Core`] on that one thread.

use windows::core::PCWSTR;
use windows::Win32::Foundation::HWND;
use windows::Win32::Foundation::LPARAM;
use windows::Win32::Foundation::LRESULT;
use windows::Win32::Foundation::WPARAM;
use windows::Win32::UI::WindowsAndMessaging::DefWindowProcW;
use windows::Win32::UI::WindowsAndMessaging::CS_HREDRAW;
use windows::Win32::UI::WindowsAndMessaging::CS_VREDRAW;
use windows::Win32::UI::WindowsAndMessaging::SPI_SETWORKAREA;
use windows::Win32::UI::WindowsAndMessaging::WM_DISPLAYCHANGE;
use windows::Win32::UI::WindowsAndMessaging::WM_SETTINGCHANGE;
use windows::Win32::UI::WindowsAndMessaging::WM_TIMER;
use windows::Win32::UI::WindowsAndMessaging::WNDCLASSW;

use crate::refresher::{self, Trigger};
use crate::windows_api::{as_ptr, WindowsApi};

const CLASS_NAME: &str = "screenglide-carrier\0";

/// Handle to the hidden carrier window. Dropping this value does not
/// destroy the window; callers tear it down explicitly during shutdown by
/// letting the process exit (the OS reclaims it), matching the teacher's
/// own hidden-window lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct CarrierWindow {
    pub hwnd: isize,
}

impl CarrierWindow {
    pub const fn handle(self) -> HWND {
        HWND(as_ptr!(self.hwnd))
    }

    /// Registers the window class and creates the window on the calling
    /// thread. Must be called on the dispatcher thread, before the message
    /// loop starts.
    pub fn create() -> color_eyre::Result<Self> {
        let name: Vec<u16> = CLASS_NAME.encode_utf16().collect();
        let class_name = PCWSTR(name.as_ptr());

        let h_module = WindowsApi::module_handle_w()?;
        let window_class = WNDCLASSW {
            hInstance: h_module.into(),
            lpszClassName: class_name,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(Self::window_proc),
            ..Default::default()
        };

        let _ = WindowsApi::register_class_w(&window_class)?;

        let instance = h_module.0 as isize;
        let hwnd = WindowsApi::create_hidden_window(PCWSTR(name.as_ptr()), instance)?;

        Ok(Self { hwnd })
    }

    pub extern "system" fn window_proc(
        window: HWND,
        message: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match message {
            // Sent on scaling-factor changes, resolution changes, and
            // monitor add/remove.
            WM_DISPLAYCHANGE => {
                refresher::on_trigger(Trigger::DisplayChanged);
                LRESULT(0)
            }
            WM_SETTINGCHANGE => {
                #[allow(clippy::cast_possible_truncation)]
                if wparam.0 as u32 == SPI_SETWORKAREA.0 {
                    refresher::on_trigger(Trigger::WorkAreaChanged);
                }
                LRESULT(0)
            }
            // Periodic safety-net refresh set up by `main` via `SetTimer`,
            // in case a topology change arrives without generating either
            // message above.
            WM_TIMER => {
                refresher::on_trigger(Trigger::PeriodicTick);
                LRESULT(0)
            }
            _ => unsafe { DefWindowProcW(window, message, wparam, lparam) },
        }
    }
}
