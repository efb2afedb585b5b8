use color_eyre::eyre::bail;
use color_eyre::Result;

use windows::core::Result as WindowsCrateResult;
use windows::core::PCWSTR;
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Foundation::HWND;
use windows::Win32::Foundation::LPARAM;
use windows::Win32::Foundation::POINT;
use windows::Win32::Foundation::WPARAM;
use windows::Win32::Graphics::Gdi::EnumDisplayMonitors;
use windows::Win32::Graphics::Gdi::GetMonitorInfoW;
use windows::Win32::Graphics::Gdi::MonitorFromPoint;
use windows::Win32::Graphics::Gdi::HMONITOR;
use windows::Win32::Graphics::Gdi::MONITORINFOEXW;
use windows::Win32::Graphics::Gdi::MONITOR_DEFAULTTONULL;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::HiDpi::SetProcessDpiAwarenessContext;
use windows::Win32::UI::HiDpi::DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2;
use windows::Win32::UI::WindowsAndMessaging::CreateWindowExW;
use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;
use windows::Win32::UI::WindowsAndMessaging::KillTimer;
use windows::Win32::UI::WindowsAndMessaging::PostThreadMessageW;
use windows::Win32::UI::WindowsAndMessaging::RegisterClassW;
use windows::Win32::UI::WindowsAndMessaging::SetCursorPos;
use windows::Win32::UI::WindowsAndMessaging::SetTimer;
use windows::Win32::UI::WindowsAndMessaging::SetWindowsHookExW;
use windows::Win32::UI::WindowsAndMessaging::UnhookWindowsHookEx;
use windows::Win32::UI::WindowsAndMessaging::CW_USEDEFAULT;
use windows::Win32::UI::WindowsAndMessaging::HHOOK;
use windows::Win32::UI::WindowsAndMessaging::HOOKPROC;
use windows::Win32::UI::WindowsAndMessaging::WH_MOUSE_LL;
use windows::Win32::UI::WindowsAndMessaging::WM_QUIT;
use windows::Win32::UI::WindowsAndMessaging::WNDCLASSW;
use windows::Win32::UI::WindowsAndMessaging::WS_DISABLED;
use windows::Win32::UI::WindowsAndMessaging::WS_EX_NOACTIVATE;

use crate::geometry::Rect;
use crate::topology::Monitor;
use crate::windows_callbacks;

macro_rules! as_ptr {
    ($value:expr) => {
        $value as *mut core::ffi::c_void
    };
}

pub(crate) use as_ptr;

pub trait ProcessWindowsCrateResult<T> {
    fn process(self) -> Result<T>;
}

impl<T> ProcessWindowsCrateResult<T> for WindowsCrateResult<T> {
    fn process(self) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(error.into()),
        }
    }
}

/// Thin, testable-by-omission wrapper over the Win32 calls this crate needs.
/// A zero-sized type carrying only associated functions, so call sites read
/// as `WindowsApi::thing()` rather than needing an instance anywhere.
pub struct WindowsApi;

impl WindowsApi {
    pub fn set_process_dpi_awareness_context() -> Result<()> {
        unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) }
            .process()
    }

    /// Enumerates every connected monitor via `EnumDisplayMonitors` and
    /// reads each one's geometry with `GetMonitorInfoW`. Deliberately does
    /// not depend on `win32-display-data`: the device name and rect it
    /// returns are all the Topology Model needs, and a plain GDI call avoids
    /// pulling in a git-sourced dependency for it.
    pub fn enumerate_monitors() -> Result<Vec<Monitor>> {
        let mut monitors: Vec<Monitor> = Vec::new();
        let state_ptr = std::ptr::addr_of_mut!(monitors) as isize;

        unsafe {
            EnumDisplayMonitors(
                None,
                None,
                Some(windows_callbacks::monitor_enum_proc),
                LPARAM(state_ptr),
            )
        }
        .ok()
        .process()?;

        Ok(monitors)
    }

    pub(crate) fn monitor_info_w(hmonitor: HMONITOR) -> Result<MONITORINFOEXW> {
        let mut info = MONITORINFOEXW::default();
        info.monitorInfo.cbSize = u32::try_from(std::mem::size_of::<MONITORINFOEXW>())?;
        unsafe { GetMonitorInfoW(hmonitor, &mut info.monitorInfo) }
            .ok()
            .process()?;
        Ok(info)
    }

    /// `MONITOR_DEFAULTTONULL` so a point that falls in a gap between
    /// non-tiling monitors reports `None` rather than snapping to the
    /// nearest one, matching the Hook Pipeline's "skip, don't guess" rule.
    #[must_use]
    pub fn monitor_from_point(point: (i32, i32)) -> Option<isize> {
        let handle = unsafe {
            MonitorFromPoint(POINT { x: point.0, y: point.1 }, MONITOR_DEFAULTTONULL)
        };
        if handle.is_invalid() {
            None
        } else {
            Some(handle.0 as isize)
        }
    }

    pub fn cursor_pos() -> Result<(i32, i32)> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }.process()?;
        Ok((point.x, point.y))
    }

    pub fn set_cursor_pos(point: (i32, i32)) -> Result<()> {
        unsafe { SetCursorPos(point.0, point.1) }.process()
    }

    pub fn module_handle_w() -> Result<HMODULE> {
        unsafe { GetModuleHandleW(None) }.process()
    }

    pub fn register_class_w(window_class: &WNDCLASSW) -> Result<u16> {
        let atom = unsafe { RegisterClassW(window_class) };
        if atom == 0 {
            bail!(std::io::Error::last_os_error());
        }
        Ok(atom)
    }

    pub fn create_hidden_window(name: PCWSTR, instance: isize) -> Result<isize> {
        unsafe {
            CreateWindowExW(
                WS_EX_NOACTIVATE,
                name,
                name,
                WS_DISABLED,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                None,
                None,
                Some(windows::Win32::Foundation::HINSTANCE(as_ptr!(instance))),
                None,
            )?
        }
        .process_hwnd()
    }

    pub fn set_windows_hook_ex(proc: HOOKPROC) -> Result<HHOOK> {
        unsafe { SetWindowsHookExW(WH_MOUSE_LL, proc, None, 0) }.process()
    }

    pub fn unhook_windows_hook_ex(hook: HHOOK) -> Result<()> {
        unsafe { UnhookWindowsHookEx(hook) }.process()
    }

    pub fn set_timer(hwnd: isize, id: usize, elapse_ms: u32) -> usize {
        unsafe { SetTimer(Some(HWND(as_ptr!(hwnd))), id, elapse_ms, None) }
    }

    pub fn kill_timer(hwnd: isize, id: usize) -> Result<()> {
        unsafe { KillTimer(Some(HWND(as_ptr!(hwnd))), id) }.process()
    }

    #[must_use]
    pub fn current_thread_id() -> u32 {
        unsafe { GetCurrentThreadId() }
    }

    /// Posts a quit message to the dispatcher thread's message queue from
    /// any other thread (the `ctrlc` signal handler runs on one).
    pub fn post_quit_to_thread(thread_id: u32) -> Result<()> {
        unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }.process()
    }
}

trait ProcessHwndResult {
    fn process_hwnd(self) -> Result<isize>;
}

impl ProcessHwndResult for HWND {
    fn process_hwnd(self) -> Result<isize> {
        if self.0.is_null() {
            bail!(std::io::Error::last_os_error());
        }
        Ok(self.0 as isize)
    }
}

impl From<MONITORINFOEXW> for Rect {
    fn from(info: MONITORINFOEXW) -> Self {
        let rect = info.monitorInfo.rcMonitor;
        Self::new(rect.left, rect.top, rect.right, rect.bottom)
    }
}
