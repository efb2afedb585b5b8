#![warn(clippy::all)]
#![allow(clippy::missing_errors_doc)]

use clap::Parser;
use clap::ValueEnum;
use color_eyre::Result;
use screenglide::carrier_window::CarrierWindow;
use screenglide::hook::Core;
use screenglide::windows_api::WindowsApi;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use windows::Win32::UI::WindowsAndMessaging::DispatchMessageW;
use windows::Win32::UI::WindowsAndMessaging::GetMessageW;
use windows::Win32::UI::WindowsAndMessaging::TranslateMessage;
use windows::Win32::UI::WindowsAndMessaging::MSG;

const REFRESH_TIMER_ID: usize = 1;
const REFRESH_TIMER_INTERVAL_MS: u32 = 30_000;

#[derive(Default, ValueEnum, Clone, Copy)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

#[derive(Parser)]
#[clap(author, about, version)]
struct Opts {
    /// Level of log output verbosity
    #[clap(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

/// Installs `color_eyre`, a dual stderr/rolling-file `tracing` subscriber,
/// and a panic hook that records panics as `tracing` events.
///
/// Unlike a headless window-manager daemon, this runs attached to a user's
/// session where stderr is worth keeping — so both a console layer and a
/// file layer are installed, not file-only.
fn setup(log_level: LogLevel) -> Result<WorkerGuard> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "1");
    }

    color_eyre::install()?;

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var(
            "RUST_LOG",
            match log_level {
                LogLevel::Error => "error",
                LogLevel::Warn => "warn",
                LogLevel::Info => "info",
                LogLevel::Debug => "debug",
                LogLevel::Trace => "trace",
            },
        );
    }

    let appender = tracing_appender::rolling::daily(std::env::temp_dir(), "screenglide.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish()
            .with(tracing_subscriber::fmt::Layer::default().with_writer(std::io::stderr))
            .with(
                tracing_subscriber::fmt::Layer::default()
                    .with_writer(non_blocking)
                    .with_ansi(false),
            ),
    )?;

    std::panic::set_hook(Box::new(|panic| {
        panic.location().map_or_else(
            || {
                tracing::error!(message = %panic);
            },
            |location| {
                tracing::error!(
                    message = %panic,
                    panic.file = location.file(),
                    panic.line = location.line(),
                    panic.column = location.column(),
                );
            },
        );
    }));

    Ok(guard)
}

#[tracing::instrument]
fn main() -> Result<()> {
    let opts: Opts = Opts::parse();

    // File logging worker guard has to have an assignment in the main fn to work.
    let _guard = setup(opts.log_level)?;

    // Must be called before the first monitor enumeration, or monitor rects
    // come back in logical rather than physical pixels on a scaled display.
    WindowsApi::set_process_dpi_awareness_context()?;

    let core = Core::bootstrap()?;
    tracing::info!(
        monitor_count = core.topology().snapshot().monitors().len(),
        "monitor topology established"
    );
    screenglide::install_core(core);

    let carrier = CarrierWindow::create()?;
    let hook = WindowsApi::set_windows_hook_ex(Some(screenglide::windows_callbacks::mouse_hook_proc))?;
    WindowsApi::set_timer(carrier.hwnd, REFRESH_TIMER_ID, REFRESH_TIMER_INTERVAL_MS);

    let dispatcher_thread_id = WindowsApi::current_thread_id();
    ctrlc::set_handler(move || {
        if let Err(error) = WindowsApi::post_quit_to_thread(dispatcher_thread_id) {
            tracing::error!(%error, "failed to post quit message to dispatcher thread");
        }
    })?;

    tracing::info!("entering dispatcher message loop");

    let mut msg = MSG::default();
    loop {
        let has_message = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if !has_message.as_bool() {
            break;
        }

        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    tracing::info!("received shutdown signal, tearing down");

    WindowsApi::kill_timer(carrier.hwnd, REFRESH_TIMER_ID)?;
    WindowsApi::unhook_windows_hook_ex(hook)?;
    screenglide::uninstall_core();

    Ok(())
}
