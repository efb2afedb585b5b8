//! End-to-end exercise of the Hook Pipeline's decision procedure against
//! fabricated topologies and event sequences, standing in for the window
//! manager's own `tests/window_manager.rs`. No Win32 calls: everything here
//! drives `Core::decide`/`record_trace` directly, the same seam the real
//! `mouse_hook_proc` calls through.

use screenglide::geometry::Rect;
use screenglide::hook::{Core, Decision};
use screenglide::topology::{Monitor, TopologyModel};

fn monitor(handle: isize, rect: Rect, primary: bool, device_name: &str) -> Monitor {
    Monitor {
        handle,
        rect,
        primary,
        device_name: device_name.to_owned(),
    }
}

fn two_monitor_core(left: Rect, right: Rect) -> Core {
    let monitors = vec![
        monitor(1, left, true, r"\\.\DISPLAY1"),
        monitor(2, right, false, r"\\.\DISPLAY2"),
    ];
    Core::from_topology(TopologyModel::from_monitors(monitors))
}

#[test]
fn scenario_equal_height_horizontal_pair() {
    let mut core = two_monitor_core(
        Rect::new(0, 0, 1920, 1080),
        Rect::new(1920, 0, 3840, 1080),
    );

    core.record_trace(1, (1900, 864));
    let decision = core.decide(Some(2), (1940, 864));

    match decision {
        Decision::Remap { mapped, dest_monitor } => {
            assert_eq!(dest_monitor, 2);
            assert_eq!(mapped, (1921, 864));
        }
        other => panic!("expected a remap, got {other:?}"),
    }
}

#[test]
fn scenario_differing_heights_preserve_percentage() {
    let mut core = two_monitor_core(
        Rect::new(0, 0, 1920, 1080),
        Rect::new(1920, 0, 3840, 2160),
    );

    core.record_trace(1, (1900, 864));
    let decision = core.decide(Some(2), (1940, 864));

    match decision {
        Decision::Remap { mapped, dest_monitor } => {
            assert_eq!(dest_monitor, 2);
            assert_eq!(mapped, (1921, 1728));
        }
        other => panic!("expected a remap, got {other:?}"),
    }
}

#[test]
fn scenario_non_adjacent_monitors_pass_through() {
    // Shares an edge coordinate but has zero overlap along the vertical axis.
    let mut core = two_monitor_core(
        Rect::new(0, 0, 1920, 1080),
        Rect::new(1920, 1080, 3840, 2160),
    );

    core.record_trace(1, (1900, 1060));
    let decision = core.decide(Some(2), (1940, 1060));

    assert_eq!(
        decision,
        Decision::PassThrough {
            update_trace: Some((2, (1940, 1060)))
        }
    );
}

#[test]
fn scenario_motion_within_one_monitor_never_remaps() {
    let mut core = two_monitor_core(
        Rect::new(0, 0, 1920, 1080),
        Rect::new(1920, 0, 3840, 1080),
    );

    core.record_trace(1, (100, 100));
    let decision = core.decide(Some(1), (150, 150));

    assert_eq!(
        decision,
        Decision::PassThrough {
            update_trace: Some((1, (150, 150)))
        }
    );
}

#[test]
fn scenario_cursor_between_monitors_is_skipped_without_touching_trace() {
    let mut core = two_monitor_core(
        Rect::new(0, 0, 1920, 1080),
        Rect::new(1920, 0, 3840, 1080),
    );

    core.record_trace(1, (1900, 540));
    let decision = core.decide(None, (1919, 540));

    assert_eq!(decision, Decision::PassThrough { update_trace: None });
}

#[test]
fn sequence_of_remaps_converges_back_to_source() {
    let a = Rect::new(0, 0, 1920, 1080);
    let b = Rect::new(1920, 0, 3840, 1080);
    let mut core = two_monitor_core(a, b);

    core.record_trace(1, (1900, 900));
    let first = core.decide(Some(2), (1940, 900));
    let Decision::Remap { mapped, dest_monitor } = first else {
        panic!("expected first crossing to remap");
    };
    core.record_trace(dest_monitor, mapped);

    // Immediate crossing back at the same travel angle.
    let (mx, my) = mapped;
    let second = core.decide(Some(1), (mx - 40, my));
    match second {
        Decision::Remap { mapped: back, .. } => {
            assert!((back.1 - 900).abs() <= 1, "round trip drifted: {back:?}");
        }
        other => panic!("expected a remap back, got {other:?}"),
    }
}
