//! Integration tests for the control loop: poll → present → draw → alert.

use aqmonitor::app::events::AppEvent;
use aqmonitor::app::service::PollOutcome;
use aqmonitor::display::{Face, LabelColor};
use aqmonitor::error::SensorError;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::mock_hw::{FB_SIZE, Rig, fast_config};

/// Start the rig and run it through the 2 s warm-up on idle readings.
fn warmed_up() -> Rig {
    let mut rig = Rig::new(fast_config());
    rig.start(0);
    rig.run_secs(0, 1_000);
    rig
}

#[test]
fn high_reading_is_presented_as_alarm() {
    let mut rig = warmed_up();
    rig.sensor.push_reading(1200, 300);
    let out = rig.tick(2_000);

    assert!(matches!(out.poll, PollOutcome::Fresh(r) if r.co2_ppm == 1200 && r.voc_ppb == 300));
    let state = rig.service.display_state().expect("readings on screen");
    assert_eq!(state.primary_value.to_string(), "1.2");
    assert_eq!(state.face, Face::Frown);
    assert_eq!(state.co2_color, LabelColor::Red);
    assert_eq!(state.voc_color, LabelColor::Red);
}

#[test]
fn normal_reading_is_presented_as_good() {
    let mut rig = warmed_up();
    rig.sensor.push_reading(800, 100);
    rig.tick(2_000);

    let state = rig.service.display_state().expect("readings on screen");
    assert_eq!(state.primary_value.to_string(), "0.8");
    assert_eq!(state.face, Face::Smile);
    assert_eq!(state.co2_color, LabelColor::Green);
    assert_eq!(state.voc_color, LabelColor::Green);
}

#[test]
fn loading_screen_until_warmup_elapses() {
    let mut rig = Rig::new(fast_config());
    rig.start(0);

    let out = rig.tick(0);
    assert!(matches!(out.poll, PollOutcome::Untrusted(_)));
    assert!(out.redrawn);
    assert_eq!(rig.service.display_state(), None);
    assert_eq!(rig.service.next_delay_ms(), 50);

    // Spinner keeps moving between polls.
    for t in (50..1_000).step_by(50) {
        assert!(rig.tick(t).redrawn, "spinner frame at {t} ms");
    }

    rig.tick(1_000);
    rig.tick(2_000);
    assert!(rig.service.display_state().is_some());
    assert_eq!(rig.service.next_delay_ms(), 1_000);
}

#[test]
fn three_failed_polls_freeze_the_display() {
    let mut rig = warmed_up();
    rig.sensor.push_reading(900, 120);
    rig.tick(2_000);
    let shown = rig.service.display_state();
    let pixels = rig.fb.pixels.clone();

    for _ in 0..3 {
        rig.sensor.push_failure(SensorError::Communication);
    }
    for t in [3_000, 4_000, 5_000] {
        let out = rig.tick(t);
        assert_eq!(out.poll, PollOutcome::Failed(SensorError::Communication));
        assert!(!out.redrawn);
    }

    assert_eq!(rig.service.display_state(), shown);
    assert!(rig.fb.pixels == pixels, "panel must not change on failures");
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::SensorFault { .. })),
        3
    );
}

#[test]
fn reinitialised_sensor_is_not_trusted_until_warm() {
    let mut rig = warmed_up();
    rig.sensor.push_reading(1500, 400);
    assert!(rig.tick(2_000).alert);

    for _ in 0..5 {
        rig.sensor.push_failure(SensorError::Communication);
    }
    rig.run_secs(3_000, 7_000);
    assert!(rig.sink.events.contains(&AppEvent::SensorReinitialized));

    // Idle 400/0 straight after iaq_init must not clear the alarm.
    let out = rig.tick(8_000);
    assert!(matches!(out.poll, PollOutcome::Untrusted(_)));
    assert_eq!(
        rig.service.display_state().map(|s| (s.co2_ppm, s.voc_ppb)),
        Some((1500, 400))
    );
    assert!(out.alert);
    assert!(rig.sensor.alert);

    let out = rig.tick(9_000);
    assert!(matches!(out.poll, PollOutcome::Fresh(r) if r.co2_ppm == 400));
    assert!(!out.alert);
}

#[test]
fn implausible_reading_is_treated_as_failure() {
    let mut rig = warmed_up();
    rig.sensor.push_reading(800, 100);
    rig.tick(2_000);
    rig.sensor.push_reading(0, 100);

    let out = rig.tick(3_000);
    assert_eq!(
        out.poll,
        PollOutcome::Failed(SensorError::InvalidReading {
            co2_ppm: 0,
            voc_ppb: 100
        })
    );
    assert_eq!(rig.service.display_state().map(|s| s.co2_ppm), Some(800));
}

#[test]
fn unchanged_reading_is_not_redrawn() {
    let mut rig = warmed_up();
    rig.sensor.push_reading(800, 100);
    assert!(rig.tick(2_000).redrawn);

    rig.sensor.push_reading(800, 100);
    let calls = rig.fb.draw_calls;
    assert!(!rig.tick(3_000).redrawn);
    assert_eq!(rig.fb.draw_calls, calls);
}

#[test]
fn high_co2_inverts_the_screen() {
    let mut rig = warmed_up();
    let corner = (0, FB_SIZE - 1);

    rig.sensor.push_reading(800, 100);
    rig.tick(2_000);
    assert_eq!(rig.fb.pixel(corner.0, corner.1), Rgb565::BLACK);

    rig.sensor.push_reading(1500, 100);
    rig.tick(3_000);
    assert_eq!(rig.fb.pixel(corner.0, corner.1), Rgb565::WHITE);
}

#[test]
fn alert_led_tracks_either_threshold() {
    let mut rig = warmed_up();

    rig.sensor.push_reading(800, 260);
    assert!(rig.tick(2_000).alert);
    assert!(rig.sensor.alert);

    rig.sensor.push_reading(800, 100);
    assert!(!rig.tick(3_000).alert);
    assert!(!rig.sensor.alert);

    rig.sensor.push_reading(1000, 0);
    assert!(rig.tick(4_000).alert);

    let changes: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::AlertChanged(on) => Some(*on),
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![true, false, true]);
}
