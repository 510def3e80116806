//! Gesture classifier tests: latching, settle limits and axis priority

use tilt_morse_keyer::config::GestureConfig;
use tilt_morse_keyer::gesture::GestureClassifier;
use tilt_morse_keyer::{ImuSample, Symbol};

fn level() -> ImuSample {
    ImuSample::accel(0.0, 0.0, 1.0)
}

#[test]
fn test_sustained_tilt_fires_once() {
    let mut classifier = GestureClassifier::default();
    let tilted = ImuSample::accel(1.0, 0.0, 1.0);

    let events: Vec<_> = (0..20).filter_map(|_| classifier.classify(&tilted)).collect();
    assert_eq!(events, [Symbol::Dot]);
}

#[test]
fn test_rearm_after_return_below_threshold() {
    let mut classifier = GestureClassifier::default();
    let tilted = ImuSample::accel(1.0, 0.0, 1.0);

    let mut events = Vec::new();
    for sample in [tilted, tilted, level(), tilted, tilted, level(), tilted] {
        events.extend(classifier.classify(&sample));
    }
    assert_eq!(events, [Symbol::Dot, Symbol::Dot, Symbol::Dot]);
}

#[test]
fn test_dash_on_vertical_push() {
    let mut classifier = GestureClassifier::default();
    assert_eq!(classifier.classify(&ImuSample::accel(0.0, 0.0, 1.6)), Some(Symbol::Dash));
    assert_eq!(classifier.classify(&ImuSample::accel(0.0, 0.0, 1.6)), None);
    assert_eq!(classifier.classify(&level()), None);
    assert_eq!(classifier.classify(&ImuSample::accel(0.0, 0.0, 1.6)), Some(Symbol::Dash));
}

#[test]
fn test_cross_axis_motion_blocks_trigger() {
    let mut classifier = GestureClassifier::default();

    // Forward tilt while also tipped sideways: not a clean dot
    assert_eq!(classifier.classify(&ImuSample::accel(1.0, 0.6, 1.0)), None);
    // Vertical push while tilted forward: neither axis is settled
    let mut classifier = GestureClassifier::default();
    assert_eq!(classifier.classify(&ImuSample::accel(0.6, 0.0, 1.6)), None);
    // Slight forward lean is within the dash settle band
    assert_eq!(classifier.classify(&ImuSample::accel(0.2, 0.0, 1.6)), Some(Symbol::Dash));
}

#[test]
fn test_one_symbol_at_a_time() {
    let mut classifier = GestureClassifier::default();

    assert_eq!(classifier.classify(&ImuSample::accel(1.0, 0.0, 1.0)), Some(Symbol::Dot));
    assert!(classifier.is_engaged());
    // Dash axis exceeds while dot is still latched: nothing
    assert_eq!(classifier.classify(&ImuSample::accel(0.0, 0.0, 1.6)), None);
}

#[test]
fn test_custom_thresholds() {
    let mut config = GestureConfig::default();
    config.dot.threshold = 0.8;
    let mut classifier = GestureClassifier::new(config);

    assert_eq!(classifier.classify(&ImuSample::accel(0.6, 0.0, 1.0)), None);
    assert_eq!(classifier.classify(&ImuSample::accel(0.9, 0.0, 1.0)), Some(Symbol::Dot));
}

#[test]
fn test_reset_clears_latches() {
    let mut classifier = GestureClassifier::default();
    let tilted = ImuSample::accel(1.0, 0.0, 1.0);

    assert_eq!(classifier.classify(&tilted), Some(Symbol::Dot));
    classifier.reset();
    assert!(!classifier.is_engaged());
    assert_eq!(classifier.classify(&tilted), Some(Symbol::Dot));
}
