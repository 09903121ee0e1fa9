#![forbid(unsafe_code)]

//! Property-based invariant tests for the chart viewport and box view.
//!
//! 1. A selection of exactly 5% of the span does not commit; 5.0001% does.
//! 2. Zoom in followed by zoom out restores the prior domain exactly.
//! 3. Zoom out with empty history widens 2x per call and sets the flag.
//! 4. The visible subset always lies inside the domain and within the data.
//! 5. Pixel and data coordinates invert each other.
//! 6. Every box key lands in exactly one section.
//! 7. Scenario: padded bounds of a known dataset.
//! 8. Repeated zooming never collapses or overflows the domain, and the
//!    history stays bounded.

use numer_core::{DisplaySpec, Fields, Value};
use numer_viz::{
    BoxView, Domain, Interval, MAX_HISTORY, PixelRect, Point, PrimaryItem, ViewportConfig,
    ViewportController, ViewportEffect, ViewportEvent, ViewportNoopReason, ViewportState,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Data spanning [0, 200]^2 with no padding, in a 200x200 px plot area.
fn exact_viewport() -> ViewportController {
    let config = ViewportConfig {
        padding_ratio: 0.0,
        ..ViewportConfig::default()
    };
    ViewportController::new(
        vec![Point::new(0.0, 0.0), Point::new(200.0, 200.0)],
        PixelRect::new(0.0, 0.0, 280.0, 280.0),
        config,
    )
}

fn points_strategy() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec(
        (-1e4f64..1e4, -1e4f64..1e4).prop_map(|(x, y)| Point::new(x, y)),
        0..40,
    )
}

fn event_strategy() -> impl Strategy<Value = ViewportEvent> {
    prop_oneof![
        (0.0f64..480.0, 0.0f64..320.0).prop_map(|(x, y)| ViewportEvent::PointerDown { x, y }),
        (0.0f64..480.0, 0.0f64..320.0).prop_map(|(x, y)| ViewportEvent::PointerMove { x, y }),
        Just(ViewportEvent::PointerUp),
        Just(ViewportEvent::PointerLeave),
        Just(ViewportEvent::ZoomIn),
        Just(ViewportEvent::ZoomOut),
        Just(ViewportEvent::Reset),
    ]
}

fn viewport(points: Vec<Point>) -> ViewportController {
    ViewportController::new(
        points,
        PixelRect::new(0.0, 0.0, 480.0, 320.0),
        ViewportConfig::default(),
    )
}

fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "{actual} != {expected}"
    );
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Commit boundary
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn exactly_five_percent_is_discarded() {
    let mut vp = exact_viewport();
    vp.pointer_down(60.0, 220.0);
    vp.pointer_move(70.0, 20.0);
    assert_eq!(
        vp.state(),
        ViewportState::Selecting {
            anchor: Point::new(0.0, 0.0),
            current: Point::new(10.0, 200.0),
        }
    );
    let t = vp.pointer_up();
    assert!(matches!(t.effect, ViewportEffect::Discarded { .. }));
    assert_eq!(vp.history_len(), 0);
}

#[test]
fn just_over_five_percent_commits() {
    let mut vp = exact_viewport();
    vp.pointer_down(60.0, 220.0);
    vp.pointer_move(70.0002, 20.0);
    let t = vp.pointer_up();
    assert!(matches!(t.effect, ViewportEffect::Committed { .. }));
    assert_eq!(vp.history_len(), 1);
    assert_close(vp.domain().x.max, 10.0002);
    assert_eq!(vp.domain().y, Interval::new(0.0, 200.0));
}

// ═════════════════════════════════════════════════════════════════════════
// 2-3. Zoom history
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zoom_in_then_out_restores(points in points_strategy(), depth in 1usize..5) {
        let mut vp = viewport(points);
        let mut domains = vec![vp.domain()];
        for _ in 0..depth {
            vp.zoom_in();
            domains.push(vp.domain());
        }
        domains.pop();
        while let Some(expected) = domains.pop() {
            vp.zoom_out();
            prop_assert_eq!(vp.domain(), expected);
        }
        prop_assert!(!vp.is_outer_zoom());
        prop_assert_eq!(vp.history_len(), 0);
    }

    #[test]
    fn zoom_out_without_history_doubles(points in points_strategy(), times in 1u32..4) {
        let mut vp = viewport(points);
        let home = vp.domain();
        for _ in 0..times {
            vp.zoom_out();
        }
        let factor = 2f64.powi(times as i32);
        prop_assert!(vp.is_outer_zoom());
        let x = vp.domain().x;
        prop_assert!((x.span() - home.x.span() * factor).abs() <= 1e-9 * home.x.span() * factor);
        prop_assert!((x.center() - home.x.center()).abs() <= 1e-9 * home.x.span().max(1.0) * factor);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Visible subset
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn visible_points_stay_inside_domain(
        points in points_strategy(),
        events in prop::collection::vec(event_strategy(), 0..30),
    ) {
        let mut vp = viewport(points.clone());
        for event in events {
            vp.apply_event(event);
            let domain = vp.domain();
            prop_assert!(domain.x.span() > 0.0 && domain.y.span() > 0.0);
            prop_assert!(vp.visible().iter().all(|p| domain.contains(*p)));
            let expected = points.iter().filter(|p| domain.contains(**p)).count();
            prop_assert_eq!(vp.visible().len(), expected);
        }
        prop_assert_eq!(vp.data(), points.as_slice());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Coordinate inversion
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pixel_mapping_round_trips(points in points_strategy(), px in 60.0f64..460.0, py in 20.0f64..260.0) {
        let vp = viewport(points);
        let p = vp.pixel_to_domain(px, py).expect("plot area");
        let (qx, qy) = vp.domain_to_pixel(p).expect("plot area");
        prop_assert!((qx - px).abs() < 1e-6);
        prop_assert!((qy - py).abs() < 1e-6);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Box sections
// ═════════════════════════════════════════════════════════════════════════

fn keyed_values(prefix: &'static str) -> impl Strategy<Value = Vec<(String, f64)>> {
    prop::collection::vec((0u8..8, -10.0f64..10.0), 0..8).prop_map(move |entries| {
        entries
            .into_iter()
            .map(|(k, v)| (format!("{prefix}{k}"), v))
            .collect()
    })
}

proptest! {
    #[test]
    fn box_keys_appear_once(
        ui in keyed_values("k"),
        raw in keyed_values("k"),
        main_picks in prop::collection::vec(0u8..8, 0..5),
    ) {
        let ui: Fields = ui.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
        let raw: Fields = raw.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
        let mut main: Vec<String> = Vec::new();
        for pick in main_picks {
            let key = format!("k{pick}");
            if !main.contains(&key) {
                main.push(key);
                main.push("=".to_owned());
            }
        }
        let display = DisplaySpec { main: main.clone(), ..DisplaySpec::default() };
        let view = BoxView::build(Some(&display), &Value::Record(raw.clone()), &ui);

        let primary: Vec<&str> = view
            .primary()
            .iter()
            .filter_map(|item| match item {
                PrimaryItem::Entry(entry) => Some(entry.key.as_str()),
                _ => None,
            })
            .collect();
        let expected_primary: Vec<&str> =
            main.iter().map(String::as_str).filter(|k| *k != "=").collect();
        prop_assert_eq!(primary, expected_primary);

        let mut all_keys: Vec<String> = ui.keys().map(str::to_owned).collect();
        for key in raw.keys() {
            if !all_keys.iter().any(|k| k == key) {
                all_keys.push(key.to_owned());
            }
        }
        for key in &all_keys {
            let in_secondary = view.secondary().iter().filter(|e| &e.key == key).count();
            let in_main = usize::from(main.contains(key));
            prop_assert_eq!(in_secondary + in_main, 1, "key {}", key);
        }
        for entry in view.secondary() {
            if let Some(value) = raw.get(&entry.key) {
                prop_assert_eq!(entry.value.as_ref(), Some(value));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Scenario
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn padded_bounds_of_known_dataset() {
    let vp = viewport(vec![
        Point::new(-1.0, 0.0),
        Point::new(4.0, 9.0),
        Point::new(11.0, 3.0),
    ]);
    let Domain { x, y } = vp.domain();
    assert_close(x.min, -1.6);
    assert_close(x.max, 11.6);
    assert_close(y.min, -0.45);
    assert_close(y.max, 9.45);
    assert_eq!(vp.visible().len(), 3);
}

#[test]
fn transitions_serialize_as_tagged_json() {
    let mut vp = exact_viewport();
    let t = vp.zoom_in();
    let json = serde_json::to_value(t).expect("serialize");
    assert_eq!(json["effect"]["effect"], "zoomed_in");
    assert_eq!(json["from"]["state"], "idle");
    assert_eq!(json["transition_id"], 1);
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Zoom limits
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zoom_in_never_collapses_domain(points in points_strategy(), times in 0usize..1500) {
        let mut vp = viewport(points);
        for _ in 0..times {
            let t = vp.zoom_in();
            let domain = vp.domain();
            prop_assert!(domain.x.span() > 0.0 && domain.y.span() > 0.0);
            prop_assert!(domain.is_resolvable());
            if let ViewportEffect::Noop { reason } = t.effect {
                prop_assert_eq!(reason, ViewportNoopReason::ZoomLimit);
            }
        }
        prop_assert!(vp.history_len() <= MAX_HISTORY);
    }

    #[test]
    fn zoom_out_never_overflows(points in points_strategy(), times in 0usize..1200) {
        let mut vp = viewport(points);
        for _ in 0..times {
            vp.zoom_out();
            prop_assert!(vp.domain().is_resolvable());
        }
    }
}
