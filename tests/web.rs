//! Browser-side checks of the JS facade. Run with `wasm-pack test --headless`.

#![cfg(target_arch = "wasm32")]

use force_diagram::ForceLayoutWasm;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn positions_are_reported_per_node() {
    let mut layout = ForceLayoutWasm::new();
    layout.add_node(0.0, 0.0, 40.0, 30.0);
    layout.add_node(100.0, 0.0, 40.0, 30.0);
    layout.simulate(1.0 / 60.0, 800.0, 600.0);

    assert_eq!(layout.get_positions().length(), 6);
}

#[wasm_bindgen_test]
fn unknown_ids_are_rejected() {
    let mut layout = ForceLayoutWasm::new();
    assert!(layout.add_link(1, 2).is_err());
    assert!(layout.set_setting(42, "constant", 1.0).is_err());
    assert!(layout.set_setting(0, "bogus", 1.0).is_err());
}

#[wasm_bindgen_test]
fn settings_and_events_cross_the_boundary() {
    let mut layout = ForceLayoutWasm::new();
    let settings = layout.get_settings().unwrap();
    assert!(js_sys::Array::is_array(&settings));
    assert_eq!(js_sys::Array::from(&settings).length(), 7);

    layout.set_tool(JsValue::from_str("createNode")).unwrap();
    layout.set_edit_mode(true);
    assert!(layout.handle_pointer_down(10.0, 10.0));
    assert!(layout.handle_pointer_up(10.0, 10.0));
    assert_eq!(layout.node_count(), 1);

    let events = js_sys::Array::from(&layout.drain_events().unwrap());
    assert_eq!(events.length(), 1);
}
