use super::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn resolve_now_reports_a_throwing_resolver() {
    let throwing = js_sys::Function::new_no_args("throw new Error('resolver failed')");
    assert!(!resolve_now(&throwing));
}

#[wasm_bindgen_test]
fn resolve_now_settles_a_promise() {
    let mut resolved = None;
    let _promise = js_sys::Promise::new(&mut |resolve, _reject| {
        resolved = Some(resolve_now(&resolve));
    });
    assert_eq!(resolved, Some(true));
}
