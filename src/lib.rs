mod api;
mod app;
mod components;
mod form;
mod models;
mod pages;
mod payload;
mod preview;
mod schema;
mod state;
mod storage;
mod store;
mod util;

use crate::app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::storage::{
        clear_token_from_storage, load_token_from_storage, save_token_to_storage,
    };
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_token_storage_roundtrip() {
        clear_token_from_storage();
        assert!(load_token_from_storage().is_none());

        save_token_to_storage("t1");
        assert_eq!(load_token_from_storage().as_deref(), Some("t1"));

        clear_token_from_storage();
        assert!(load_token_from_storage().is_none());
    }

    #[wasm_bindgen_test]
    fn test_config_defaults_without_window_env() {
        let cfg = crate::api::ApiConfig::from_environment();
        assert!(!cfg.api_base.is_empty());
        assert!(!cfg.asset_base.is_empty());
    }
}
