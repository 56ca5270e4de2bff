pub mod account;
pub mod app;
pub mod component;
pub mod error;
pub mod error_template;
pub mod logs;
pub mod manage;
pub mod navigator;

#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
