use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Badge, span, "inline-flex items-center rounded-full border px-2 py-0.5 text-xs font-medium"}
}

#[allow(unused_imports)]
pub use components::*;
