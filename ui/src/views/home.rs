use dioxus::prelude::*;

use crate::diary::DiaryView;

#[component]
pub fn Home() -> Element {
    // Subscribe to the global language code (if provided) so we re-render on change.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        div { style: "display:none", "{lang_marker}" }
        section { class: "page page-home",
            div { class: "page-home__hearts", aria_hidden: "true", "❤ ❤ ❤" }
            h1 { {crate::t!("home-title")} }
            p { {crate::t!("home-intro")} }
            DiaryView {}
            p { class: "page-home__hint", {crate::t!("home-hint")} }
        }
    }
}
