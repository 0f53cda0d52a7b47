use dioxus::prelude::*;

use crate::diary::DiaryView;

#[component]
pub fn Diary() -> Element {
    // Keep a reactive dependency on the global language signal so the page
    // re-renders when the locale changes while it is open.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        div { style: "display:none", "{lang_marker}" }
        section { class: "page page-diary",
            h1 { {crate::t!("page-diary-title")} }
            p { {crate::t!("page-diary-intro")} }
            DiaryView { open_on_mount: true }
        }
    }
}
