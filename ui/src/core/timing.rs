//! Timer helpers shared by the diary's transition scheduling.

use std::time::Duration;

/// CSS custom property on the document element that overrides the flip time.
pub const FLIP_DURATION_PROPERTY: &str = "--diary-flip";

/// Suspend the current task for `ms` milliseconds.
#[cfg(target_arch = "wasm32")]
pub async fn sleep_ms(ms: u64) {
    let clamped = ms.min(u64::from(u32::MAX)) as u32;
    gloo_timers::future::TimeoutFuture::new(clamped).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Parse a CSS `<time>` value (`"800ms"`, `"0.8s"`) into milliseconds.
/// Bare numbers are read as milliseconds. Zero, negative and malformed values
/// yield `None`.
pub fn parse_css_duration(raw: &str) -> Option<Duration> {
    let value = raw.trim();
    let (number, scale) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 1.0)
    } else if let Some(secs) = value.strip_suffix('s') {
        (secs, 1000.0)
    } else {
        (value, 1.0)
    };

    let parsed: f64 = number.trim().parse().ok()?;
    let millis = parsed * scale;
    if !millis.is_finite() || millis <= 0.0 {
        return None;
    }
    Some(Duration::from_millis(millis.round() as u64))
}

/// Flip duration declared in the page stylesheet, if any.
#[cfg(target_arch = "wasm32")]
pub fn css_flip_duration() -> Option<Duration> {
    let window = web_sys::window()?;
    let root = window.document()?.document_element()?;
    let style = window.get_computed_style(&root).ok()??;
    let raw = style.get_property_value(FLIP_DURATION_PROPERTY).ok()?;
    parse_css_duration(&raw)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn css_flip_duration() -> Option<Duration> {
    None
}
