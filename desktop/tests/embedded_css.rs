#![cfg(test)]
//! The desktop build inlines `ui/assets/theme/main.css`; a truncated or moved
//! theme would only show up at runtime, so check it here.

const EMBEDDED_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

#[test]
fn embedded_css_file_exists_and_is_not_empty() {
    assert!(
        !EMBEDDED_CSS.trim().is_empty(),
        "Embedded theme is empty; check the include_str! path in desktop/src/main.rs"
    );
}

#[test]
fn flip_duration_property_is_declared() {
    // The viewer times its flip from this property, falling back to config.
    let declaration = EMBEDDED_CSS
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("--diary-flip:"))
        .expect("--diary-flip missing from :root");
    let value = declaration
        .trim_start_matches("--diary-flip:")
        .trim()
        .trim_end_matches(';');
    assert!(
        value.ends_with("ms") || value.ends_with('s'),
        "--diary-flip should be a CSS time, got `{value}`"
    );
}
