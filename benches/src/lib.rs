//! Shared inputs for the sanitize benchmarks.

/// A mix of hostile and benign fragments.
pub const MIXED_INPUTS: &[&str] = &[
    "<script>alert('xss')</script>",
    "<img src=x onerror=alert(1)>",
    "<a href=\"java&#115;cript:alert(1)\">x</a>",
    "<div style=\"color:red;width:expression(x)\">y</div>",
    "<!-- <b>note</b> -->",
    "Hello world & friends",
    "<p class=\"intro\">Safe <strong>content</strong></p>",
];

/// Repeats `base` until the result is at least `size` bytes long.
pub fn input_of_size(base: &str, size: usize) -> String {
    if base.is_empty() {
        return String::new();
    }
    base.repeat(size / base.len() + 1)
}
