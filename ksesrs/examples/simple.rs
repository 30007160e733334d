use ksesrs::{sanitize, Policy, PolicyPreset, PolicySpec};

fn main() {
    println!("Testing ksesrs filtering...");

    let post_tests = [
        ("<b>ok</b><script>bad()</script>", "Script element"),
        ("<img src=x onerror=alert(1)>", "Event handler"),
        ("<a href=\"java&#115;cript:alert(1)\">x</a>", "Obfuscated scheme"),
        ("<p style=\"color:red;position:fixed\">x</p>", "Inline style"),
        ("Fish & chips > pie", "Plain text"),
    ];

    println!("\n=== Post policy ===");
    for (input, description) in &post_tests {
        let output = sanitize(input, PolicyPreset::Post, None, None);
        println!("{}: {} -> {}", description, input, output);
    }

    println!("\n=== No policy ===");
    let input = "<p>Hello <em>world</em></p>";
    println!("{} -> {}", input, sanitize(input, PolicySpec::None, None, None));

    println!("\n=== Custom policy ===");
    match Policy::from_json(r#"{"abbr": {"title": {"maxlen": 20}}}"#) {
        Ok(policy) => {
            let input = "<abbr title=\"HyperText Markup Language\">HTML</abbr> <b>!</b>";
            println!("{} -> {}", input, sanitize(input, policy, None, None));
        }
        Err(e) => println!("policy error: {}", e),
    }
}
