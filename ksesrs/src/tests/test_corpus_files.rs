#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Kses, PolicyPreset, PolicySpec};

#[derive(Debug)]
struct TestCase {
    name: String,
    policy: PolicySpec,
    input: String,
    expected: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Start,
    Name,
    Policy,
    Input,
    Expected,
}

fn parse_test_file(content: &str) -> Option<TestCase> {
    let mut section = Section::Start;
    let mut name = String::new();
    let mut policy = PolicySpec::Preset(PolicyPreset::Post);
    let mut input: Vec<&str> = Vec::new();
    let mut expected: Vec<&str> = Vec::new();

    for line in content.lines() {
        match line {
            "--TEST--" => section = Section::Name,
            "--POLICY--" => section = Section::Policy,
            "--INPUT--" => section = Section::Input,
            "--EXPECTED--" => section = Section::Expected,
            _ => match section {
                Section::Start => {}
                Section::Name => name.push_str(line.trim()),
                Section::Policy if !line.trim().is_empty() => {
                    policy = match line.trim() {
                        "none" => PolicySpec::None,
                        preset => PolicySpec::Preset(preset.parse().ok()?),
                    };
                }
                Section::Policy => {}
                Section::Input => input.push(line),
                Section::Expected => expected.push(line),
            },
        }
    }

    if section != Section::Expected {
        return None;
    }
    // Trailing blank lines separate sections and are not part of the text.
    while expected.last().is_some_and(|line| line.is_empty()) {
        expected.pop();
    }

    Some(TestCase {
        name,
        policy,
        input: input.join("\n"),
        expected: expected.join("\n"),
    })
}

fn run_single_test(file_path: &Path) -> Result<(), String> {
    let content = fs::read_to_string(file_path)
        .map_err(|e| format!("Failed to read file {:?}: {}", file_path, e))?;

    let test_case = parse_test_file(&content)
        .ok_or_else(|| format!("Failed to parse test file {:?}", file_path))?;

    let kses = Kses::new(test_case.policy.clone(), None, None);
    let actual = kses.filter(&test_case.input);
    if actual != test_case.expected {
        return Err(format!(
            "Test: {}\nInput: {:?}\nExpected: {:?}\nActual: {:?}",
            test_case.name, test_case.input, test_case.expected, actual
        ));
    }

    let again = kses.filter(&actual);
    if again != actual {
        return Err(format!(
            "Test: {}\nNot idempotent: {:?} -> {:?}",
            test_case.name, actual, again
        ));
    }

    Ok(())
}

fn corpus_files() -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data");
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", dir.display(), e))
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("test-kses-") && n.ends_with(".txt"))
        })
        .collect();
    files.sort();
    files
}

#[test]
fn test_all_corpus_files() {
    let files = corpus_files();
    assert!(!files.is_empty(), "no corpus files found");

    let failures: Vec<String> = files
        .iter()
        .filter_map(|file| {
            run_single_test(file)
                .err()
                .map(|e| format!("{}: {}", file.display(), e))
        })
        .collect();

    if !failures.is_empty() {
        for failure in &failures {
            println!("  {}", failure);
        }
        panic!("{} of {} corpus test(s) failed", failures.len(), files.len());
    }
}

#[test]
fn test_parse_test_file() {
    let case = parse_test_file("--TEST--\nname\n--POLICY--\nexcerpt\n--INPUT--\na\nb\n--EXPECTED--\nab\n\n")
        .unwrap();
    assert_eq!(case.name, "name");
    assert_eq!(case.policy, PolicySpec::Preset(PolicyPreset::Excerpt));
    assert_eq!(case.input, "a\nb");
    assert_eq!(case.expected, "ab");

    assert!(parse_test_file("--TEST--\nx\n--INPUT--\ny\n").is_none());
}
