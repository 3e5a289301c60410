//! `go test -json` event streams.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::{TestCase, TestResults, TestStatus};

/// One `test2json` event; only the fields used here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TestEvent {
    action: String,
    #[serde(default)]
    package: Option<String>,
    #[serde(default)]
    test: Option<String>,
    #[serde(default)]
    elapsed: Option<f64>,
    #[serde(default)]
    output: Option<String>,
}

#[derive(Debug)]
struct Tracked {
    package: String,
    name: String,
    status: Option<TestStatus>,
    elapsed: Option<f64>,
    output: String,
}

/// Parse newline-delimited events (or a JSON array of events).
///
/// The last terminal action (`pass`, `fail`, `skip`) per package and test
/// wins; package-level events without a `Test` are ignored. Returns `None`
/// when no test reached a terminal action.
pub fn parse_go_test_json(text: &str) -> Option<TestResults> {
    let events = decode_events(text);

    let mut order: Vec<(String, String)> = Vec::new();
    let mut tracked: HashMap<(String, String), Tracked> = HashMap::new();
    let mut package_elapsed: HashMap<String, f64> = HashMap::new();

    for event in events {
        let package = event.package.clone().unwrap_or_default();
        let Some(test) = event.test.clone() else {
            if matches!(event.action.as_str(), "pass" | "fail") {
                if let Some(elapsed) = event.elapsed {
                    package_elapsed.insert(package, elapsed);
                }
            }
            continue;
        };

        let key = (package.clone(), test.clone());
        let entry = tracked.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Tracked {
                package,
                name: test,
                status: None,
                elapsed: None,
                output: String::new(),
            }
        });

        match event.action.as_str() {
            "pass" => entry.status = Some(TestStatus::Passed),
            "fail" => entry.status = Some(TestStatus::Failed),
            "skip" => entry.status = Some(TestStatus::Skipped),
            "output" => {
                if let Some(output) = &event.output {
                    entry.output.push_str(output);
                }
                continue;
            }
            _ => continue,
        }
        entry.elapsed = event.elapsed.or(entry.elapsed);
    }

    let cases: Vec<TestCase> = order
        .iter()
        .filter_map(|key| tracked.remove(key))
        .filter_map(|t| {
            let status = t.status?;
            let mut case = TestCase::new(t.name, status).with_class(t.package);
            if let Some(elapsed) = t.elapsed {
                case = case.with_duration(format!("{elapsed:.2}s"));
            }
            if status.is_failure() {
                case = case.with_details(failure_output(&t.output));
            }
            Some(case)
        })
        .collect();

    if cases.is_empty() {
        return None;
    }

    let mut results = TestResults::from_cases(cases);
    results.execution_time_secs = package_elapsed.values().sum();
    Some(results)
}

fn decode_events(text: &str) -> Vec<TestEvent> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        if let Ok(events) = serde_json::from_str::<Vec<TestEvent>>(trimmed) {
            return events;
        }
    }
    // Non-JSON lines (build output interleaved on stdout) are skipped.
    text.lines()
        .filter(|line| line.trim_start().starts_with('{'))
        .filter_map(|line| serde_json::from_str::<TestEvent>(line).ok())
        .collect()
}

/// Output of a failed test without go's own `=== RUN` / `--- FAIL` framing.
fn failure_output(output: &str) -> String {
    output
        .lines()
        .filter(|line| {
            let t = line.trim_start();
            !(t.starts_with("=== RUN")
                || t.starts_with("=== PAUSE")
                || t.starts_with("=== CONT")
                || t.starts_with("--- FAIL"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &str = r#"{"Time":"2024-01-01T00:00:00Z","Action":"start","Package":"example.com/calc"}
{"Action":"run","Package":"example.com/calc","Test":"TestAdd"}
{"Action":"output","Package":"example.com/calc","Test":"TestAdd","Output":"=== RUN   TestAdd\n"}
{"Action":"pass","Package":"example.com/calc","Test":"TestAdd","Elapsed":0.01}
{"Action":"run","Package":"example.com/calc","Test":"TestDiv"}
{"Action":"output","Package":"example.com/calc","Test":"TestDiv","Output":"=== RUN   TestDiv\n"}
{"Action":"output","Package":"example.com/calc","Test":"TestDiv","Output":"    calc_test.go:14: expected 2, got 3\n"}
{"Action":"output","Package":"example.com/calc","Test":"TestDiv","Output":"--- FAIL: TestDiv (0.00s)\n"}
{"Action":"fail","Package":"example.com/calc","Test":"TestDiv","Elapsed":0}
{"Action":"run","Package":"example.com/calc","Test":"TestLater"}
{"Action":"skip","Package":"example.com/calc","Test":"TestLater","Elapsed":0}
{"Action":"output","Package":"example.com/calc","Output":"FAIL\n"}
{"Action":"fail","Package":"example.com/calc","Elapsed":0.42}
"#;

    #[test]
    fn test_parse_ndjson_stream() {
        let results = parse_go_test_json(STREAM).expect("events");
        assert_eq!(results.total, 3);
        assert_eq!(results.passed, 1);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert!((results.execution_time_secs - 0.42).abs() < 1e-9);

        let div = &results.cases[1];
        assert_eq!(div.name, "TestDiv");
        assert_eq!(div.class_name.as_deref(), Some("example.com/calc"));
        let details = div.details.as_deref().unwrap_or_default();
        assert!(details.contains("expected 2, got 3"));
        assert!(!details.contains("=== RUN"));
    }

    #[test]
    fn test_last_terminal_action_wins() {
        let stream = r#"{"Action":"fail","Package":"p","Test":"TestFlaky"}
{"Action":"pass","Package":"p","Test":"TestFlaky"}
"#;
        let results = parse_go_test_json(stream).expect("events");
        assert_eq!(results.total, 1);
        assert_eq!(results.passed, 1);
    }

    #[test]
    fn test_same_test_name_in_two_packages() {
        let stream = r#"{"Action":"pass","Package":"a","Test":"TestX"}
{"Action":"fail","Package":"b","Test":"TestX"}
"#;
        let results = parse_go_test_json(stream).expect("events");
        assert_eq!(results.total, 2);
        assert_eq!(results.failed, 1);
    }

    #[test]
    fn test_json_array_form() {
        let array = r#"[{"Action":"pass","Package":"p","Test":"TestA"},{"Action":"skip","Package":"p","Test":"TestB"}]"#;
        let results = parse_go_test_json(array).expect("events");
        assert_eq!(results.total, 2);
        assert_eq!(results.skipped, 1);
    }

    #[test]
    fn test_no_test_events() {
        assert!(parse_go_test_json("ok  \texample.com/calc\t0.01s\n").is_none());
        assert!(parse_go_test_json(r#"{"Action":"pass","Package":"p"}"#).is_none());
    }
}
