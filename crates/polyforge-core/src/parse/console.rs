//! Console output fallbacks, used when a test tool left no result file.

use crate::domain::{ResultSource, TestCase, TestResults, TestStatus};
use crate::language::Language;

/// Parse human-oriented test output for `language`.
///
/// When no summary line is recognised, the returned results have
/// `parsed_successfully == false` and a `parse_error` note.
pub fn parse_console(language: Language, stdout: &str, stderr: &str) -> TestResults {
    let combined = format!("{stdout}\n{stderr}");
    let parsed = match language {
        Language::Python => parse_pytest(&combined).or_else(|| parse_unittest(&combined)),
        Language::JavaScript | Language::TypeScript => {
            parse_jest(&combined).or_else(|| parse_mocha(&combined))
        }
        Language::CSharp => parse_dotnet(&combined),
        Language::Java => parse_maven(&combined).or_else(|| parse_gradle(&combined)),
        Language::Go => parse_go(&combined),
        Language::Rust => parse_cargo(&combined),
    };

    match parsed {
        Some(mut results) => {
            attach_failure_details(&mut results.cases, &combined);
            results.with_source(ResultSource::Console)
        }
        None => TestResults {
            source: ResultSource::Console,
            parse_error: Some(format!(
                "no recognizable {} test summary in output",
                language.display_name()
            )),
            ..TestResults::default()
        },
    }
}

fn capture_u32(re: &regex::Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Counts plus cases; counts win when both exist.
fn combine(counts: TestResults, cases: Vec<TestCase>) -> TestResults {
    TestResults { cases, ..counts }
}

// ---------------------------------------------------------------------------
// Python
// ---------------------------------------------------------------------------

fn parse_pytest(output: &str) -> Option<TestResults> {
    let banner = regex!(r"^=+ (.+?) =+$");
    let has_count =
        regex!(r"\d+ (?:passed|failed|skipped|errors?|xfailed|xpassed|deselected)|no tests ran");

    let summary = output
        .lines()
        .map(str::trim)
        .filter_map(|line| banner.captures(line))
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .filter(|s| has_count.is_match(s))
        .last()?;

    let passed = capture_u32(regex!(r"(\d+) passed"), summary).unwrap_or(0)
        + capture_u32(regex!(r"(\d+) xpassed"), summary).unwrap_or(0);
    let failed = capture_u32(regex!(r"(\d+) failed"), summary).unwrap_or(0);
    let skipped = capture_u32(regex!(r"(\d+) skipped"), summary).unwrap_or(0)
        + capture_u32(regex!(r"(\d+) xfailed"), summary).unwrap_or(0);
    let errored = capture_u32(regex!(r"(\d+) errors?\b"), summary).unwrap_or(0);

    let line_re =
        regex!(r"^(?P<name>\S+::\S+) (?P<status>PASSED|FAILED|SKIPPED|ERROR|XFAIL|XPASS)\b");
    let mut cases: Vec<TestCase> = Vec::new();
    for caps in output.lines().filter_map(|l| line_re.captures(l.trim())) {
        let name = &caps["name"];
        if cases.iter().any(|c| c.name == name) {
            continue;
        }
        let status = match &caps["status"] {
            "PASSED" | "XPASS" => TestStatus::Passed,
            "FAILED" => TestStatus::Failed,
            "ERROR" => TestStatus::Error,
            _ => TestStatus::Skipped,
        };
        cases.push(TestCase::new(name, status));
    }

    let mut results = combine(
        TestResults::from_counts(passed, failed, skipped, errored),
        cases,
    );
    results.execution_time_secs =
        capture_secs(regex!(r" in (\d+(?:\.\d+)?)s"), summary).unwrap_or(0.0);
    Some(results)
}

fn capture_secs(re: &regex::Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn parse_unittest(output: &str) -> Option<TestResults> {
    let ran = capture_u32(regex!(r"(?m)^Ran (\d+) tests? in"), output)?;
    let (failures, errors, skipped) = match regex!(r"(?m)^(?:FAILED|OK) \((.+)\)\s*$")
        .captures(output)
        .and_then(|c| c.get(1))
    {
        Some(details) => {
            let details = details.as_str();
            (
                capture_u32(regex!(r"failures=(\d+)"), details).unwrap_or(0),
                capture_u32(regex!(r"errors=(\d+)"), details).unwrap_or(0),
                capture_u32(regex!(r"skipped=(\d+)"), details).unwrap_or(0),
            )
        }
        None => (0, 0, 0),
    };
    let passed = ran
        .saturating_sub(failures)
        .saturating_sub(errors)
        .saturating_sub(skipped);
    Some(TestResults::from_counts(passed, failures, skipped, errors))
}

// ---------------------------------------------------------------------------
// JavaScript / TypeScript
// ---------------------------------------------------------------------------

fn js_cases(output: &str) -> Vec<TestCase> {
    let line_re = regex!(
        r"^(?P<mark>✓|✔|√|✕|✗|✖|×|○)\s+(?:skipped\s+)?(?P<name>.+?)(?:\s+\((?P<dur>\d+(?:\.\d+)?\s*m?s)\))?$"
    );
    output
        .lines()
        .filter_map(|l| line_re.captures(l.trim()))
        .map(|caps| {
            let status = match &caps["mark"] {
                "✓" | "✔" | "√" => TestStatus::Passed,
                "○" => TestStatus::Skipped,
                _ => TestStatus::Failed,
            };
            let case = TestCase::new(&caps["name"], status);
            match caps.name("dur") {
                Some(dur) => case.with_duration(dur.as_str()),
                None => case,
            }
        })
        .collect()
}

fn parse_jest(output: &str) -> Option<TestResults> {
    let line = output
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("Tests:"))
        .last()?;

    let passed = capture_u32(regex!(r"(\d+) passed"), line).unwrap_or(0);
    let failed = capture_u32(regex!(r"(\d+) failed"), line).unwrap_or(0);
    let skipped = capture_u32(regex!(r"(\d+) skipped"), line).unwrap_or(0)
        + capture_u32(regex!(r"(\d+) todo"), line).unwrap_or(0);

    let mut results = combine(
        TestResults::from_counts(passed, failed, skipped, 0),
        js_cases(output),
    );
    results.execution_time_secs =
        capture_secs(regex!(r"(?m)^Time:\s+(\d+(?:\.\d+)?)\s*s"), output).unwrap_or(0.0);
    Some(results)
}

fn parse_mocha(output: &str) -> Option<TestResults> {
    let passing = capture_u32(regex!(r"(\d+) passing"), output);
    let failing = capture_u32(regex!(r"(\d+) failing"), output);
    let pending = capture_u32(regex!(r"(\d+) pending"), output);
    if passing.is_none() && failing.is_none() && pending.is_none() {
        return None;
    }

    // mocha numbers its failures: "  1) suite name:"
    let mut cases = js_cases(output);
    let failure_re = regex!(r"^\d+\) (?P<name>.+?):?$");
    for caps in output.lines().filter_map(|l| failure_re.captures(l.trim())) {
        let name = &caps["name"];
        if !cases.iter().any(|c| c.name == name) {
            cases.push(TestCase::new(name, TestStatus::Failed));
        }
    }

    Some(combine(
        TestResults::from_counts(
            passing.unwrap_or(0),
            failing.unwrap_or(0),
            pending.unwrap_or(0),
            0,
        ),
        cases,
    ))
}

// ---------------------------------------------------------------------------
// .NET
// ---------------------------------------------------------------------------

fn parse_dotnet(output: &str) -> Option<TestResults> {
    let cases_re = regex!(r"^(?P<status>Passed|Failed|Skipped) (?P<name>\S.*?) \[(?P<dur>[^\]]+)\]$");
    let cases: Vec<TestCase> = output
        .lines()
        .filter_map(|l| cases_re.captures(l.trim()))
        .map(|caps| {
            let status = match &caps["status"] {
                "Passed" => TestStatus::Passed,
                "Failed" => TestStatus::Failed,
                _ => TestStatus::Skipped,
            };
            TestCase::new(&caps["name"], status).with_duration(&caps["dur"])
        })
        .collect();

    // One line per test assembly:
    // "Failed!  - Failed:     1, Passed:     2, Skipped:     0, Total:     3"
    let one_liner = regex!(
        r"(?:Passed|Failed)!\s+-\s+Failed:\s+(\d+),\s+Passed:\s+(\d+),\s+Skipped:\s+(\d+),\s+Total:\s+(\d+)"
    );
    let mut found = false;
    let (mut passed, mut failed, mut skipped) = (0u32, 0u32, 0u32);
    for caps in one_liner.captures_iter(output) {
        found = true;
        failed += caps[1].parse::<u32>().unwrap_or(0);
        passed += caps[2].parse::<u32>().unwrap_or(0);
        skipped += caps[3].parse::<u32>().unwrap_or(0);
    }
    if found {
        return Some(combine(
            TestResults::from_counts(passed, failed, skipped, 0),
            cases,
        ));
    }

    // Older block form:
    //   Total tests: 3
    //        Passed: 2
    //        Failed: 1
    let total = capture_u32(regex!(r"(?m)^\s*Total tests:\s*(\d+)"), output)?;
    let passed = capture_u32(regex!(r"(?m)^\s*Passed:\s*(\d+)\s*$"), output).unwrap_or(0);
    let failed = capture_u32(regex!(r"(?m)^\s*Failed:\s*(\d+)\s*$"), output).unwrap_or(0);
    let mut skipped = capture_u32(regex!(r"(?m)^\s*Skipped:\s*(\d+)\s*$"), output).unwrap_or(0);
    // Tests the runner counted but never reported individually.
    skipped += total.saturating_sub(passed + failed + skipped);

    Some(combine(
        TestResults::from_counts(passed, failed, skipped, 0),
        cases,
    ))
}

// ---------------------------------------------------------------------------
// Java
// ---------------------------------------------------------------------------

fn parse_maven(output: &str) -> Option<TestResults> {
    let summary_re =
        regex!(r"Tests run: (\d+), Failures: (\d+), Errors: (\d+), Skipped: (\d+)");

    // Per-class lines come first; the last line is the aggregate.
    let caps = summary_re.captures_iter(output).last()?;
    let total: u32 = caps[1].parse().unwrap_or(0);
    let failed: u32 = caps[2].parse().unwrap_or(0);
    let errored: u32 = caps[3].parse().unwrap_or(0);
    let skipped: u32 = caps[4].parse().unwrap_or(0);
    let passed = total
        .saturating_sub(failed)
        .saturating_sub(errored)
        .saturating_sub(skipped);

    let failure_re = regex!(
        r"^(?:\[ERROR\] )?(?P<name>[\w.$]+(?:\([\w.$]+\))?)\s+(?:--\s+)?Time elapsed: (?P<dur>[\d.,]+ s)\s+<<< (?P<status>FAILURE|ERROR)!"
    );
    let cases = output
        .lines()
        .filter_map(|l| failure_re.captures(l.trim()))
        .map(|caps| {
            let status = if &caps["status"] == "ERROR" {
                TestStatus::Error
            } else {
                TestStatus::Failed
            };
            let (name, class) = split_maven_name(&caps["name"]);
            TestCase::new(name, status)
                .with_class(class)
                .with_duration(&caps["dur"])
        })
        .collect();

    Some(combine(
        TestResults::from_counts(passed, failed, skipped, errored),
        cases,
    ))
}

/// `testAdd(com.example.AppTest)` or `com.example.AppTest.testAdd`.
fn split_maven_name(raw: &str) -> (String, String) {
    if let Some((method, rest)) = raw.split_once('(') {
        return (method.to_string(), rest.trim_end_matches(')').to_string());
    }
    match raw.rsplit_once('.') {
        Some((class, method)) => (method.to_string(), class.to_string()),
        None => (raw.to_string(), String::new()),
    }
}

fn parse_gradle(output: &str) -> Option<TestResults> {
    let caps = regex!(r"(\d+) tests? completed(?:, (\d+) failed)?(?:, (\d+) skipped)?")
        .captures(output)?;
    let total: u32 = caps[1].parse().unwrap_or(0);
    let failed: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let skipped: u32 = caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let passed = total.saturating_sub(failed).saturating_sub(skipped);

    let cases = output
        .lines()
        .filter_map(|l| regex!(r"^(?P<class>[\w.$]+) > (?P<name>.+?) FAILED$").captures(l.trim()))
        .map(|caps| TestCase::new(&caps["name"], TestStatus::Failed).with_class(&caps["class"]))
        .collect();

    Some(combine(
        TestResults::from_counts(passed, failed, skipped, 0),
        cases,
    ))
}

// ---------------------------------------------------------------------------
// Go
// ---------------------------------------------------------------------------

fn parse_go(output: &str) -> Option<TestResults> {
    let line_re = regex!(r"^--- (?P<status>PASS|FAIL|SKIP): (?P<name>\S+) \((?P<dur>[\d.]+s)\)");
    let cases: Vec<TestCase> = output
        .lines()
        .filter_map(|l| line_re.captures(l.trim()))
        .map(|caps| {
            let status = match &caps["status"] {
                "PASS" => TestStatus::Passed,
                "FAIL" => TestStatus::Failed,
                _ => TestStatus::Skipped,
            };
            TestCase::new(&caps["name"], status).with_duration(&caps["dur"])
        })
        .collect();

    if cases.is_empty() {
        return None;
    }
    Some(TestResults::from_cases(cases))
}

// ---------------------------------------------------------------------------
// Rust
// ---------------------------------------------------------------------------

fn parse_cargo(output: &str) -> Option<TestResults> {
    let line_re = regex!(r"^test (?P<name>.+?) \.\.\. (?P<status>ok|FAILED|ignored)");
    let cases: Vec<TestCase> = output
        .lines()
        .filter_map(|l| line_re.captures(l.trim()))
        .map(|caps| {
            let status = match &caps["status"] {
                "ok" => TestStatus::Passed,
                "FAILED" => TestStatus::Failed,
                _ => TestStatus::Skipped,
            };
            TestCase::new(&caps["name"], status)
        })
        .collect();

    // One summary per test binary (unit, each integration file, doc tests).
    let summary_re =
        regex!(r"test result: (?:ok|FAILED)\. (\d+) passed; (\d+) failed; (\d+) ignored");
    let mut found = false;
    let (mut passed, mut failed, mut ignored) = (0u32, 0u32, 0u32);
    for caps in summary_re.captures_iter(output) {
        found = true;
        passed += caps[1].parse::<u32>().unwrap_or(0);
        failed += caps[2].parse::<u32>().unwrap_or(0);
        ignored += caps[3].parse::<u32>().unwrap_or(0);
    }

    if found {
        return Some(combine(
            TestResults::from_counts(passed, failed, ignored, 0),
            cases,
        ));
    }
    if cases.is_empty() {
        return None;
    }
    Some(TestResults::from_cases(cases))
}

// ---------------------------------------------------------------------------
// Failure details
// ---------------------------------------------------------------------------

const DETAIL_LINE_LIMIT: usize = 20;

/// Fill `details` of failed cases from the output that follows them.
///
/// The block starts at a line that names the test and mentions a
/// failure (`fail`, `error`, `exception`, `panicked`) and continues over the
/// indented lines below it. A rust panic header keeps going until the next
/// blank line since its message is not indented.
pub fn attach_failure_details(cases: &mut [TestCase], output: &str) {
    let lines: Vec<&str> = output.lines().collect();

    for case in cases.iter_mut() {
        if !case.status.is_failure() || case.details.is_some() {
            continue;
        }

        // The status line often names the test too; keep looking until a
        // header actually has a block under it.
        let details = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| is_failure_header(line, &case.name))
            .map(|(start, _)| detail_block(&lines, start))
            .find(|block| !block.is_empty());

        if let Some(block) = details {
            case.details = Some(block.join("\n"));
        }
    }
}

fn is_failure_header(line: &str, name: &str) -> bool {
    if !line.contains(name) {
        return false;
    }
    let lower = line.to_ascii_lowercase();
    ["fail", "error", "exception", "panicked"]
        .iter()
        .any(|marker| lower.contains(marker))
}

fn detail_block<'a>(lines: &[&'a str], start: usize) -> Vec<&'a str> {
    let panic_block = lines[start].contains("panicked");
    lines[start + 1..]
        .iter()
        .take_while(|line| {
            if line.trim().is_empty() {
                return false;
            }
            panic_block || line.starts_with(' ') || line.starts_with('\t')
        })
        .take(DETAIL_LINE_LIMIT)
        .map(|line| line.trim_end())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pytest_summary_and_cases() {
        let out = "\
============================= test session starts ==============================
tests/test_calc.py::test_add PASSED                                      [ 33%]
tests/test_calc.py::test_div FAILED                                      [ 66%]
tests/test_calc.py::test_pow SKIPPED (not ready)                         [100%]
=================================== FAILURES ===================================
=========================== short test summary info ============================
FAILED tests/test_calc.py::test_div - ZeroDivisionError: division by zero
=================== 1 failed, 1 passed, 1 skipped in 0.12s ====================
";
        let results = parse_console(Language::Python, out, "");
        assert!(results.parsed_successfully);
        assert_eq!(results.source, ResultSource::Console);
        assert_eq!(results.total, 3);
        assert_eq!(results.passed, 1);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert_eq!(results.cases.len(), 3);
        assert_eq!(results.cases[1].status, TestStatus::Failed);
        assert!((results.execution_time_secs - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_pytest_errors() {
        let out = "========= 2 passed, 1 error in 0.30s =========\n";
        let results = parse_console(Language::Python, out, "");
        assert_eq!(results.errored, 1);
        assert_eq!(results.total, 3);
    }

    #[test]
    fn test_unittest_fallback() {
        let stderr = "\
..F.s
----------------------------------------------------------------------
Ran 5 tests in 0.004s

FAILED (failures=1, skipped=1)
";
        let results = parse_console(Language::Python, "", stderr);
        assert_eq!(results.total, 5);
        assert_eq!(results.passed, 3);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
    }

    #[test]
    fn test_jest_summary() {
        let out = "\
PASS src/sum.test.js
FAIL src/div.test.js
  ✓ adds numbers (3 ms)
  ✕ divides by zero (5 ms)
  ○ skipped later

Tests:       1 failed, 1 skipped, 1 passed, 3 total
Time:        1.234 s
";
        let results = parse_console(Language::JavaScript, out, "");
        assert_eq!(results.total, 3);
        assert_eq!(results.passed, 1);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert_eq!(results.cases.len(), 3);
        assert_eq!(results.cases[0].name, "adds numbers");
        assert_eq!(results.cases[0].duration.as_deref(), Some("3 ms"));
        assert_eq!(results.cases[2].name, "later");
        assert!((results.execution_time_secs - 1.234).abs() < 1e-9);
    }

    #[test]
    fn test_mocha_summary() {
        let out = "\
  Calculator
    ✔ adds
    1) divides


  1 passing (8ms)
  1 failing
  2 pending

  1) Calculator
       divides:
     AssertionError: expected 3 to equal 2
";
        let results = parse_console(Language::TypeScript, out, "");
        assert_eq!(results.passed, 1);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 2);
        assert_eq!(results.total, 4);
    }

    #[test]
    fn test_dotnet_one_liners_are_summed() {
        let out = "\
  Passed Calc.Adds [12 ms]
  Failed Calc.Divides [4 ms]
  Error Message:
   Assert.Equal() Failure
Failed!  - Failed:     1, Passed:     1, Skipped:     0, Total:     2, Duration: 45 ms - Calc.Tests.dll (net8.0)
Passed!  - Failed:     0, Passed:     3, Skipped:     1, Total:     4, Duration: 20 ms - Api.Tests.dll (net8.0)
";
        let results = parse_console(Language::CSharp, out, "");
        assert_eq!(results.total, 6);
        assert_eq!(results.passed, 4);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert_eq!(results.cases.len(), 2);
        assert_eq!(results.cases[1].duration.as_deref(), Some("4 ms"));
    }

    #[test]
    fn test_dotnet_block_form() {
        let out = "\
Test Run Failed.
Total tests: 4
     Passed: 2
     Failed: 1
";
        let results = parse_console(Language::CSharp, out, "");
        assert_eq!(results.total, 4);
        assert_eq!(results.passed, 2);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
    }

    #[test]
    fn test_maven_uses_last_aggregate_line() {
        let out = "\
[INFO] Running com.example.AppTest
[ERROR] Tests run: 3, Failures: 1, Errors: 0, Skipped: 0, Time elapsed: 0.05 s <<< FAILURE! -- in com.example.AppTest
[ERROR] com.example.AppTest.testDivide -- Time elapsed: 0.005 s <<< FAILURE!
org.opentest4j.AssertionFailedError: expected: <2> but was: <3>
[INFO] Running com.example.UtilTest
[INFO] Tests run: 2, Failures: 0, Errors: 0, Skipped: 1, Time elapsed: 0.01 s -- in com.example.UtilTest
[INFO]
[INFO] Results:
[ERROR] Tests run: 5, Failures: 1, Errors: 0, Skipped: 1
";
        let results = parse_console(Language::Java, out, "");
        assert_eq!(results.total, 5);
        assert_eq!(results.passed, 3);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert_eq!(results.cases.len(), 1);
        assert_eq!(results.cases[0].name, "testDivide");
        assert_eq!(results.cases[0].class_name.as_deref(), Some("com.example.AppTest"));
    }

    #[test]
    fn test_surefire_two_name_format() {
        let (name, class) = split_maven_name("testAdd(com.example.AppTest)");
        assert_eq!(name, "testAdd");
        assert_eq!(class, "com.example.AppTest");
    }

    #[test]
    fn test_gradle_fallback() {
        let out = "\
AppTest > divides() FAILED
    org.opentest4j.AssertionFailedError at AppTest.java:12

4 tests completed, 1 failed, 1 skipped
";
        let results = parse_console(Language::Java, out, "");
        assert_eq!(results.total, 4);
        assert_eq!(results.passed, 2);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert_eq!(results.cases[0].name, "divides()");
        assert!(results.cases[0]
            .details
            .as_deref()
            .unwrap_or_default()
            .contains("AppTest.java:12"));
    }

    #[test]
    fn test_go_console_lines() {
        let out = "\
=== RUN   TestAdd
--- PASS: TestAdd (0.00s)
=== RUN   TestDiv
    calc_test.go:14: expected 2, got 3
--- FAIL: TestDiv (0.01s)
    calc_test.go:14: expected 2, got 3
FAIL
";
        let results = parse_console(Language::Go, out, "");
        assert_eq!(results.total, 2);
        assert_eq!(results.passed, 1);
        assert_eq!(results.failed, 1);
        assert_eq!(
            results.cases[1].details.as_deref(),
            Some("    calc_test.go:14: expected 2, got 3")
        );
    }

    #[test]
    fn test_cargo_summaries_are_summed() {
        let out = "\
running 2 tests
test tests::adds ... ok
test tests::divides ... FAILED

failures:

---- tests::divides stdout ----
thread 'tests::divides' panicked at src/lib.rs:12:9:
assertion `left == right` failed
  left: 3
 right: 2

test result: FAILED. 1 passed; 1 failed; 0 ignored; 0 measured; 0 filtered out

running 1 test
test it_works ... ignored

test result: ok. 0 passed; 0 failed; 1 ignored; 0 measured; 0 filtered out
";
        let results = parse_console(Language::Rust, out, "");
        assert_eq!(results.total, 3);
        assert_eq!(results.passed, 1);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert_eq!(results.cases.len(), 3);

        let divides = &results.cases[1];
        let details = divides.details.as_deref().unwrap_or_default();
        assert!(details.contains("assertion `left == right` failed"));
        assert!(details.contains("right: 2"));
    }

    #[test]
    fn test_cargo_lines_without_summary() {
        let out = "test a ... ok\ntest b ... FAILED\n";
        let results = parse_console(Language::Rust, out, "");
        assert_eq!(results.total, 2);
        assert_eq!(results.failed, 1);
    }

    #[test]
    fn test_unrecognized_output() {
        let results = parse_console(Language::Go, "no tests here", "");
        assert!(!results.parsed_successfully);
        assert_eq!(results.total, 0);
        assert!(results.parse_error.is_some());
    }
}
