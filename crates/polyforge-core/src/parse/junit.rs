//! JUnit XML result files (surefire, pytest `--junitxml`, jest-junit).

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::domain::{TestCase, TestResults, TestStatus};
use crate::error::{ForgeError, Result};

/// Count attributes of one `<testsuite>`.
#[derive(Debug, Default)]
struct SuiteCounts {
    tests: Option<u32>,
    failures: u32,
    errors: u32,
    skipped: u32,
    time: f64,
    has_child_suites: bool,
}

#[derive(Debug)]
struct OpenCase {
    case: TestCase,
    /// Element currently collecting text (`failure`, `error`, `skipped`).
    collecting: bool,
    details: String,
}

pub(crate) fn attributes(e: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn count(attrs: &HashMap<String, String>, key: &str) -> u32 {
    attrs
        .get(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|v| v.max(0.0) as u32)
        .unwrap_or(0)
}

/// Parse a JUnit XML document.
///
/// Counts come from the `tests/failures/errors/skipped` attributes of the
/// innermost suites; when no suite carries a `tests` attribute they are
/// derived from the collected test cases instead.
pub fn parse_junit(xml: &str) -> Result<TestResults> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root_seen = false;
    let mut suites: Vec<SuiteCounts> = Vec::new();
    let mut open_suites: Vec<usize> = Vec::new();
    let mut cases: Vec<TestCase> = Vec::new();
    let mut current: Option<OpenCase> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if !root_seen {
                    check_root(&name)?;
                    root_seen = true;
                }
                match name.as_slice() {
                    b"testsuite" => {
                        if let Some(&parent) = open_suites.last() {
                            suites[parent].has_child_suites = true;
                        }
                        suites.push(suite_counts(&attributes(&e)?));
                        open_suites.push(suites.len() - 1);
                    }
                    b"testcase" => current = Some(open_case(&attributes(&e)?)),
                    b"failure" | b"error" | b"skipped" => {
                        if let Some(open) = current.as_mut() {
                            apply_outcome(open, &name, &attributes(&e)?);
                            open.collecting = true;
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let name = e.local_name().as_ref().to_vec();
                if !root_seen {
                    check_root(&name)?;
                    root_seen = true;
                }
                match name.as_slice() {
                    b"testsuite" => {
                        if let Some(&parent) = open_suites.last() {
                            suites[parent].has_child_suites = true;
                        }
                        suites.push(suite_counts(&attributes(&e)?));
                    }
                    b"testcase" => cases.push(open_case(&attributes(&e)?).case),
                    b"failure" | b"error" | b"skipped" => {
                        if let Some(open) = current.as_mut() {
                            apply_outcome(open, &name, &attributes(&e)?);
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                if let Some(open) = current.as_mut().filter(|o| o.collecting) {
                    open.details.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(open) = current.as_mut().filter(|o| o.collecting) {
                    open.details
                        .push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"testsuite" => {
                    open_suites.pop();
                }
                b"testcase" => {
                    if let Some(open) = current.take() {
                        cases.push(open.case.with_details(open.details.trim()));
                    }
                }
                b"failure" | b"error" | b"skipped" => {
                    if let Some(open) = current.as_mut() {
                        open.collecting = false;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(ForgeError::ResultParse("empty JUnit document".into()));
    }

    let leaves: Vec<&SuiteCounts> = suites.iter().filter(|s| !s.has_child_suites).collect();
    let has_counts = leaves.iter().any(|s| s.tests.is_some());

    let mut results = if has_counts {
        let (mut tests, mut failed, mut errored, mut skipped) = (0u32, 0u32, 0u32, 0u32);
        for suite in &leaves {
            tests = tests.saturating_add(suite.tests.unwrap_or(0));
            failed = failed.saturating_add(suite.failures);
            errored = errored.saturating_add(suite.errors);
            skipped = skipped.saturating_add(suite.skipped);
        }
        let passed = tests
            .saturating_sub(failed)
            .saturating_sub(errored)
            .saturating_sub(skipped);
        let mut results = TestResults::from_counts(passed, failed, skipped, errored);
        results.cases = cases;
        results
    } else {
        TestResults::from_cases(cases)
    };

    results.execution_time_secs = leaves.iter().map(|s| s.time).sum();
    Ok(results)
}

fn check_root(name: &[u8]) -> Result<()> {
    match name {
        b"testsuites" | b"testsuite" => Ok(()),
        other => Err(ForgeError::ResultParse(format!(
            "unexpected JUnit root element <{}>",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn suite_counts(attrs: &HashMap<String, String>) -> SuiteCounts {
    SuiteCounts {
        tests: attrs.get("tests").map(|_| count(attrs, "tests")),
        failures: count(attrs, "failures"),
        errors: count(attrs, "errors"),
        // jest-junit and older surefire write `disabled` instead
        skipped: count(attrs, "skipped").max(count(attrs, "disabled")),
        time: attrs
            .get("time")
            .and_then(|t| t.trim().parse().ok())
            .unwrap_or(0.0),
        has_child_suites: false,
    }
}

fn open_case(attrs: &HashMap<String, String>) -> OpenCase {
    let name = attrs.get("name").cloned().unwrap_or_else(|| "Unknown".into());
    let mut case = TestCase::new(name, TestStatus::Passed)
        .with_class(attrs.get("classname").cloned().unwrap_or_default());
    if let Some(time) = attrs.get("time") {
        case = case.with_duration(format!("{time}s"));
    }
    OpenCase {
        case,
        collecting: false,
        details: String::new(),
    }
}

fn apply_outcome(open: &mut OpenCase, element: &[u8], attrs: &HashMap<String, String>) {
    let status = match element {
        b"failure" => TestStatus::Failed,
        b"error" => TestStatus::Error,
        _ => TestStatus::Skipped,
    };
    // A failure outranks a skip marker on the same case.
    if open.case.status == TestStatus::Passed || status.is_failure() {
        open.case.status = status;
    }
    if let Some(message) = attrs.get("message") {
        if open.case.message.is_none() {
            open.case.message = Some(message.clone()).filter(|m| !m.is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYTEST_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<testsuites>
  <testsuite name="pytest" errors="0" failures="1" skipped="1" tests="4" time="0.25">
    <testcase classname="tests.test_calc" name="test_add" time="0.001"/>
    <testcase classname="tests.test_calc" name="test_sub" time="0.001"/>
    <testcase classname="tests.test_calc" name="test_div" time="0.002">
      <failure message="ZeroDivisionError: division by zero">def test_div():
&gt;       assert div(1, 0) == 0
E       ZeroDivisionError: division by zero</failure>
    </testcase>
    <testcase classname="tests.test_calc" name="test_pow" time="0.000">
      <skipped type="pytest.skip" message="not ready">skipped</skipped>
    </testcase>
  </testsuite>
</testsuites>"#;

    #[test]
    fn test_parse_pytest_junit() {
        let results = parse_junit(PYTEST_XML).expect("parse");
        assert_eq!(results.total, 4);
        assert_eq!(results.passed, 2);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert_eq!(results.errored, 0);
        assert_eq!(results.cases.len(), 4);
        assert!((results.execution_time_secs - 0.25).abs() < f64::EPSILON);

        let failed: Vec<_> = results.failed_cases().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "test_div");
        assert_eq!(failed[0].class_name.as_deref(), Some("tests.test_calc"));
        assert_eq!(
            failed[0].message.as_deref(),
            Some("ZeroDivisionError: division by zero")
        );
        assert!(failed[0]
            .details
            .as_deref()
            .unwrap_or_default()
            .contains("> "));
        assert_eq!(results.cases[3].status, TestStatus::Skipped);
    }

    #[test]
    fn test_single_testsuite_root_with_cdata_error() {
        let xml = r#"<testsuite name="com.example.AppTest" tests="2" failures="0" errors="1" skipped="0">
  <testcase name="testOk" classname="com.example.AppTest" time="0.01"/>
  <testcase name="testBoom" classname="com.example.AppTest" time="0.02">
    <error message="boom" type="java.lang.IllegalStateException"><![CDATA[java.lang.IllegalStateException: boom
	at com.example.App.run(App.java:10)]]></error>
  </testcase>
</testsuite>"#;
        let results = parse_junit(xml).expect("parse");
        assert_eq!(results.total, 2);
        assert_eq!(results.passed, 1);
        assert_eq!(results.errored, 1);
        let boom = &results.cases[1];
        assert_eq!(boom.status, TestStatus::Error);
        assert!(boom.details.as_deref().unwrap_or_default().contains("App.java:10"));
    }

    #[test]
    fn test_nested_suites_count_leaves_only() {
        let xml = r#"<testsuites tests="5" failures="1">
  <testsuite name="outer" tests="5" failures="1">
    <testsuite name="a" tests="3" failures="1"/>
    <testsuite name="b" tests="2" failures="0"/>
  </testsuite>
</testsuites>"#;
        let results = parse_junit(xml).expect("parse");
        assert_eq!(results.total, 5);
        assert_eq!(results.failed, 1);
        assert_eq!(results.passed, 4);
    }

    #[test]
    fn test_counts_derived_from_cases_without_attributes() {
        let xml = r#"<testsuites><testsuite name="jest">
  <testcase name="adds" classname="math"/>
  <testcase name="fails" classname="math"><failure>expected 2</failure></testcase>
</testsuite></testsuites>"#;
        let results = parse_junit(xml).expect("parse");
        assert_eq!(results.total, 2);
        assert_eq!(results.passed, 1);
        assert_eq!(results.failed, 1);
        assert_eq!(results.cases[1].details.as_deref(), Some("expected 2"));
    }

    #[test]
    fn test_inconsistent_counts_saturate() {
        let xml = r#"<testsuite tests="1" failures="2" errors="0" skipped="0"/>"#;
        let results = parse_junit(xml).expect("parse");
        assert_eq!(results.passed, 0);
        assert_eq!(results.failed, 2);
        assert_eq!(
            results.total,
            results.passed + results.failed + results.skipped + results.errored
        );

        let huge = r#"<testsuites><testsuite name="a" tests="4000000000"/><testsuite name="b" tests="4000000000"/></testsuites>"#;
        let results = parse_junit(huge).expect("parse");
        assert_eq!(results.total, u32::MAX);
        assert_eq!(results.passed, u32::MAX);
    }

    #[test]
    fn test_rejects_non_junit_root() {
        let err = parse_junit("<coverage line-rate=\"0.5\"/>").unwrap_err();
        assert!(matches!(err, ForgeError::ResultParse(_)));
    }

    #[test]
    fn test_rejects_empty_document() {
        assert!(parse_junit("").is_err());
    }
}
