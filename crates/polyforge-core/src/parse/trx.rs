//! Visual Studio TRX result files written by `dotnet test --logger trx`.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::domain::{TestCase, TestResults, TestStatus};
use crate::error::{ForgeError, Result};
use crate::parse::junit::attributes;

fn outcome_status(outcome: &str) -> TestStatus {
    match outcome.to_ascii_lowercase().as_str() {
        "passed" | "passedbutrunaborted" => TestStatus::Passed,
        "failed" => TestStatus::Failed,
        "error" | "timeout" | "aborted" => TestStatus::Error,
        _ => TestStatus::Skipped,
    }
}

#[derive(Debug, Default)]
struct Counters {
    passed: u32,
    failed: u32,
    errored: u32,
    skipped: u32,
}

/// Parse a TRX document.
///
/// `ResultSummary/Counters` provides the counts (`notExecuted` maps to
/// skipped, `error`/`timeout`/`aborted` to errored); per-test details come
/// from `UnitTestResult` elements.
pub fn parse_trx(xml: &str) -> Result<TestResults> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root_seen = false;
    let mut counters: Option<Counters> = None;
    let mut cases: Vec<TestCase> = Vec::new();
    let mut current: Option<TestCase> = None;
    // Element whose text is being captured inside the current result.
    let mut capture: Option<&'static str> = None;
    let mut message = String::new();
    let mut stack_trace = String::new();

    loop {
        let event = reader.read_event()?;
        let (start, empty) = match &event {
            Event::Start(e) => (Some(e.clone()), false),
            Event::Empty(e) => (Some(e.clone()), true),
            _ => (None, false),
        };

        if let Some(e) = start {
            let name = e.local_name().as_ref().to_vec();
            if !root_seen {
                if name != b"TestRun" {
                    return Err(ForgeError::ResultParse(format!(
                        "unexpected TRX root element <{}>",
                        String::from_utf8_lossy(&name)
                    )));
                }
                root_seen = true;
            }
            match name.as_slice() {
                b"UnitTestResult" => {
                    let attrs = attributes(&e)?;
                    let mut case = TestCase::new(
                        attrs.get("testName").cloned().unwrap_or_else(|| "Unknown".into()),
                        outcome_status(attrs.get("outcome").map(String::as_str).unwrap_or("")),
                    );
                    if let Some(duration) = attrs.get("duration") {
                        case = case.with_duration(duration.clone());
                    }
                    if empty {
                        cases.push(case);
                    } else {
                        message.clear();
                        stack_trace.clear();
                        current = Some(case);
                    }
                }
                b"Message" if current.is_some() && !empty => capture = Some("message"),
                b"StackTrace" if current.is_some() && !empty => capture = Some("stack"),
                b"Counters" => {
                    let attrs = attributes(&e)?;
                    let get = |key: &str| -> u32 {
                        attrs
                            .get(key)
                            .and_then(|v| v.trim().parse().ok())
                            .unwrap_or(0)
                    };
                    counters = Some(Counters {
                        passed: get("passed"),
                        failed: get("failed"),
                        errored: get("error") + get("timeout") + get("aborted"),
                        skipped: get("notExecuted"),
                    });
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Text(t) => {
                let text = t.unescape()?;
                match capture {
                    Some("message") => message.push_str(&text),
                    Some("stack") => stack_trace.push_str(&text),
                    _ => {}
                }
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                match capture {
                    Some("message") => message.push_str(&text),
                    Some("stack") => stack_trace.push_str(&text),
                    _ => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"Message" | b"StackTrace" => capture = None,
                b"UnitTestResult" => {
                    if let Some(case) = current.take() {
                        cases.push(
                            case.with_message(message.trim())
                                .with_details(stack_trace.trim()),
                        );
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(ForgeError::ResultParse("empty TRX document".into()));
    }

    Ok(match counters {
        Some(c) => {
            let mut results = TestResults::from_counts(c.passed, c.failed, c.skipped, c.errored);
            results.cases = cases;
            results
        }
        None => TestResults::from_cases(cases),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRX: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<TestRun id="1" name="run" xmlns="http://microsoft.com/schemas/VisualStudio/TeamTest/2010">
  <Results>
    <UnitTestResult testName="Calc.Adds" outcome="Passed" duration="00:00:00.0120000" />
    <UnitTestResult testName="Calc.Divides" outcome="Failed" duration="00:00:00.0040000">
      <Output>
        <ErrorInfo>
          <Message>Assert.Equal() Failure: Expected 2, Actual 3</Message>
          <StackTrace>   at Calc.Tests.Divides() in /src/CalcTests.cs:line 21</StackTrace>
        </ErrorInfo>
      </Output>
    </UnitTestResult>
    <UnitTestResult testName="Calc.Later" outcome="NotExecuted" />
  </Results>
  <ResultSummary outcome="Failed">
    <Counters total="3" executed="2" passed="1" failed="1" error="0" timeout="0" aborted="0" inconclusive="0" notExecuted="1" />
  </ResultSummary>
</TestRun>"#;

    #[test]
    fn test_parse_trx_counters_and_cases() {
        let results = parse_trx(TRX).expect("parse");
        assert_eq!(results.total, 3);
        assert_eq!(results.passed, 1);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert_eq!(results.errored, 0);
        assert_eq!(results.cases.len(), 3);

        let failed = &results.cases[1];
        assert_eq!(failed.name, "Calc.Divides");
        assert_eq!(failed.status, TestStatus::Failed);
        assert_eq!(
            failed.message.as_deref(),
            Some("Assert.Equal() Failure: Expected 2, Actual 3")
        );
        assert!(failed
            .details
            .as_deref()
            .unwrap_or_default()
            .contains("CalcTests.cs:line 21"));
        assert_eq!(failed.duration.as_deref(), Some("00:00:00.0040000"));
    }

    #[test]
    fn test_parse_trx_without_counters() {
        let xml = r#"<TestRun><Results>
  <UnitTestResult testName="A" outcome="Passed"/>
  <UnitTestResult testName="B" outcome="Timeout"/>
</Results></TestRun>"#;
        let results = parse_trx(xml).expect("parse");
        assert_eq!(results.total, 2);
        assert_eq!(results.passed, 1);
        assert_eq!(results.errored, 1);
    }

    #[test]
    fn test_rejects_junit_document() {
        let err = parse_trx("<testsuites/>").unwrap_err();
        assert!(matches!(err, ForgeError::ResultParse(_)));
    }
}
