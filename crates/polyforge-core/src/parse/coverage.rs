//! Total coverage percentage from coverage-tool output.

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Find a total coverage percentage in `output`.
///
/// Recognised forms, tried in order:
/// - go: `coverage: 81.2% of statements` (averaged over packages)
/// - pytest-cov: `TOTAL  120  10  92%`
/// - tarpaulin: `81.25% coverage, 13/16 lines covered`
/// - jest/istanbul: `All files |   85.5 | ...`
/// - Cobertura XML: `line-rate="0.85"` on the root element
pub fn parse_coverage_percentage(output: &str) -> Option<f64> {
    let go: Vec<f64> = regex!(r"coverage: (\d+(?:\.\d+)?)% of statements")
        .captures_iter(output)
        .filter_map(|c| c[1].parse().ok())
        .collect();
    if !go.is_empty() {
        return Some(round2(go.iter().sum::<f64>() / go.len() as f64));
    }

    let patterns = [
        regex!(r"(?m)^TOTAL\s+.*?(\d+(?:\.\d+)?)%\s*$"),
        regex!(r"(\d+(?:\.\d+)?)% coverage"),
        regex!(r"(?m)^\s*All files\s*\|\s*(\d+(?:\.\d+)?)"),
    ];
    for re in patterns {
        if let Some(value) = re
            .captures_iter(output)
            .last()
            .and_then(|c| c[1].parse::<f64>().ok())
        {
            return Some(round2(value));
        }
    }

    regex!(r#"<coverage\b[^>]*?\bline-rate="(\d+(?:\.\d+)?)""#)
        .captures(output)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(|rate| round2(rate * 100.0))
}
