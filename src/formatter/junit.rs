//! JUnit XML output formatter.
//!
//! One `testsuite` per check type, one `testcase` per check result and one
//! `error` element per failure.

use std::collections::BTreeMap;

use crate::formatter::escape_xml;
use crate::result::{CheckResult, ResultList};

/// Format results as JUnit XML.
pub fn format(results: &ResultList) -> String {
    let mut output = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    output.push('\n');

    let total_tests = results.results.len();
    let total_errors: usize = results.results.iter().map(|r| r.failures.len()).sum();
    output.push_str(&format!(
        r#"<testsuites tests="{}" errors="{}">"#,
        total_tests, total_errors
    ));

    if results.results.is_empty() {
        output.push_str("</testsuites>\n");
        return output;
    }
    output.push('\n');

    let mut suites: BTreeMap<&str, Vec<&CheckResult>> = BTreeMap::new();
    for result in &results.results {
        suites.entry(result.check_type.as_str()).or_default().push(result);
    }

    for (check_type, cases) in suites {
        let errors: usize = cases.iter().map(|r| r.failures.len()).sum();
        output.push_str(&format!(
            r#"    <testsuite name="{}" tests="{}" errors="{}">"#,
            escape_xml(check_type),
            cases.len(),
            errors
        ));
        output.push('\n');

        for case in cases {
            let name = escape_xml(&case.name);
            output.push_str(&format!(
                r#"        <testcase name="{}" classname="{}">"#,
                name, name
            ));
            if case.failures.is_empty() {
                output.push_str("</testcase>\n");
                continue;
            }
            output.push('\n');
            for failure in &case.failures {
                output.push_str(&format!(
                    r#"            <error message="{}"></error>"#,
                    escape_xml(failure)
                ));
                output.push('\n');
            }
            output.push_str("        </testcase>\n");
        }

        output.push_str("    </testsuite>\n");
    }

    output.push_str("</testsuites>\n");
    output
}
