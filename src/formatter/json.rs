//! JSON output formatter.

use crate::result::ResultList;

/// Format the result list as pretty-printed JSON.
pub fn format(results: &ResultList) -> String {
    serde_json::to_string_pretty(results).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Breach, CheckResult};
    use crate::types::{CheckType, Severity};

    #[test]
    fn test_json_format() {
        let mut result = CheckResult::new("interval", CheckType::new("yaml"), Severity::High);
        let mut breach = Breach::key_value("data", "check.interval_days", "equals", "7").with_expected("8");
        breach.set_common_values(&CheckType::new("yaml"), "interval", Severity::High);
        result.add_breach(breach);
        let mut rl = ResultList::new(false);
        rl.add_result(result);

        let output = format(&rl);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["total-checks"], 1);
        assert_eq!(parsed["total-breaches"], 1);
        assert_eq!(parsed["results"][0]["name"], "interval");
        assert_eq!(parsed["results"][0]["status"], "Fail");
        assert_eq!(parsed["results"][0]["severity"], "high");
        assert_eq!(
            parsed["results"][0]["failures"][0],
            "[data] 'check.interval_days' equals '7', expected '8'"
        );
        assert_eq!(parsed["results"][0]["breaches"][0]["breach-type"], "key-value");
    }

    #[test]
    fn test_json_empty() {
        let output = format(&ResultList::new(false));
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["results"], serde_json::json!([]));
        assert_eq!(parsed["remediation-performed"], false);
    }
}
