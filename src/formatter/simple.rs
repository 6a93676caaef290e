//! Human-readable summary formatter.

use crate::formatter::NO_RESULT;
use crate::result::{CheckResult, ResultList, Status};

const TOP_SHAPE: &str = "Ship is in top shape; no breach detected!\n";

/// Format results as a short summary of what was breached or remediated.
pub fn format(results: &ResultList) -> String {
    if results.results.is_empty() {
        return NO_RESULT.to_string();
    }

    if !results.remediation_performed {
        if results.status() == Status::Pass {
            return TOP_SHAPE.to_string();
        }
        let mut output = String::from("# Breaches were detected\n\n");
        push_blocks(&mut output, &results.results, |r| &r.failures);
        return output;
    }

    if results.total_breaches == 0 && results.total_remediations == 0 {
        return TOP_SHAPE.to_string();
    }

    if results.total_breaches == 0 {
        let mut output = String::from("Breaches were detected but were all fixed successfully!\n\n");
        push_blocks(&mut output, &results.results, |r| &r.remediations);
        return output;
    }

    let mut output = String::from(
        "Breaches were detected but not all of them could be fixed as they are either \
         not supported yet or there were errors when trying to remediate.\n\n",
    );
    output.push_str("# Remediations\n\n");
    push_blocks(&mut output, &results.results, |r| &r.remediations);
    output.push_str("# Non-remediated breaches\n\n");
    push_blocks(&mut output, &results.results, |r| &r.failures);
    output
}

/// One block per result with messages: a heading, then one line per message.
fn push_blocks<F>(output: &mut String, results: &[CheckResult], messages: F)
where
    F: Fn(&CheckResult) -> &Vec<String>,
{
    for result in results {
        let messages = messages(result);
        if messages.is_empty() {
            continue;
        }
        output.push_str(&format!("  ### {}\n", result.name));
        for msg in messages {
            output.push_str(&format!("     -- {}\n", msg));
        }
        output.push('\n');
    }
}
