//! Check orchestration.
//!
//! Checks are independent of each other: each one is driven through its
//! steps on the rayon pool, and the results are gathered afterwards in
//! definition order.

use std::path::Path;

use log::{debug, info};
use rayon::prelude::*;

use crate::checks::Check;
use crate::config::Config;
use crate::result::ResultList;

/// Drive one check through its steps.
pub fn process_check(check: &mut dyn Check, project_dir: &Path) {
    let check_type = check.check_type().clone();
    check.init(&check_type);
    debug!("Processing '{}' check '{}'", check_type, check.name());

    if check.requires_data() {
        check.fetch_data(project_dir);
        if !check.has_data(true) {
            debug!("No data for check '{}'", check.name());
            return;
        }

        let failures = check.result().failures.len();
        check.unmarshal_data_map();
        if check.result().failures.len() > failures {
            debug!("Skipping check '{}': data could not be parsed", check.name());
            return;
        }
    }

    check.run_check();
}

/// Run every configured check and collect the results.
pub fn run_checks(config: &mut Config) -> ResultList {
    let project_dir = config.project_dir().to_path_buf();
    let checks: Vec<_> = config.checks.values_mut().flatten().collect();
    info!("Running {} checks in {}", checks.len(), project_dir.display());

    let results: Vec<_> = checks
        .into_par_iter()
        .map(|check| {
            process_check(&mut **check, &project_dir);
            check.result().clone()
        })
        .collect();

    let mut result_list = ResultList::new(false);
    for result in results {
        result_list.add_result(result);
    }
    info!(
        "Finished {} checks with {} breaches",
        result_list.total_checks, result_list.total_breaches
    );
    result_list
}
