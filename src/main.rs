use clap::Parser;
use shipshape::cli::Cli;
use shipshape::formatter::format_results;
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    // Initialize logging
    cli.init_logging();

    let run = match shipshape::run(&cli.checks_file, cli.project_dir.as_deref()) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    print!("{}", format_results(&run.results, cli.output));

    if cli.exit_code && run.should_fail() {
        process::exit(2);
    }
}
