#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use nuspec_conformance::{
    ConformanceReport, HarnessConfig, run_differential_test, run_fixture_root, write_report,
};

#[derive(Debug, Clone)]
struct CliArgs {
    fixtures: Vec<PathBuf>,
    fixture_root: PathBuf,
    report_dir: Option<PathBuf>,
    lenient: bool,
    jsonl: bool,
}

#[derive(Debug, Clone)]
enum CliParseError {
    Help,
    Message(String),
}

fn parse_cli_args(args: &[String]) -> Result<CliArgs, CliParseError> {
    let defaults = HarnessConfig::default();
    let mut fixtures = Vec::new();
    let mut fixture_root = defaults.fixture_root;
    let mut report_dir = None;
    let mut lenient = false;
    let mut jsonl = false;

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Err(CliParseError::Help),
            "--fixture-root" => {
                let Some(value) = args.get(index + 1) else {
                    return Err(CliParseError::Message(String::from(
                        "missing value for --fixture-root",
                    )));
                };
                fixture_root = PathBuf::from(value);
                index += 2;
            }
            "--report" => {
                let Some(value) = args.get(index + 1) else {
                    return Err(CliParseError::Message(String::from(
                        "missing value for --report",
                    )));
                };
                report_dir = Some(PathBuf::from(value));
                index += 2;
            }
            "--lenient" => {
                lenient = true;
                index += 1;
            }
            "--jsonl" => {
                jsonl = true;
                index += 1;
            }
            flag if flag.starts_with("--") => {
                return Err(CliParseError::Message(format!(
                    "unrecognized argument `{flag}`"
                )));
            }
            path => {
                fixtures.push(PathBuf::from(path));
                index += 1;
            }
        }
    }

    Ok(CliArgs {
        fixtures,
        fixture_root,
        report_dir,
        lenient,
        jsonl,
    })
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {program} [--fixture-root <path>] [--report <dir>] [--lenient] [--jsonl] [fixture.json ...]"
    );
    eprintln!("  --fixture-root <path>  directory scanned when no fixture files are given");
    eprintln!("  --report <dir>         write one <packet_id>.json report per fixture");
    eprintln!("  --lenient              record unexpected transform errors as failed cases");
    eprintln!("  --jsonl                also emit one structured log line per case");
}

fn run(args: &CliArgs) -> Result<Vec<ConformanceReport>, nuspec_conformance::HarnessError> {
    let config = HarnessConfig {
        fixture_root: args.fixture_root.clone(),
        strict_mode: !args.lenient,
    };
    if args.fixtures.is_empty() {
        run_fixture_root(&config)
    } else {
        args.fixtures
            .iter()
            .map(|path| run_differential_test(path, &config))
            .collect()
    }
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    let program = argv
        .first()
        .cloned()
        .unwrap_or_else(|| String::from("nuspec-oracle"));

    let args = match parse_cli_args(&argv[1..]) {
        Ok(args) => args,
        Err(CliParseError::Help) => {
            print_usage(&program);
            return ExitCode::SUCCESS;
        }
        Err(CliParseError::Message(message)) => {
            eprintln!("{message}");
            print_usage(&program);
            return ExitCode::from(2);
        }
    };

    let reports = match run(&args) {
        Ok(reports) => reports,
        Err(error) => {
            eprintln!("harness error: {error}");
            return ExitCode::from(2);
        }
    };

    let mut failed = 0usize;
    for report in &reports {
        eprintln!(
            "fixture={} packet={} family={} passed={} failed={} blake3={}",
            report.fixture_path,
            report.packet_id,
            report.family,
            report.pass_count,
            report.fail_count,
            report.fixture_blake3
        );
        for case in &report.per_case_results {
            let status = if case.passed { "PASS" } else { "FAIL" };
            eprintln!("{status} case={} {}", case.case_id, case.message);
        }
        if args.jsonl {
            for entry in report.log_entries() {
                entry.emit();
            }
        }
        if let Some(dir) = &args.report_dir {
            let path = dir.join(format!("{}.json", report.packet_id));
            if let Err(error) = write_report(report, &path) {
                eprintln!("harness error: {error}");
                return ExitCode::from(2);
            }
        }
        failed += report.fail_count;
    }

    if failed > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
