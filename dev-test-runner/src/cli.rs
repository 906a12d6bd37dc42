//! Minimal CLI: fixtures → pass/fail report
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;
use rayon::prelude::*;

use crate::fixture::{self, Loaded};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// run projection fixtures and report which cases diverge
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// One or more fixture files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., default_value = "dev-test-runner/fixtures/*.json")]
    input: Vec<String>,

    /// also list passing cases and emit debug logs
    #[arg(long, short)]
    pub verbose: bool,
}

pub struct Report {
    pub passed: usize,
    pub failed: usize,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<Report> {
        let paths = resolve_file_path_patterns(&self.input)?;
        let mut cases = Vec::<Loaded>::new();
        for path in &paths {
            cases.extend(fixture::load(path)?);
        }
        tracing::info!(files = paths.len(), cases = cases.len(), "loaded fixtures");

        let outcomes: Vec<(&Loaded, Result<(), String>)> =
            cases.par_iter().map(|loaded| (loaded, loaded.run())).collect();

        let mut report = Report { passed: 0, failed: 0 };
        for (loaded, outcome) in outcomes {
            let label = format!("{} :: {}", loaded.source.display(), loaded.case.name);
            match outcome {
                Ok(()) => {
                    report.passed += 1;
                    if self.verbose {
                        eprintln!("{} {label}", "✅ pass".green());
                    }
                }
                Err(reason) => {
                    report.failed += 1;
                    eprintln!("{} {label}\n        {reason}", "❌ fail".red().bold());
                }
            }
        }
        let summary = format!("{} passed, {} failed", report.passed, report.failed);
        if report.failed == 0 {
            eprintln!("{}", summary.green());
        } else {
            eprintln!("{}", summary.red());
        }
        Ok(report)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if has_glob_chars(pattern) {
            let before = out.len();
            for entry in glob::glob(pattern)? {
                out.push(entry?);
            }
            if out.len() == before {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }
    out.sort();
    Ok(out)
}
