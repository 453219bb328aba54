//! `quay compile` command

use anyhow::{Context, Result};

use crate::cli::CompileArgs;
use quay::ops::{compile, format_report};
use quay::util::diagnostic::{emit, suggestions, Diagnostic};
use quay::GlobalContext;

pub fn execute(args: CompileArgs, ctx: &GlobalContext) -> Result<()> {
    let root = ctx.project_root(args.path.as_deref());
    let mut config = ctx.load_config(&root);
    if args.jobs.is_some() {
        config.compile.jobs = args.jobs;
    }

    tracing::info!("Compiling {}", root.display());
    let compilation = compile(&root, &config)?;
    let report = compilation.report();

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{}", json);
    } else {
        print!("{}", format_report(&report));
    }

    let claimed = report
        .units
        .iter()
        .filter(|u| u.executable_type.is_some())
        .count();
    tracing::info!(
        "Compiled {} execution units ({} claimed)",
        report.units.len(),
        claimed
    );

    if claimed == 0 && !report.units.is_empty() {
        let diag = Diagnostic::warning("no execution unit was claimed by a language plugin")
            .with_note(format!("looked for {}", config.python_manifest()))
            .with_suggestion(suggestions::NO_MANIFEST);
        emit(&diag, ctx.use_color());
    }

    Ok(())
}
