//! Quay CLI - partitions an annotated source tree into execution units

use anyhow::Result;
use clap::Parser;
use miette::{GraphicalReportHandler, GraphicalTheme};
use tracing_subscriber::EnvFilter;

use quay::lang::{AnnotationError, PluginError};
use quay::util::diagnostic::emit;
use quay::GlobalContext;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("quay=debug")
    } else {
        EnvFilter::new("quay=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_color(!cli.no_color);

    // Execute command
    match cli.command {
        Commands::Compile(args) => commands::compile::execute(args, &ctx),
        Commands::Explain(args) => commands::explain::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error, with source context where the error carries it.
fn report(err: &anyhow::Error, color: bool) {
    if let Some(plugin_err) = err.downcast_ref::<PluginError>() {
        emit(&plugin_err.to_diagnostic(), color);
        return;
    }

    if let Some(annot_err) = err.downcast_ref::<AnnotationError>() {
        let theme = if color {
            GraphicalTheme::unicode()
        } else {
            GraphicalTheme::unicode_nocolor()
        };
        let mut out = String::new();
        if GraphicalReportHandler::new_themed(theme)
            .render_report(&mut out, annot_err)
            .is_ok()
        {
            eprint!("{}", out);
            return;
        }
    }

    eprintln!("error: {:#}", err);
}
