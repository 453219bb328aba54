//! `quay explain` command

use anyhow::{Context, Result};

use crate::cli::ExplainArgs;
use quay::ops::{compile, explain, format_explanation};
use quay::GlobalContext;

pub fn execute(args: ExplainArgs, ctx: &GlobalContext) -> Result<()> {
    let root = ctx.project_root(args.path.as_deref());
    let config = ctx.load_config(&root);

    let compilation = compile(&root, &config)?;
    let owners = explain(&compilation.result, &args.file)?;

    if args.json {
        let json = serde_json::to_string_pretty(&owners).context("failed to serialize ownership")?;
        println!("{}", json);
    } else {
        print!("{}", format_explanation(&args.file, &owners));
    }

    Ok(())
}
