//! Command-line driver: load definition files, compile every global, then
//! reduce the selected one to normal form and print it.

use clap::Parser;
use lambda::arena::Graph;
use lambda::compiler::{self, Term};
use lambda::engine::{builtins, is_normal, reduce_step, show_expr, EvalContext};
use lambda::logging;
use lambda::parser::{definitions, FileInfo, Meta, MetaInfo};
use rustc_hash::FxHashSet;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "lambda",
    version,
    about = "Normal-order interpreter for λ-calculus definition files"
)]
struct Cli {
    /// Evaluate a global to normal form and print it
    #[arg(long, value_name = "NAME")]
    eval: Option<String>,
    /// Print every intermediate form while reducing
    #[arg(short, long)]
    verbose: bool,
    /// Abort evaluation after this many reduction steps
    #[arg(long, value_name = "N")]
    max_steps: Option<usize>,
    /// Log level (overrides RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
    /// Definition files
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    logging::init_with_level(cli.log_level.as_deref());

    let mut defs: Vec<(String, Term<Meta>)> = Vec::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    for path in &cli.files {
        let src = match std::fs::read_to_string(path) {
            Ok(src) => src,
            Err(e) => exit_with_error(None, &format!("{}: {e}", path.display())),
        };
        let parsed = match definitions(&path.to_string_lossy(), &src) {
            Ok(parsed) => parsed,
            Err(e) => exit_with_error(e.file_info.as_ref(), &e.message),
        };
        info!(file = %path.display(), count = parsed.len(), "loaded definitions");
        for (name, node) in parsed {
            if !seen.insert(name.clone()) {
                let meta = node.meta().clone();
                exit_with_error(meta.file_info.as_ref(), &format!("'{name}' already defined"));
            }
            defs.push((name, node));
        }
    }

    let mut g: Graph<Meta> = Graph::new();
    let prims = builtins(&mut g, &mut |name: &str| {
        Rc::new(MetaInfo { name: name.to_string(), file_info: None })
    });

    let globals = match compiler::compile_all(&mut g, &defs, &prims) {
        Ok(globals) => globals,
        Err(e) => exit_with_error(e.meta.file_info.as_ref(), &e.message),
    };

    let Some(target) = cli.eval else { return };
    let Some(&expr) = globals.get(&target) else {
        exit_with_error(None, &format!("eval: '{target}' not defined"));
    };

    let repr = |meta: &Meta| meta.name.clone();
    let mut ctx = EvalContext::default();
    if let Some(limit) = cli.max_steps {
        ctx.step_limit = limit;
    }
    let mut expr = expr;
    while !is_normal(&g, expr) {
        if ctx.steps >= ctx.step_limit {
            ctx.step_limit_hit = true;
            break;
        }
        if cli.verbose {
            println!("{}", show_expr(&g, &repr, expr));
            println!();
        }
        expr = reduce_step(&mut g, expr, &mut ctx);
        ctx.steps += 1;
    }
    if ctx.step_limit_hit {
        exit_with_error(
            None,
            &format!("eval: '{target}': step limit exceeded after {} steps", ctx.steps),
        );
    }
    println!("{}", show_expr(&g, &repr, expr));
}

fn exit_with_error(file_info: Option<&FileInfo>, message: &str) -> ! {
    match file_info {
        Some(fi) => eprintln!("{}:{}:{}: {message}", fi.filename, fi.line, fi.column),
        None => eprintln!("{message}"),
    }
    process::exit(1);
}
