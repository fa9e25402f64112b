use std::env;
use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;
use tracing::debug;

use crate::config::{resolve_config, OutputFormat, ResolvedConfig};
use crate::error::{DeptreeError, Result};
use crate::graph::{DependencyGraph, DependencyResolver};
use crate::loader;
use crate::util::{logging, output};

#[derive(Parser, Debug)]
#[command(name = "deptree")]
#[command(about = "Acyclic package dependency graphs, fully expanded", long_about = None)]
pub struct Cli {
    #[arg(short, long, env = "DEPTREE_CONFIG")]
    pub config: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[arg(short, long)]
    pub quiet: bool,
    #[arg(long)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every dependency occurrence in pre-order
    Resolve(ResolveArgs),
    /// Print the indented dependency tree
    Tree(TreeArgs),
    /// Validate the graph file
    Check(CheckArgs),
    /// Print the stored mapping
    Show(ShowArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    pub file: Option<PathBuf>,
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub count: bool,
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    pub file: Option<PathBuf>,
    #[arg(short = 'r', long)]
    pub root: Option<String>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    pub file: Option<PathBuf>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub file: Option<PathBuf>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

struct Context {
    resolved: ResolvedConfig,
    format: OutputFormat,
}

impl Context {
    fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let cwd = env::current_dir()?;
        let resolved = resolve_config(&cwd, config_path)?;
        if !resolved.config.output.color_enabled() {
            output::set_colors(false);
        }
        let format = resolved.config.output.format()?;
        Ok(Self { resolved, format })
    }

    fn load_graph(&self, file: Option<PathBuf>) -> Result<DependencyGraph> {
        let path = self.resolved.graph_file(file);
        debug!(path = %path.display(), "loading graph");
        Ok(loader::load_from_file(&path)?)
    }

    fn wants_json(&self, flag: bool) -> bool {
        flag || self.format == OutputFormat::Json
    }
}

pub fn run() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    if cli.no_color {
        output::set_colors(false);
    }
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    if let Commands::Completions(args) = &cli.command {
        handle_completions(args);
        return Ok(());
    }

    let context = Context::load(cli.config)?;
    match cli.command {
        Commands::Resolve(args) => handle_resolve(args, &context),
        Commands::Tree(args) => handle_tree(args, &context),
        Commands::Check(args) => handle_check(args, &context),
        Commands::Show(args) => handle_show(args, &context),
        Commands::Completions(_) => Ok(()),
    }
}

fn handle_resolve(args: ResolveArgs, context: &Context) -> Result<()> {
    let graph = context.load_graph(args.file)?;
    let resolver = DependencyResolver::new(&graph);

    if args.count {
        println!("{}", resolver.traversal_count());
        return Ok(());
    }

    let traversal = resolver.resolve_full_traversal();
    if context.wants_json(args.json) {
        return print_json(&traversal);
    }
    for name in traversal {
        println!("{}", name);
    }
    Ok(())
}

fn handle_tree(args: TreeArgs, context: &Context) -> Result<()> {
    let graph = context.load_graph(args.file)?;
    let resolver = DependencyResolver::new(&graph);

    let rendered = match args.root.as_deref() {
        Some(root) => resolver.pretty_print_node(root).ok_or_else(|| {
            DeptreeError::Other(anyhow::anyhow!(format!("unknown package {}", root)))
        })?,
        None => resolver.pretty_print(),
    };
    print!("{}", rendered);
    Ok(())
}

#[derive(Serialize)]
struct CheckJson {
    packages: usize,
    edges: usize,
    occurrences: usize,
}

fn handle_check(args: CheckArgs, context: &Context) -> Result<()> {
    let graph = context.load_graph(args.file)?;
    let snapshot = graph.snapshot();
    let report = CheckJson {
        packages: snapshot.len(),
        edges: snapshot.edge_count(),
        occurrences: DependencyResolver::new(&graph).traversal_count(),
    };

    if context.wants_json(args.json) {
        return print_json(&report);
    }

    if report.packages == 0 {
        output::warn("graph defines no packages");
    }
    output::success(&format!(
        "graph is acyclic: {} packages, {} dependency edges, {} resolved occurrences",
        report.packages, report.edges, report.occurrences
    ));
    Ok(())
}

fn handle_show(args: ShowArgs, context: &Context) -> Result<()> {
    let graph = context.load_graph(args.file)?;
    let snapshot = graph.snapshot();

    if context.wants_json(args.json) {
        return print_json(&snapshot);
    }

    for (name, deps) in snapshot.iter() {
        if deps.is_empty() {
            println!("{}: (none)", name);
        } else {
            println!("{}: {}", name, deps.join(", "));
        }
    }
    Ok(())
}

fn handle_completions(args: &CompletionsArgs) {
    let mut command = Cli::command();
    clap_complete::generate(args.shell, &mut command, "deptree", &mut io::stdout());
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| DeptreeError::Other(anyhow::Error::new(err)))?;
    println!("{}", json);
    Ok(())
}
