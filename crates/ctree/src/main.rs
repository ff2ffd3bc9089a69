use anyhow::Context;
use clap::Parser;
use ctree_core::dadda;
use ctree_core::prefix::{PrefixTree, Technique};
use ctree_core::{Algorithm, Config, Encoding, ReductionModel, StageObserver, TraceEvent};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// Application configuration.
#[derive(clap::Parser, Debug)]
#[clap(version, about = "Compressor-tree and prefix-tree netlist generator")]
struct Args {
    /// The main command to run.
    #[command(subcommand)]
    subcommand: Subcommand,

    /// The global options.
    #[clap(flatten)]
    global: GlobalArgs,
}

/// Global configuration options.
#[derive(clap::Args, Debug)]
struct GlobalArgs {
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// The main subcommands for the ctree executable.
#[derive(clap::Subcommand, Debug)]
enum Subcommand {
    /// Generate a compressor-tree netlist.
    Tree(TreeArgs),
    /// Generate a parallel-prefix carry tree.
    Prefix(PrefixArgs),
    /// Generate simulation test vectors.
    Vectors(VectorsArgs),
}

#[derive(clap::Args, Debug)]
struct TreeArgs {
    /// Operand width in bits.
    #[arg(short, long, default_value_t = 16)]
    width: usize,

    /// Number of partial products (derived from the encoding if omitted).
    #[arg(short = 'n', long = "num-pp")]
    num_pp: Option<usize>,

    /// Encoding type (binary or booth).
    #[arg(short, long, default_value = "booth")]
    encoding: Encoding,

    /// Reduction algorithm (dadda, bickerstaff, or fa-only).
    #[arg(short, long, default_value = "dadda")]
    algorithm: Algorithm,

    /// Unsigned multiplication.
    #[arg(long)]
    unsigned: bool,

    /// Use naive sign extension.
    #[arg(long = "naive-sign-ext")]
    naive_sign_ext: bool,

    /// Output file.
    #[arg(short, long, default_value = "compressor_tree.sv")]
    output: PathBuf,

    /// Print a configuration summary.
    #[arg(short, long)]
    summary: bool,

    /// Print the stage-by-stage heap rendering.
    #[arg(long)]
    visualize: bool,

    /// Write a Graphviz DOT diagram of the reduction.
    #[arg(long)]
    graphviz: Option<PathBuf>,

    /// Write a JSON build report.
    #[arg(long = "stats-json")]
    stats_json: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct PrefixArgs {
    /// Adder width in bits (2-256).
    #[arg(short, long)]
    width: usize,

    /// Prefix tree technique (brent-kung, sklansky, or kogge-stone).
    #[arg(short, long)]
    technique: Technique,

    /// Pipeline stages (0 = combinational).
    #[arg(long, default_value_t = 0)]
    pipeline: usize,

    /// Output file.
    #[arg(short, long, default_value = "prefix_tree.sv")]
    output: PathBuf,

    /// Write a Graphviz DOT diagram of the tree.
    #[arg(long)]
    graphviz: Option<PathBuf>,

    /// Print node statistics.
    #[arg(long)]
    stats: bool,
}

#[derive(clap::Args, Debug)]
struct VectorsArgs {
    /// Operand width in bits.
    #[arg(short, long, default_value_t = 16)]
    width: usize,

    /// Encoding type (binary or booth).
    #[arg(short, long, default_value = "booth")]
    encoding: Encoding,

    /// Unsigned multiplication.
    #[arg(long)]
    unsigned: bool,

    /// Number of test vectors (ignored with --exhaustive).
    #[arg(short = 'n', long = "num-tests", default_value_t = 8)]
    num_tests: usize,

    /// Generate every operand pair for the given width.
    #[arg(long)]
    exhaustive: bool,

    /// Seed for the pseudo-random operand padding.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output folder for the generated .hex files.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

/// Renders trace events when --verbose is given; the algorithms themselves
/// never print.
struct PrintObserver;

impl StageObserver for PrintObserver {
    fn on_event(&mut self, event: &TraceEvent<'_>) {
        match event {
            TraceEvent::StageBegin {
                stage,
                target,
                max_height,
            } => match target {
                Some(target) => {
                    println!("stage {}: height {max_height} -> target {target}", stage + 1);
                }
                None => println!("stage {}: height {max_height}, FA-only", stage + 1),
            },
            TraceEvent::CellPlaced { .. } => {}
            TraceEvent::StageEnd { stage, heap } => {
                println!("stage {}: done, max height {}", stage + 1, heap.max_height());
            }
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let result = match &args.subcommand {
        Subcommand::Tree(tree_args) => cmd_tree(&args.global, tree_args),
        Subcommand::Prefix(prefix_args) => cmd_prefix(&args.global, prefix_args),
        Subcommand::Vectors(vectors_args) => cmd_vectors(&args.global, vectors_args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_tree(global: &GlobalArgs, args: &TreeArgs) -> anyhow::Result<()> {
    let config = Config::new(args.width, args.encoding, args.algorithm)
        .with_unsigned(args.unsigned)
        .with_num_partial_products(args.num_pp)
        .with_sign_ext_opt(!args.naive_sign_ext);

    let model = if global.verbose {
        ReductionModel::build_with_observer(config, &mut PrintObserver)?
    } else {
        ReductionModel::build(config)?
    };

    let sv = ctree_verilog::verilog::generate(&model)?;
    fs::write(&args.output, sv)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Generated {}", args.output.display());

    if args.summary {
        print_summary(&model);
    }
    if args.visualize {
        print!("{}", ctree_verilog::visualize::render_model(&model));
    }
    if let Some(path) = &args.graphviz {
        let dot = ctree_verilog::graphviz::compressor_dot(&model, true)?;
        fs::write(path, dot).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Graphviz DOT file saved to {}", path.display());
    }
    if let Some(path) = &args.stats_json {
        let report = serde_json::to_string_pretty(&model.summary())?;
        fs::write(path, report)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

fn print_summary(model: &ReductionModel) {
    let config = model.config();
    println!();
    println!("{} tree configuration:", config.algorithm);
    println!("  Input width: {} bits", config.width);
    println!("  Encoding: {}", config.encoding);
    println!(
        "  Type: {}",
        if config.unsigned { "unsigned" } else { "signed" }
    );
    if !config.unsigned {
        println!(
            "  Sign extension: {}",
            if config.sign_ext_opt {
                "optimized (invert+extend)"
            } else {
                "naive"
            }
        );
    }
    println!("  Partial products: {}", config.num_pp());
    println!("  Product width: {}", config.product_width());
    if config.algorithm == Algorithm::Dadda {
        println!(
            "  Dadda sequence: {:?}",
            dadda::sequence(model.stages()[0].max_height())
        );
    }
    println!("  Stages: {}", model.num_stages());
    println!("  Full adders: {}", model.full_adders().count());
    println!("  Half adders: {}", model.half_adders().count());
    println!("  Final heap height: {}", model.final_stage().max_height());
}

fn cmd_prefix(_global: &GlobalArgs, args: &PrefixArgs) -> anyhow::Result<()> {
    let tree = PrefixTree::build(args.width, args.technique, args.pipeline)?;

    let sv = ctree_verilog::prefix::generate(&tree);
    fs::write(&args.output, sv)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Generated {}", args.output.display());

    if let Some(path) = &args.graphviz {
        fs::write(path, ctree_verilog::graphviz::prefix_dot(&tree))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Graphviz DOT file saved to {}", path.display());
    }
    if args.stats {
        let stats = tree.stats();
        println!();
        println!("Prefix tree statistics - {}", tree.technique());
        println!("  Width: {}", tree.width());
        println!("  Levels: {}", tree.max_level());
        println!("  Pipeline stages: {}", tree.pipeline());
        println!("  Total nodes: {}", stats.total_nodes);
        println!("  Compute nodes: {}", stats.compute_nodes);
        println!("  Buffer nodes: {}", stats.buffer_nodes);
    }
    Ok(())
}

fn cmd_vectors(global: &GlobalArgs, args: &VectorsArgs) -> anyhow::Result<()> {
    // The vector generator shares the tree's configuration constraints;
    // unsigned Booth is rejected here too, before any file is written.
    let config = Config::new(args.width, args.encoding, Algorithm::Dadda)
        .with_unsigned(args.unsigned);

    let set = ctree_vectors::generate(&config, args.num_tests, args.exhaustive, args.seed)?;
    ctree_vectors::write_hex_files(&set, &args.output)?;
    ctree_vectors::write_defines(&set, &args.output)?;

    println!(
        "Generated {} test vectors ({}-bit width) in {}",
        set.a.len(),
        set.width,
        args.output.display()
    );
    if global.verbose {
        for (i, ((a, b), expected)) in set.a.iter().zip(&set.b).zip(&set.expected).enumerate() {
            println!("  test {i}: {a} * {b} = {expected}");
        }
    }
    Ok(())
}
