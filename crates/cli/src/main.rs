use anyhow::{bail, Context, Result};
use clap::Parser;
use pivotmap_core::export::{to_csv, to_json};
use pivotmap_core::search::search;
use pivotmap_core::{Aggregate, Dataset, PivotEngine, TreemapStyle, TreemapView, ViewConfig};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pivotmap-cli", about = "Squarified treemap layout of a grouped CSV dataset")]
struct Args {
    /// CSV file with a header row
    data: PathBuf,
    /// Grouping column, outermost first (repeat for each level)
    #[arg(short, long = "group", required = true)]
    groups: Vec<String>,
    /// Measure that sizes the cells, as `column` or `column:func`
    #[arg(short, long)]
    size: Aggregate,
    /// Measure that colours the cells, as `column` or `column:func`
    #[arg(short, long)]
    color: Option<Aggregate>,
    #[arg(long, default_value_t = 800)]
    width: i32,
    #[arg(long, default_value_t = 600)]
    height: i32,
    /// classic or cluster; overrides the config file
    #[arg(long)]
    style: Option<TreemapStyle>,
    /// JSON view configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the laid-out cells as JSON
    #[arg(short, long)]
    json: Option<PathBuf>,
    /// Write the laid-out cells as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Print the cells whose label best matches this text
    #[arg(short, long)]
    find: Option<String>,
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "pivotmap_core=debug,pivotmap_cli=debug"
    } else {
        "pivotmap_core=info,pivotmap_cli=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader::<_, ViewConfig>(file)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => ViewConfig::default(),
    };
    if let Some(style) = args.style {
        config.style = style;
    }
    if args.width <= 2 || args.height <= 2 {
        bail!("view must be larger than 2x2, got {}x{}", args.width, args.height);
    }

    let mut aggregates = vec![args.size.clone()];
    aggregates.extend(args.color.clone());
    let mut measures: Vec<String> = aggregates.iter().map(|a| a.column.clone()).collect();
    measures.dedup();

    let file = File::open(&args.data).with_context(|| format!("opening {}", args.data.display()))?;
    let data = Dataset::from_csv_reader(file, &args.groups, &measures)
        .with_context(|| format!("reading {}", args.data.display()))?;
    let engine = PivotEngine::new(&data, aggregates)?;

    let mut view = TreemapView::new(config);
    view.set_engine(engine)?;
    view.resize(args.width, args.height)?;

    let cache = view.cache();
    for depth in cache.depths() {
        println!(
            "depth {} ({}): {} cells in {} groups",
            depth,
            args.groups[depth - 1],
            cache.cells(depth).count(),
            cache.groups(depth).len()
        );
    }

    if let Some(needle) = &args.find {
        for (score, depth, cell) in search(cache, needle).into_iter().take(10) {
            let r = cell.rect;
            println!(
                "{:>5}  depth {}  {:<40} {}x{} at ({}, {})",
                score,
                depth,
                cell.path.join(" / "),
                r.w,
                r.h,
                r.x,
                r.y
            );
        }
    }

    if let Some(path) = &args.json {
        let json = to_json(cache);
        std::fs::write(path, serde_json::to_string_pretty(&json)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &args.csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        to_csv(cache, std::io::BufWriter::new(file))?;
    }
    Ok(())
}
