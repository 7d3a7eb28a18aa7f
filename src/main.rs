use clap::Parser;
use stakeout::query;
use stakeout::search::report;
use stakeout::search::Config;
use stakeout::search::Strategy;
use stakeout::search::Template;
use stakeout::track::Dataset;
use std::path::PathBuf;

/// search pre-segmented surveillance trajectories for a described
/// behavioral pattern
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// trajectory dataset (json)
    #[arg(long)]
    data: PathBuf,
    /// behavior query text
    #[arg(long, conflicts_with = "query_file")]
    query: Option<String>,
    /// behavior query file; lines starting with '#' are comments
    #[arg(long)]
    query_file: Option<PathBuf>,
    /// maximum number of ranked results
    #[arg(long, default_value_t = 100)]
    limit: usize,
    /// write results to this csv file
    #[arg(long)]
    out: Option<PathBuf>,
    /// conformity floor below which a path step prunes
    #[arg(long, default_value_t = stakeout::search::Config::default().min_confidence)]
    min_confidence: f64,
    /// best paths remembered per graph vertex
    #[arg(long, default_value_t = stakeout::search::Config::default().max_memory)]
    max_memory: usize,
    /// conjunction folding strategy
    #[arg(long, value_enum, default_value_t = Strategy::Avg)]
    strategy: Strategy,
    /// comparator trade-off between conformity and reliability
    #[arg(long, default_value_t = stakeout::search::Config::default().tradeoff)]
    tradeoff: f64,
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    stakeout::init();
    let args = Args::parse();
    let config = Config {
        tradeoff: args.tradeoff,
        min_confidence: args.min_confidence,
        max_memory: args.max_memory,
        strategy: args.strategy,
        debug: args.debug,
    };

    let text = match (&args.query, &args.query_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .collect::<Vec<_>>()
            .join(" "),
        (None, None) => anyhow::bail!("one of --query or --query-file is required"),
    };

    let template = Template::from(query::parse(&text)?);
    log::info!("query: {}", template);

    let dataset = Dataset::load(&args.data)?;
    let (agents, pairs) = dataset.into_maps();
    log::info!("loaded {} agents and {} pairs", agents.len(), pairs.len());

    let found = template.search(&agents, &pairs, &config, args.limit);
    match found.is_empty() {
        true => log::warn!("behavior not found"),
        false => {
            for (rank, result) in found.iter().enumerate() {
                log::info!("#{:<3} {}", rank + 1, result);
            }
        }
    }

    if let Some(out) = &args.out {
        report::write_csv(out, &template, &found)?;
        log::info!("results written to {}", out.display());
    }
    Ok(())
}
