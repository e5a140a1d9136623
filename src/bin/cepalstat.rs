use anyhow::{Result, bail};
use cepalstat_rs::dimensions::resolve_dimensions;
use cepalstat_rs::pipeline::DEFAULT_CSV_FILENAME;
use cepalstat_rs::{Client, DimensionCache, Request, storage};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cepalstat",
    version,
    about = "Fetch CEPALSTAT indicators, label dimension codes & combine them into one table"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and combine indicators (CSV to stdout unless --save-csv).
    Get(GetArgs),
    /// Load the dimension table of one indicator.
    Dimensions(DimensionsArgs),
}

#[derive(Args, Debug)]
struct GetArgs {
    /// Indicator ids separated by comma or semicolon (e.g., 2206,4470)
    #[arg(short, long)]
    indicators: String,
    /// Language code for labels (en or es)
    #[arg(short, long, default_value = "en")]
    lang: String,
    /// Keep rows from this year on (inclusive)
    #[arg(long)]
    start_year: Option<i32>,
    /// Keep rows up to this year (inclusive)
    #[arg(long)]
    end_year: Option<i32>,
    /// ISO3 country codes separated by comma or semicolon (e.g., BRA,MEX)
    #[arg(short, long)]
    countries: Option<String>,
    /// Save the table to --csv-filename instead of printing it.
    #[arg(long, default_value_t = false)]
    save_csv: bool,
    #[arg(long, default_value = DEFAULT_CSV_FILENAME)]
    csv_filename: PathBuf,
    /// Reuse dimension tables cached on disk.
    #[arg(long, default_value_t = false)]
    cache_dimensions: bool,
    /// Cache directory (defaults to the platform cache dir).
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DimensionsArgs {
    /// Indicator id
    #[arg(short, long)]
    indicator: u32,
    #[arg(short, long, default_value = "en")]
    lang: String,
    /// Always fetch from the API and do not write the cache.
    #[arg(long, default_value_t = false)]
    no_cache: bool,
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_ids(s: &str) -> Result<Vec<u32>> {
    parse_list(s)
        .iter()
        .map(|x| {
            x.parse::<u32>()
                .map_err(|_| anyhow::anyhow!("invalid indicator id '{}', expected a number", x))
        })
        .collect()
}

fn cache_at(dir: Option<PathBuf>) -> DimensionCache {
    dir.map(DimensionCache::new)
        .unwrap_or_else(DimensionCache::default_location)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{} - {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Get(args) => cmd_get(args),
        Command::Dimensions(args) => cmd_dimensions(args),
    }
}

fn cmd_get(args: GetArgs) -> Result<()> {
    let ids = parse_ids(&args.indicators)?;
    if ids.is_empty() {
        bail!("at least one indicator id required");
    }
    if let (Some(s), Some(e)) = (args.start_year, args.end_year) {
        if s > e {
            bail!("--start-year {} is after --end-year {}", s, e);
        }
    }

    let mut req = Request::new(ids);
    req.lang = args.lang;
    req.filter.start_year = args.start_year;
    req.filter.end_year = args.end_year;
    req.filter.countries = args.countries.as_deref().map(parse_list).unwrap_or_default();
    if args.cache_dimensions {
        req.dimension_cache = Some(cache_at(args.cache_dir));
    }
    if args.save_csv {
        req.export = Some(args.csv_filename.clone());
    }

    let client = Client::new()?;
    let Some(table) = client.fetch(&req)? else {
        bail!("no data was retrieved for any of the requested indicators");
    };

    if args.save_csv {
        eprintln!(
            "Saved {} rows to {}",
            table.len(),
            args.csv_filename.display()
        );
    } else {
        storage::write_csv(&table, std::io::stdout().lock())?;
    }
    Ok(())
}

fn cmd_dimensions(args: DimensionsArgs) -> Result<()> {
    let client = Client::new()?;
    let cache = (!args.no_cache).then(|| cache_at(args.cache_dir));
    let Some(table) = resolve_dimensions(&client, args.indicator, &args.lang, cache.as_ref())
    else {
        bail!("could not load dimensions for indicator {}", args.indicator);
    };
    for d in &table.dimensions {
        println!(
            "{}\t{}\t{} members",
            d.column,
            d.name.as_deref().unwrap_or("NA"),
            d.members.len()
        );
    }
    Ok(())
}
