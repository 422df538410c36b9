use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use epigeo::{storage, viz};
use epigeo::{
    CachedFetcher, CountryEnricher, EnrichOptions, FetchConfig, InfoField, NameStandardizer, SourceDb, Standard,
    StandardizeOptions, SubnationalGeometryStore, Table,
};
use num_format::{Locale, ToFormattedString};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "epigeo",
    version,
    about = "Standardize country names, expand regions & attach geographic reference data"
)]
struct Cli {
    #[command(flatten)]
    cache: CacheArgs,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert location names to a canonical standard.
    Standardize(StandardizeArgs),
    /// List the known world regions.
    Regions,
    /// Print the member countries of a region (ISO3).
    Members {
        /// Region name (e.g., "G7", "Western Europe")
        region: String,
    },
    /// Add per-country fields to a CSV table.
    Enrich(EnrichArgs),
    /// Subnational geometry of a country (and optionally save or plot it).
    Subregions(SubregionArgs),
    /// Draw a world map of a per-country CSV, shaded by one of its columns.
    Map(MapArgs),
}

#[derive(Args, Debug)]
struct CacheArgs {
    /// Directory of the download cache (default: user cache dir/epigeo).
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
    /// Refresh cached downloads older than this many hours.
    #[arg(long, global = true)]
    max_age_hours: Option<u64>,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Layout {
    Main,
    Dense,
    Exploded,
}

#[derive(Args, Debug)]
struct StandardizeArgs {
    /// Location names separated by comma or semicolon (e.g., "France;Korea, South")
    names: String,
    /// Output standard: iso2, iso3, name or num.
    #[arg(short, long, default_value = "iso3")]
    standard: String,
    /// Upstream dataset whose naming quirks are fixed first (e.g., jhu, owid).
    #[arg(long)]
    db: Option<String>,
    /// Expand region names into their member countries.
    #[arg(long, default_value_t = false)]
    interpret_region: bool,
}

#[derive(Args, Debug)]
struct EnrichArgs {
    /// Input CSV with a header row.
    #[arg(short, long)]
    input: PathBuf,
    /// Fields separated by comma or semicolon (e.g., population,area).
    #[arg(short, long)]
    fields: String,
    /// Column holding the location names.
    #[arg(long, default_value = "where")]
    geo_column: String,
    /// Replace fields that already exist in the input.
    #[arg(long, default_value_t = false)]
    overload: bool,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

#[derive(Args, Debug)]
struct SubregionArgs {
    /// ISO3 code of the country (e.g., FRA). Omit to list supported countries.
    country: Option<String>,
    /// Geometry layout.
    #[arg(long, value_enum, default_value_t = Layout::Main)]
    layout: Layout,
    /// Aggregate subregions into regions.
    #[arg(long, default_value_t = false)]
    regions: bool,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Create a map at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Numeric column used to shade the map.
    #[arg(long)]
    value: Option<String>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 800).
    #[arg(long, default_value_t = 800)]
    height: u32,
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Input CSV with a header row.
    #[arg(short, long)]
    input: PathBuf,
    /// Column holding the location names.
    #[arg(long, default_value = "where")]
    geo_column: String,
    /// Numeric column used to shade the map.
    #[arg(long)]
    value: Option<String>,
    /// Output path (.svg or .png).
    #[arg(short, long)]
    out: PathBuf,
    /// Width of the plot (default 1200).
    #[arg(long, default_value_t = 1200)]
    width: u32,
    /// Height of the plot (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn fetcher(cache: &CacheArgs) -> Result<CachedFetcher> {
    let mut config = FetchConfig::default();
    if let Some(dir) = &cache.cache_dir {
        config.cache_dir = dir.clone();
    }
    config.max_age = cache.max_age_hours.map(|h| Duration::from_secs(h * 3600));
    Ok(CachedFetcher::new(config)?)
}

fn save(table: &Table, path: &Path, format: Option<&OutFormat>) -> Result<()> {
    let fmt = match format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(table, path)?,
        "json" => storage::save_json(table, path)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!(
        "Saved {} rows to {}",
        table.len().to_formatted_string(&Locale::en),
        path.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Standardize(args) => cmd_standardize(args),
        Command::Regions => {
            let gm = NameStandardizer::new(Standard::Iso3)?;
            for r in gm.region_catalog().list_regions() {
                println!("{r}");
            }
            Ok(())
        }
        Command::Members { region } => {
            let gm = NameStandardizer::new(Standard::Iso3)?;
            println!("{}", gm.region_catalog().members(&region)?.join(","));
            Ok(())
        }
        Command::Enrich(args) => cmd_enrich(args, &cli.cache),
        Command::Subregions(args) => cmd_subregions(args, &cli.cache),
        Command::Map(args) => cmd_map(args, &cli.cache),
    }
}

fn cmd_standardize(args: StandardizeArgs) -> Result<()> {
    let standard: Standard = args.standard.parse()?;
    let source_db = args.db.as_deref().map(str::parse::<SourceDb>).transpose()?;
    let gm = NameStandardizer::new(standard)?;
    let names = parse_list(&args.names);
    let opts = StandardizeOptions {
        standard: None,
        source_db,
        interpret_region: args.interpret_region,
    };
    if args.interpret_region {
        println!("{}", gm.standardize(&names, &opts)?.join(","));
    } else {
        for (name, code) in gm.standardize_dict(&names, &opts)? {
            println!("{name}\t{code}");
        }
    }
    Ok(())
}

fn cmd_enrich(args: EnrichArgs, cache: &CacheArgs) -> Result<()> {
    let fields = parse_list(&args.fields)
        .iter()
        .map(|f| f.parse::<InfoField>())
        .collect::<Result<Vec<_>, _>>()?;
    let input = storage::load_csv(&args.input).with_context(|| format!("reading {}", args.input.display()))?;

    let gm = NameStandardizer::new(Standard::Iso3)?;
    let mut enricher = CountryEnricher::new(gm, Box::new(fetcher(cache)?));
    let out = enricher.add_fields(
        &input,
        &fields,
        &EnrichOptions {
            geo_column: args.geo_column,
            overload: args.overload,
        },
    )?;

    match args.out.as_ref() {
        Some(path) => save(&out, path, args.format.as_ref())?,
        None => println!("{}", serde_json::to_string_pretty(&table_json(&out))?),
    }
    Ok(())
}

fn table_json(table: &Table) -> serde_json::Value {
    table
        .rows()
        .iter()
        .map(|row| {
            table
                .columns()
                .iter()
                .zip(row)
                .filter(|(c, _)| c.as_str() != "geometry")
                .map(|(c, v)| (c.clone(), v.to_json()))
                .collect::<serde_json::Map<_, _>>()
        })
        .map(serde_json::Value::Object)
        .collect()
}

fn cmd_subregions(args: SubregionArgs, cache: &CacheArgs) -> Result<()> {
    let Some(country) = args.country.as_deref() else {
        for c in SubnationalGeometryStore::list_countries() {
            println!("{c}");
        }
        return Ok(());
    };

    let fetcher = fetcher(cache)?;
    let mut store = SubnationalGeometryStore::new(Some(country), &fetcher)?;
    match args.layout {
        Layout::Main => store.set_main_geometry()?,
        Layout::Dense => store.set_dense_geometry()?,
        Layout::Exploded => store.set_exploded_geometry()?,
    }
    let data = store.get_data(args.regions)?;
    eprintln!(
        "{}: {} {}",
        country,
        data.len().to_formatted_string(&Locale::en),
        if args.regions { "regions" } else { "subregions" }
    );

    if let Some(path) = args.out.as_ref() {
        save(data, path, args.format.as_ref())?;
    }
    if let Some(plot_path) = args.plot.as_ref() {
        viz::plot_map(data, plot_path, args.width, args.height, args.value.as_deref())?;
        eprintln!("Wrote map to {}", plot_path.display());
    }
    if args.out.is_none() && args.plot.is_none() {
        println!("{}", serde_json::to_string_pretty(&table_json(data))?);
    }
    Ok(())
}

fn cmd_map(args: MapArgs, cache: &CacheArgs) -> Result<()> {
    let input = storage::load_csv(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let gm = NameStandardizer::new(Standard::Iso3)?;
    let mut enricher = CountryEnricher::new(gm, Box::new(fetcher(cache)?));
    let shapes = enricher.add_fields(
        &input,
        &[InfoField::Geometry],
        &EnrichOptions {
            geo_column: args.geo_column,
            overload: true,
        },
    )?;
    viz::plot_map(&shapes, &args.out, args.width, args.height, args.value.as_deref())?;
    eprintln!("Wrote map to {}", args.out.display());
    Ok(())
}
