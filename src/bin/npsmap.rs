use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use npsmap::layout::{MAP_WRAPPER, StaticLayout, TooltipScale, update_scale};
use npsmap::storage::SvgOptions;
use npsmap::{AlbersUsa, Client, MapState, Source};
use npsmap::{format, stats, storage, store};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "npsmap",
    version,
    about = "Fetch, project & format U.S. national park map data"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the data pipeline (and optionally save, render, and print stats).
    Fetch(FetchArgs),
    /// Format a visitor count for display.
    Format(FormatArgs),
    /// Project a longitude/latitude pair with the shared projection.
    Project(ProjectArgs),
    /// Tooltip scale factor for a rendered map width.
    Scale(ScaleArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// States topology URL or file.
    #[arg(long, default_value = npsmap::api::STATES_TOPOLOGY_URL)]
    topology: String,
    /// Park locations CSV URL or file.
    #[arg(long, default_value = npsmap::api::PARKS_CSV_PATH)]
    parks: String,
    /// Base URL against which a relative --parks path is resolved.
    #[arg(long)]
    base_url: Option<String>,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv = park rows, json = full aggregate). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Write an SVG snapshot of the map.
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Numeric column used as color scale domain and dot color.
    #[arg(long)]
    domain_column: Option<String>,
    /// Print row counts (and the column extent when --domain-column is set).
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Locale for printed numbers (en, de, fr, es, it, pt, nl).
    #[arg(long, default_value = "en")]
    locale: String,
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// Visitor count.
    count: u64,
    /// Use the "M" suffix instead of " million".
    #[arg(long, default_value_t = false)]
    abbrev: bool,
    #[arg(long, default_value = "en")]
    locale: String,
}

#[derive(Args, Debug)]
struct ProjectArgs {
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
}

#[derive(Args, Debug)]
struct ScaleArgs {
    /// Rendered width of the map wrapper in pixels.
    #[arg(long)]
    width: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Fetch(args) => cmd_fetch(args),
        Command::Format(args) => {
            let s = if args.abbrev {
                format::format_visitor_count_abbrev_locale(args.count, &args.locale)
            } else {
                format::format_visitor_count_locale(args.count, &args.locale)
            };
            println!("{s}");
            Ok(())
        }
        Command::Project(args) => {
            match AlbersUsa::shared().project([args.lon, args.lat]) {
                Some([x, y]) => println!("{x},{y}"),
                None => println!("null"),
            }
            Ok(())
        }
        Command::Scale(args) => {
            let mut layout = StaticLayout::new();
            if let Some(w) = args.width {
                layout = layout.with(MAP_WRAPPER, w);
            }
            let mut scale = TooltipScale::default();
            update_scale(&mut scale, &layout);
            println!("{}", scale.factor);
            Ok(())
        }
    }
}

fn cmd_fetch(args: FetchArgs) -> Result<()> {
    let mut client = Client::new()?
        .with_topology(Source::parse(&args.topology))
        .with_parks(Source::parse(&args.parks));
    if let Some(base) = args.base_url {
        client = client.with_base_url(base);
    }

    let data = client.fetch_park_data()?;

    let mut state = MapState::new();
    state.states.set(data.states.clone());
    let extent = args
        .domain_column
        .as_deref()
        .and_then(|c| stats::column_extent(&data.parks_data, c));
    if let Some(domain) = extent {
        store::update_color_scale_domain(&mut state.color_scale, domain);
    }

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("json"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_parks_csv(&data.parks_data, path)?,
            "json" => storage::save_json(&data, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} parks to {}", data.parks_data.len(), path.display());
    }

    if let Some(svg_path) = args.svg.as_ref() {
        let opts = SvgOptions {
            color_column: args.domain_column.clone(),
            scale: *state.color_scale.get(),
            ..SvgOptions::default()
        };
        storage::save_svg(&data, svg_path, &opts)?;
        eprintln!("Wrote map to {}", svg_path.display());
    }

    if args.stats {
        let s = stats::summarize(&data.parks_data);
        println!(
            "states={} border_lines={}  parks={} projected={} unprojected={}",
            state.states.get().len(),
            data.mesh.0.len(),
            s.rows,
            s.projected,
            s.unprojected
        );
        if let (Some(col), Some([lo, hi])) = (args.domain_column.as_deref(), extent) {
            println!(
                "{}: min={} max={}",
                col,
                format::format_visitor_count_locale(lo.max(0.0).round() as u64, &args.locale),
                format::format_visitor_count_locale(hi.max(0.0).round() as u64, &args.locale)
            );
        }
    }

    Ok(())
}
