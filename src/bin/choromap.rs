use anyhow::Result;
use choromap::i18n::Catalog;
use choromap::{
    ChoroplethConfig, Choropleth, GeoJsonSurface, MapRenderer, PlottersSurface, RenderSurface,
};
use choromap::{provider, stats, storage};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, error, info};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "choromap",
    version,
    about = "Join regional indicator values onto boundaries and render a choropleth map"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Join values onto boundaries and draw the map (and optionally export and print stats).
    Render(RenderArgs),
    /// Print the legend for the configured palette.
    Legend(LegendArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct LocaleArgs {
    /// JSON configuration file (palette, borders, view, labels, ...).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Locale tag for number formatting (e.g., en, de, fr).
    #[arg(long, default_value = "en")]
    locale: String,
    /// Flat JSON object of translated strings for the locale.
    #[arg(long)]
    translations: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Boundary features (GeoJSON FeatureCollection).
    #[arg(long)]
    geojson: PathBuf,
    /// Indicator values: analytics JSON response, or CSV with dx,ou,value[,name].
    #[arg(long)]
    values: PathBuf,
    /// Map output: .svg or .png draws an image, .geojson or .json writes styled GeoJSON.
    #[arg(long)]
    out: PathBuf,
    #[command(flatten)]
    locale: LocaleArgs,
    /// Override the configured image width.
    #[arg(long)]
    width: Option<u32>,
    /// Override the configured image height.
    #[arg(long)]
    height: Option<u32>,
    /// Draw tooltip text on each region.
    #[arg(long, default_value_t = false)]
    labels: bool,
    /// Save the joined regions to file (format inferred by --format or extension).
    #[arg(long)]
    export: Option<PathBuf>,
    /// Export format (csv or json). If omitted, inferred from --export extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Print value statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

#[derive(Args, Debug)]
struct LegendArgs {
    #[command(flatten)]
    locale: LocaleArgs,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn load_config(path: Option<&Path>) -> Result<ChoroplethConfig> {
    match path {
        Some(p) => ChoroplethConfig::load_from_file(p),
        None => Ok(ChoroplethConfig::default()),
    }
}

fn load_catalog(args: &LocaleArgs) -> Result<Catalog> {
    match &args.translations {
        Some(path) => Catalog::from_json_file(&args.locale, path),
        None => Ok(Catalog::new(&args.locale)),
    }
}

fn is_geojson_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("geojson") || e.eq_ignore_ascii_case("json"))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Legend(args) => cmd_legend(args),
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let mut config = load_config(args.locale.config.as_deref())?;
    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    config.labels |= args.labels;
    let catalog = load_catalog(&args.locale)?;

    let state = provider::load_state(&args.geojson, &args.values, &config.feature_id);
    if state.is_ready() {
        info!(
            "loaded {} and {}",
            args.geojson.display(),
            args.values.display()
        );
    }
    let choropleth = Choropleth::new(&config, &catalog)?;
    let plan = choropleth.prepare(&state).inspect_err(|e| error!("{}", e))?;

    let renderer = MapRenderer::from_config(&config);
    debug!(
        "initial view {:?} zoom {}, legend {}",
        renderer.view().center,
        renderer.view().zoom,
        renderer.legend_position().control_name()
    );
    let mut surface: Box<dyn RenderSurface> = if is_geojson_path(&args.out) {
        Box::new(GeoJsonSurface::to_file(&args.out).with_tiles(config.tiles.clone()))
    } else {
        Box::new(PlottersSurface::from_config(&args.out, &config).with_title(&plan.title))
    };
    renderer.draw(&plan, surface.as_mut())?;
    eprintln!(
        "Wrote map of {} regions ({} without data) to {}",
        plan.regions.len(),
        plan.report.missing.len(),
        args.out.display()
    );

    if let Some(path) = args.export.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_csv(&plan, path)?,
            "json" => storage::save_json(&plan, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        info!("exported {} rows as {}", plan.regions.len(), fmt);
        eprintln!("Saved {} rows to {}", plan.regions.len(), path.display());
    }

    if args.stats {
        let s = stats::summarize(&plan);
        println!(
            "regions={} with_value={} missing={}  min={} max={} mean={} median={}",
            s.regions,
            s.with_value,
            s.missing,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
        for (entry, count) in plan.legend.iter().zip(s.per_bin.iter().rev()) {
            println!("  {} {:>12}  {}", entry.color, entry.range_label, count);
        }
    }
    Ok(())
}

fn cmd_legend(args: LegendArgs) -> Result<()> {
    let config = load_config(args.locale.config.as_deref())?;
    let catalog = load_catalog(&args.locale)?;
    let choropleth = Choropleth::new(&config, &catalog)?;
    for entry in choropleth.legend() {
        println!("{}  {}", entry.color, entry.range_label);
    }
    Ok(())
}
