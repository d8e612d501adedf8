use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use field_props_core::{
    CartesianGrid, Deck, FieldPropsConfig, GridProperty, PropertyStore, PropertyValue,
};
use tracing_subscriber::EnvFilter;

/// Process a JSON deck and summarize its grid properties
#[derive(Parser, Debug)]
#[command(name = "props-inspect")]
#[command(about = "Field property deck inspector", long_about = None)]
struct Args {
    /// Deck file in JSON form
    deck: PathBuf,

    /// Processing switches in JSON form
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only report these keywords (repeatable)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,

    /// Skip the value limit check
    #[arg(long)]
    no_limits: bool,

    /// Print values in deck units instead of SI
    #[arg(long)]
    deck_units: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let deck: Deck = serde_json::from_str(&fs::read_to_string(&args.deck)?)?;

    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => FieldPropsConfig::default(),
    };
    if args.no_limits {
        config.check_limits = false;
    }

    let store = PropertyStore::from_deck(&deck, config)?;
    let grid = store.grid();

    println!("=== Field Properties ===\n");
    println!(
        "Grid: {}x{}x{} ({} active of {} cells), units: {:?}\n",
        grid.nx(),
        grid.ny(),
        grid.nz(),
        grid.num_active(),
        grid.cartesian_size(),
        store.units()
    );
    println!(
        "{:<10} {:>6} {:>14} {:>14} {:>10} {:>6}",
        "keyword", "type", "min", "max", "defaulted", "nan"
    );

    let wanted = |name: &str| args.keywords.is_empty() || args.keywords.iter().any(|k| k == name);

    for prop in store.int_properties().iter().filter(|p| wanted(p.keyword_name())) {
        let summary = Summary::of(prop, grid, f64::from);
        summary.print(prop.keyword_name(), "int");
    }

    for prop in store.double_properties().iter().filter(|p| wanted(p.keyword_name())) {
        let measure = prop.keyword_info().measure()?;
        let units = store.units();
        let summary = Summary::of(prop, grid, |v| {
            if args.deck_units {
                units.from_si(measure, v)
            } else {
                v
            }
        });
        summary.print(prop.keyword_name(), "double");
    }

    Ok(())
}

/// Statistics over the active cells of one property
struct Summary {
    min: Option<f64>,
    max: Option<f64>,
    defaulted: usize,
    nan: usize,
}

impl Summary {
    fn of<T: PropertyValue>(
        prop: &GridProperty<T>,
        grid: &CartesianGrid,
        convert: impl Fn(T) -> f64,
    ) -> Self {
        let mut summary = Self {
            min: None,
            max: None,
            defaulted: 0,
            nan: 0,
        };

        for &g in grid.active_map() {
            if prop.was_defaulted()[g] {
                summary.defaulted += 1;
            }
            let v = convert(prop.data()[g]);
            if v.is_nan() {
                summary.nan += 1;
                continue;
            }
            summary.min = Some(summary.min.map_or(v, |m| m.min(v)));
            summary.max = Some(summary.max.map_or(v, |m| m.max(v)));
        }
        summary
    }

    fn print(&self, name: &str, kind: &str) {
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.6e}"));
        println!(
            "{:<10} {:>6} {:>14} {:>14} {:>10} {:>6}",
            name,
            kind,
            fmt(self.min),
            fmt(self.max),
            self.defaulted,
            self.nan
        );
    }
}
