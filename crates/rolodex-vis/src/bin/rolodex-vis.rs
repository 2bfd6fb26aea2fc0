//! Rolodex list playback demo
//!
//! Builds a contact list, runs one search or sort on a headless stage and
//! prints the run metrics as JSON.
//!
//! ```text
//! rolodex-vis [count] [linear|binary|sort|instant] [target] [--config file.json] [--speed instant]
//! ```

use std::env;
use std::sync::Arc;

use rolodex_algo::{by_name, Algorithm, Record, RecordList, RunMetrics};
use rolodex_vis::{HeadlessStage, ListDriver, PlaybackSpeed, TransitionMode, VisConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bruno", "Chloe", "Dmitri", "Esme", "Farid", "Greta", "Hiro", "Imani", "Jonas", "Kira", "Luca", "Mara",
    "Nils", "Odile", "Pavel", "Quinn", "Rosa", "Sami", "Tove",
];

const LAST_NAMES: &[&str] = &["Abbott", "Brandt", "Castro", "Dubois", "Eriksen", "Fischer", "Gallo"];

/// Deterministic, unsorted contact list.
fn contacts(count: usize) -> rolodex_algo::Result<RecordList> {
    let records = (0..count)
        .map(|i| {
            // Stride through the name tables so the list starts out shuffled.
            let first = FIRST_NAMES[(i * 7) % FIRST_NAMES.len()];
            let last = LAST_NAMES[(i * 3) % LAST_NAMES.len()];
            Record::new(i as u64 + 1, format!("{first} {last}"))
                .with_field("phone_number", format!("+1-555-{:04}", (i * 37) % 10_000))
        })
        .collect();
    RecordList::new(records)
}

struct Args {
    count: usize,
    operation: String,
    target: Option<String>,
    config: Option<String>,
    speed: Option<String>,
}

fn parse_args() -> Args {
    let mut positional = Vec::new();
    let mut config = None;
    let mut speed = None;
    let mut raw = env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--config" => config = raw.next(),
            "--speed" => speed = raw.next(),
            _ => positional.push(arg),
        }
    }

    Args {
        count: positional.first().and_then(|s| s.parse().ok()).unwrap_or(20),
        operation: positional.get(1).cloned().unwrap_or_else(|| "sort".to_string()),
        target: positional.get(2).cloned(),
        config,
        speed,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rolodex_vis=info,rolodex_algo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args();

    let mut config = match &args.config {
        Some(path) => VisConfig::from_file(path)?,
        None => VisConfig::default(),
    };
    if let Some(speed) = &args.speed {
        let speed: PlaybackSpeed = serde_json::from_value(serde_json::Value::String(speed.clone()))?;
        config = config.with_speed(speed);
    }

    let records = contacts(args.count)?;
    let target = args
        .target
        .clone()
        .or_else(|| records.get(records.len() / 2).map(|r| r.name.clone()))
        .unwrap_or_default();

    tracing::info!("Running {} over {} contacts", args.operation, records.len());

    let stage = Arc::new(HeadlessStage::new(&config, TransitionMode::Immediate));
    let driver = ListDriver::new(records, stage, config);

    let metrics = match args.operation.as_str() {
        "linear" => RunMetrics::from_search(Algorithm::LinearSearch, &driver.linear_search(&target).await),
        "binary" => {
            driver.instant_sort_by(by_name).await?;
            RunMetrics::from_search(Algorithm::BinarySearch, &driver.binary_search(&target).await)
        }
        "instant" => RunMetrics::from_sort(Algorithm::InstantSort, &driver.instant_sort_by(by_name).await?),
        "sort" => RunMetrics::from_sort(Algorithm::QuickSort, &driver.sort_by_name(false).await?),
        other => return Err(format!("unknown operation {other:?}, expected linear, binary, sort or instant").into()),
    };

    println!("{}", serde_json::to_string_pretty(&metrics)?);

    Ok(())
}
