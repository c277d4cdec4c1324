use crate::logging::format::Formatter;
use anyhow::Context;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{Level, Metadata};
use tracing_subscriber::Layer;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

mod format;

const CRATE_TARGET: &str = "device_registry";

fn is_crate_target(metadata: &Metadata<'_>) -> bool {
    metadata.target().starts_with(CRATE_TARGET) || metadata.target().starts_with("tower_http")
}

/// Spans always pass so the request id reaches the formatter.
fn enabled(metadata: &Metadata<'_>, level: &Level) -> bool {
    metadata.is_span() || metadata.level() <= level
}

/// Installs the global subscriber.
///
/// Crate and `tower_http` events are written at `level`, to
/// `<dir>/device-registry.log` when a directory is given and to stdout
/// otherwise. Other targets are written to stdout at INFO and above.
pub fn registry_logs(level: Level, dir: Option<PathBuf>) -> anyhow::Result<()> {
    let mut layers = Vec::new();
    match dir {
        Some(dir) => {
            let path = dir.join("device-registry.log");
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file '{path:?}'"))?;
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .event_format(Formatter::new(false))
                .with_writer(Mutex::new(file))
                .with_filter(filter::filter_fn(move |metadata| {
                    is_crate_target(metadata) && enabled(metadata, &level)
                }));
            layers.push(file_layer.boxed());
        }
        None => {
            let stdio_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .event_format(Formatter::new(true))
                .with_filter(filter::filter_fn(move |metadata| {
                    is_crate_target(metadata) && enabled(metadata, &level)
                }));
            layers.push(stdio_layer.boxed());
        }
    }
    // general_layer
    {
        let general_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .event_format(Formatter::new(true))
            .with_filter(filter::filter_fn(move |metadata| {
                !is_crate_target(metadata) && enabled(metadata, &Level::INFO)
            }));
        layers.push(general_layer.boxed());
    }
    tracing_subscriber::registry()
        .with(layers)
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .with_context(|| "Failed to install tracing subscriber")?;
    Ok(())
}

