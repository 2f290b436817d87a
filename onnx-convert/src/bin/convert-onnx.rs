use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use onnx_convert::convert_file;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

/// Convert an ONNX model into the binary model format.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The ONNX model to convert.
    model: PathBuf,

    /// Where to write the converted model.
    out_name: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .pretty()
        .compact()
        .with_level(true)
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Setting up logging failed")?;

    let args = Args::parse();

    let converted = convert_file(&args.model, &args.out_name)?;
    info!(
        output = %args.out_name.display(),
        bytes = converted.data.len(),
        warnings = converted.diagnostics.len(),
        "conversion finished"
    );
    Ok(())
}
