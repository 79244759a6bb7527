//! Command-line front end: classify image files with an exported ONNX model.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use classify_core::{Classifier, EngineConfig, LabelTable, OnnxLoader, Outcome, PipelineConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the exported ONNX model
    #[arg(long)]
    model: PathBuf,

    /// Path to the class label file (one label per line)
    #[arg(long)]
    labels: PathBuf,

    /// Input tensor name agreed at export time
    #[arg(long, default_value = "data")]
    input_name: String,

    /// Output tensor name; discovered from the model when omitted
    #[arg(long)]
    output_name: Option<String>,

    /// Edge length of the square input tensor
    #[arg(long, default_value_t = 224)]
    size: u32,

    /// Inference deadline in milliseconds
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,

    /// Memory-map the model file instead of reading it
    #[arg(long)]
    mmap: bool,

    /// Images to classify
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let labels = LabelTable::from_file(&args.labels)
        .with_context(|| format!("reading labels from {}", args.labels.display()))?;
    let engine = EngineConfig {
        input_name: args.input_name,
        output_name: args.output_name,
    };
    let mut loader = OnnxLoader::new(&args.model, engine);
    if args.mmap {
        loader = loader.with_mmap();
    }
    let config = PipelineConfig {
        target_size: args.size,
        timeout: Duration::from_millis(args.timeout_ms),
    };
    let classifier = Classifier::new(loader, labels, config);

    for path in &args.images {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                continue;
            }
        };
        match classifier.classify(&bytes).await {
            Ok(Outcome::Completed(prediction)) => {
                println!(
                    "{}: {} ({:.3})",
                    path.display(),
                    prediction.label,
                    prediction.score
                );
            }
            // Sequential requests are never superseded.
            Ok(Outcome::Superseded) => {}
            Err(err) => eprintln!("{}: classification failed: {err}", path.display()),
        }
    }
    Ok(())
}
