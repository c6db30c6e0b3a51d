use anyhow::Context;
use ext2::Image;
use std::env;
use std::io::BufWriter;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Wrong number of arguments.
const EXIT_USAGE: i32 = 1;
/// The image could not be opened, or its metadata could not be read.
const EXIT_FAILURE: i32 = 2;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        let program = args.first().map_or("ext2dump", String::as_str);
        eprintln!("Usage: {program} <ext2_image_file>");
        std::process::exit(EXIT_USAGE);
    }

    if let Err(e) = run(&args[1]) {
        eprintln!("error: {e:#}");
        std::process::exit(EXIT_FAILURE);
    }
}

fn run(path: &str) -> anyhow::Result<()> {
    let image = Image::open(path).with_context(|| format!("failed to open {path}"))?;
    debug!(path, len = image.len(), "opened image");

    let stdout = std::io::stdout().lock();
    ext2dump::dump(image, BufWriter::new(stdout))
        .with_context(|| format!("failed to analyze {path}"))
}
