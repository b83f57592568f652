mod config;
mod image_loader;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use config::{Config, PresetConfig};
use dxt_squish::{ColourFitKind, Flags, Format, MetricKind};
use env_logger::Env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "dxt-squish", version, about = "DXT1/DXT3/DXT5 texture block compressor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress an image into raw DXT blocks
    Compress {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        options: CompressOptions,
    },
    /// Decode raw DXT blocks into a PNG
    Decompress {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(long)]
        format: Option<Format>,
        #[arg(long)]
        preset: Option<String>,
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Print image dimensions and compressed sizes
    Info { input: PathBuf },
    /// Compress every image matching a glob pattern
    Batch {
        pattern: String,
        out_dir: PathBuf,
        #[command(flatten)]
        options: CompressOptions,
    },
}

#[derive(Args, Debug, Default)]
struct CompressOptions {
    /// dxt1, dxt3 or dxt5
    #[arg(long)]
    format: Option<Format>,
    /// range, cluster or iterative
    #[arg(long)]
    fit: Option<ColourFitKind>,
    /// perceptual or uniform
    #[arg(long)]
    metric: Option<MetricKind>,
    /// Weight colour error by pixel alpha
    #[arg(long)]
    weight_by_alpha: bool,
    /// Named preset from the config file
    #[arg(long)]
    preset: Option<String>,
    /// Worker threads (default: all cores)
    #[arg(long)]
    threads: Option<usize>,
}

impl CompressOptions {
    fn overrides(&self) -> PresetConfig {
        PresetConfig {
            format: self.format,
            fit: self.fit,
            metric: self.metric,
            weight_by_alpha: self.weight_by_alpha.then_some(true),
            threads: self.threads,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logger with default level INFO
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Command::Compress {
            input,
            output,
            options,
        } => {
            let preset = config::resolve(
                config.as_ref(),
                options.preset.as_deref(),
                &options.overrides(),
            )?;
            with_threads(preset.threads, || compress_file(&input, &output, &preset))
        }
        Command::Decompress {
            input,
            output,
            width,
            height,
            format,
            preset,
            threads,
        } => {
            let overrides = PresetConfig {
                format,
                threads,
                ..Default::default()
            };
            let preset = config::resolve(config.as_ref(), preset.as_deref(), &overrides)?;
            with_threads(preset.threads, || {
                decompress_file(&input, &output, width, height, &preset)
            })
        }
        Command::Info { input } => print_info(&input),
        Command::Batch {
            pattern,
            out_dir,
            options,
        } => {
            let preset = config::resolve(
                config.as_ref(),
                options.preset.as_deref(),
                &options.overrides(),
            )?;
            with_threads(preset.threads, || compress_batch(&pattern, &out_dir, &preset))
        }
    }
}

/// Runs `f` on a dedicated rayon pool when a thread count is configured.
fn with_threads<T: Send>(
    threads: Option<usize>,
    f: impl FnOnce() -> Result<T> + Send,
) -> Result<T> {
    match threads {
        Some(threads) => {
            log::debug!("Using {} worker threads", threads);
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("Failed to build thread pool")?;
            pool.install(f)
        }
        None => f(),
    }
}

fn flags_for(preset: &PresetConfig) -> Flags {
    let settings = preset.settings();
    if settings.fit == ColourFitKind::IterativeCluster {
        log::warn!("Iterative cluster fit is normalised to the plain cluster fit");
    }
    settings.flags()
}

fn compress_file(input: &Path, output: &Path, preset: &PresetConfig) -> Result<()> {
    let flags = flags_for(preset);
    let image = image_loader::load_rgba8(input)?;
    let (width, height) = image.dimensions();

    let mut blocks = vec![0u8; dxt_squish::storage_requirements(width, height, flags)?];
    dxt_squish::compress_image(image.as_raw(), width, height, &mut blocks, flags)?;

    fs::write(output, &blocks).with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "Compressed {} ({}x{}) to {} as {} ({} bytes)",
        input.display(),
        width,
        height,
        output.display(),
        flags.format(),
        blocks.len()
    );
    Ok(())
}

fn decompress_file(
    input: &Path,
    output: &Path,
    width: u32,
    height: u32,
    preset: &PresetConfig,
) -> Result<()> {
    let flags = flags_for(preset);
    let blocks = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let expected = dxt_squish::storage_requirements(width, height, flags)?;
    if blocks.len() != expected {
        return Err(anyhow!(
            "{} holds {} bytes but a {}x{} {} image needs {}",
            input.display(),
            blocks.len(),
            width,
            height,
            flags.format(),
            expected
        ));
    }

    let mut rgba = vec![0u8; width as usize * height as usize * 4];
    dxt_squish::decompress_image(&mut rgba, width, height, &blocks, flags)?;
    image_loader::save_png(output, width, height, &rgba)?;

    log::info!("Decompressed {} to {}", input.display(), output.display());
    Ok(())
}

fn print_info(input: &Path) -> Result<()> {
    let image = image_loader::load_rgba8(input)?;
    let (width, height) = image.dimensions();

    println!("{}: {}x{}", input.display(), width, height);
    for format in Format::ALL {
        let size = format.blocks_byte_size(width, height)?;
        println!("  {:<5} {} bytes", format.name(), size);
    }
    Ok(())
}

fn compress_batch(pattern: &str, out_dir: &Path, preset: &PresetConfig) -> Result<()> {
    let inputs = image_loader::expand_pattern(pattern)?;
    let extension = preset.settings().format.name();

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    for input in &inputs {
        let stem = input
            .file_stem()
            .ok_or_else(|| anyhow!("{} has no file name", input.display()))?;
        let output = out_dir.join(stem).with_extension(extension);
        compress_file(input, &output, preset)?;
    }

    log::info!("Compressed {} images into {}", inputs.len(), out_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_png(path: &Path, width: u32, height: u32) -> Vec<u8> {
        let rgba: Vec<u8> = (0..width * height * 4).map(|v| (v * 13) as u8).collect();
        image_loader::save_png(path, width, height, &rgba).unwrap();
        rgba
    }

    #[test]
    fn test_cli_parses_compress_options() {
        let cli = Cli::try_parse_from([
            "dxt-squish",
            "compress",
            "in.png",
            "out.dxt",
            "--format",
            "dxt5",
            "--fit",
            "range",
            "--weight-by-alpha",
            "--threads",
            "3",
        ])
        .unwrap();

        let Command::Compress { options, .. } = cli.command else {
            panic!("expected compress");
        };
        let overrides = options.overrides();
        assert_eq!(overrides.format, Some(Format::Dxt5));
        assert_eq!(overrides.fit, Some(ColourFitKind::Range));
        assert_eq!(overrides.weight_by_alpha, Some(true));
        assert_eq!(overrides.threads, Some(3));
        assert_eq!(overrides.metric, None);
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let args = ["dxt-squish", "compress", "a", "b", "--format", "bc7"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_compress_then_decompress_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let packed = dir.path().join("in.dxt1");
        let output = dir.path().join("out.png");
        write_test_png(&input, 7, 5);

        let preset = PresetConfig {
            format: Some(Format::Dxt1),
            ..Default::default()
        };
        compress_file(&input, &packed, &preset).unwrap();
        assert_eq!(fs::read(&packed).unwrap().len(), 2 * 2 * 8);

        decompress_file(&packed, &output, 7, 5, &preset).unwrap();
        let decoded = image_loader::load_rgba8(&output).unwrap();
        assert_eq!(decoded.dimensions(), (7, 5));

        assert!(decompress_file(&packed, &output, 9, 5, &preset).is_err());
    }

    #[test]
    fn test_batch_writes_one_file_per_input() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png"] {
            write_test_png(&dir.path().join(name), 4, 4);
        }
        let out_dir = dir.path().join("out");
        let pattern = dir.path().join("*.png").to_string_lossy().to_string();

        let preset = PresetConfig {
            format: Some(Format::Dxt5),
            threads: Some(2),
            ..Default::default()
        };
        with_threads(preset.threads, || compress_batch(&pattern, &out_dir, &preset)).unwrap();

        assert_eq!(fs::read(out_dir.join("a.dxt5")).unwrap().len(), 16);
        assert_eq!(fs::read(out_dir.join("b.dxt5")).unwrap().len(), 16);
    }
}
