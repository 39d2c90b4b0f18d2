use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use stegapix::{capacity, wav, EncodingMode, PixelBuffer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// stegapix - hide text, images and audio inside PNG images
#[derive(Parser)]
#[command(name = "stegapix")]
#[command(version)]
#[command(about = "LSB steganography for PNG carriers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Text, 1 bit per RGB channel
    Text,
    /// Secret image, top 2 bits per RGB channel
    Image,
    /// Raw PCM or a 16-bit WAV file, 1 bit per RGBA channel
    Audio,
}

impl From<Mode> for EncodingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Text => EncodingMode::TextLsb1,
            Mode::Image => EncodingMode::ImageLsb2,
            Mode::Audio => EncodingMode::AudioLsb4,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a payload inside a carrier image
    Encode {
        /// Carrier PNG
        #[arg(short, long)]
        carrier: PathBuf,

        /// Output stego PNG
        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        mode: Mode,

        /// Secret message (text mode)
        #[arg(long, conflicts_with = "file")]
        message: Option<String>,

        /// Payload file: secret image, audio, or text
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Recover a payload from a stego image
    Decode {
        /// Stego PNG
        #[arg(short, long)]
        stego: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        mode: Mode,

        /// Where to write the payload (stdout for text if omitted)
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,
    },
    /// Show how much each mode can hide in an image
    Capacity {
        #[arg(short, long)]
        image: PathBuf,
    },
}

/// Refuse anything but .png for outputs: lossy formats destroy hidden bits
fn validate_png_output(path: &Path) -> anyhow::Result<()> {
    match path.extension().map(|e| e.to_string_lossy().to_lowercase()) {
        Some(ext) if ext == "png" => Ok(()),
        Some(ext) => Err(anyhow!(
            "'.{ext}' output is not supported; stego images must be saved as PNG (e.g. change '{}' to 'stego.png')",
            path.display()
        )),
        None => Err(anyhow!("output file must have a .png extension")),
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

/// Zero bytes end an audio stream, so nudge the samples holding them
fn terminator_safe(mut pcm: Vec<u8>) -> Vec<u8> {
    let changed = wav::avoid_zero_bytes(&mut pcm);
    if changed > 0 {
        warn!(
            "{} of {} PCM samples contained a zero byte and were nudged to the nearest safe value",
            changed,
            pcm.len() / 2
        );
    }
    pcm
}

fn read_payload(
    mode: EncodingMode,
    message: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<Vec<u8>> {
    match (message, file) {
        (Some(msg), _) => {
            if mode != EncodingMode::TextLsb1 {
                warn!("--message given for {} mode; embedding its UTF-8 bytes", mode);
            }
            Ok(msg.into_bytes())
        }
        (None, Some(path)) => {
            info!("reading payload from {}", path.display());
            let bytes = fs::read(&path)
                .with_context(|| format!("failed to read payload {}", path.display()))?;
            if mode == EncodingMode::AudioLsb4 && is_wav(&path) {
                let pcm = wav::pcm_from_wav(&bytes)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                info!("extracted {} PCM bytes from wav", pcm.len());
                return Ok(terminator_safe(pcm));
            }
            if mode == EncodingMode::AudioLsb4 {
                return Ok(terminator_safe(bytes));
            }
            Ok(bytes)
        }
        (None, None) => bail!("please provide either --message or --file"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stegapix=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            carrier,
            output,
            mode,
            message,
            file,
        } => {
            let mode = EncodingMode::from(mode);
            validate_png_output(&output)?;

            info!("loading carrier {}", carrier.display());
            let carrier_bytes = fs::read(&carrier)
                .with_context(|| format!("failed to read carrier {}", carrier.display()))?;
            let payload = read_payload(mode, message, file)?;

            let stego = stegapix::encode(&carrier_bytes, &payload, mode)
                .with_context(|| format!("failed to embed {} payload", mode))?;

            fs::write(&output, &stego)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("stego image saved to {}", output.display());
        }

        Commands::Decode {
            stego,
            mode,
            output,
        } => {
            let mode = EncodingMode::from(mode);
            info!("loading stego image {}", stego.display());
            let stego_bytes = fs::read(&stego)
                .with_context(|| format!("failed to read {}", stego.display()))?;

            let payload = stegapix::decode(&stego_bytes, mode)
                .with_context(|| format!("failed to recover {} payload", mode))?;

            match (output, mode) {
                (Some(path), _) => {
                    fs::write(&path, &payload)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("{} bytes written to {}", payload.len(), path.display());
                }
                (None, EncodingMode::TextLsb1) => match String::from_utf8(payload) {
                    Ok(text) => println!("{text}"),
                    Err(e) => bail!(
                        "payload is binary ({} bytes); use --output to save it",
                        e.as_bytes().len()
                    ),
                },
                (None, _) => bail!("{} payloads are binary; use --output to save them", mode),
            }
        }

        Commands::Capacity { image } => {
            let bytes = fs::read(&image)
                .with_context(|| format!("failed to read {}", image.display()))?;
            let buffer = PixelBuffer::from_image(&bytes)?;

            println!("{}: {}x{}", image.display(), buffer.width(), buffer.height());
            for mode in EncodingMode::ALL {
                let max = capacity::max_payload_bytes(&buffer, mode);
                match mode {
                    EncodingMode::ImageLsb2 => println!(
                        "  {:<6} secret image resampled to {}x{}",
                        mode,
                        buffer.width(),
                        buffer.height()
                    ),
                    _ => println!("  {:<6} {} bytes", mode, max.saturating_sub(1)),
                }
            }
        }
    }

    Ok(())
}
