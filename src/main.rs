mod app;
mod audio;
mod config;
mod input;
mod lyrics;
mod recognize;
mod session;
mod song;
mod storage;
mod sync;
mod tui;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "lyrid", version, about = "Ambient lyrics display: hears the room, shows the words")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive TUI (default).
    Tui {
        /// Start in compact layout (current line only).
        #[arg(long)]
        compact: bool,
        /// Input device name (see `lyrid devices`).
        #[arg(long)]
        device: Option<String>,
    },
    /// List audio input devices.
    Devices,
    /// Capture one sample and print the identified song (headless).
    Recognize {
        #[arg(long)]
        device: Option<String>,
    },
    /// Fetch lyrics for a song and print to stdout (headless).
    Lyrics { artist: String, title: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    let cfg_path = match cli.config.clone() {
        Some(p) => p,
        None => config::default_config_path().context("default config path")?,
    };

    match cli.command.unwrap_or(Command::Tui {
        compact: false,
        device: None,
    }) {
        Command::Tui { compact, device } => {
            let mut cfg = cfg;
            if compact {
                cfg.ui.compact = true;
            }
            if device.is_some() {
                cfg.audio.device = device;
            }
            let mut terminal = tui::TerminalGuard::enter().context("init terminal")?;
            let mut app = app::App::new(cfg, cfg_path)?;
            app.run(terminal.terminal_mut()).await?;
        }
        Command::Devices => {
            for name in audio::list_input_devices()? {
                println!("{name}");
            }
        }
        Command::Recognize { device } => {
            cfg.recognition.validate()?;
            let acr = recognize::AcrClient::new(
                &cfg.recognition.host,
                &cfg.recognition.access_key,
                &cfg.recognition.access_secret,
            )?;
            let sampler = audio::Sampler::new(
                device.or(cfg.audio.device.clone()),
                cfg.recognition.sample_rate,
                cfg.recognition.record_secs,
            );

            eprintln!("Recording {}s sample...", cfg.recognition.record_secs);
            let samples = tokio::task::spawn_blocking(move || sampler.capture())
                .await
                .context("capture task")??;
            let level = audio::rms(&samples);
            if level < cfg.silence.rms_threshold {
                println!("Silence (rms {level:.0})");
                return Ok(());
            }

            let wav = audio::wav_bytes(&samples, cfg.recognition.sample_rate)?;
            match acr.identify(wav).await? {
                recognize::RecognitionOutcome::Match(m) => {
                    println!(
                        "{}  [{} / {} ms in]",
                        m.song, m.play_offset_ms, m.duration_ms
                    );
                }
                recognize::RecognitionOutcome::NoMatch => println!("No match"),
            }
        }
        Command::Lyrics { artist, title } => {
            let client = lyrics::LrclibClient::new()?;
            let song = song::SongId::new(&artist, &title);
            match lyrics::fetch_lyrics(&client, &song).await? {
                Some(fetched) => print!("{}", fetched.raw),
                None => println!("No lyrics found for {song}"),
            }
        }
    }

    Ok(())
}
