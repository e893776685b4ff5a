//! # eid-card CLI
//!
//! Command-line interface for composing and sharing greeting cards.
//!
//! ## Usage
//!
//! ```bash
//! # List templates
//! eid-card templates
//!
//! # Compose template 4 with a name and a two-line note
//! eid-card compose --template 4 --name Rahim --note "Eid Mubarak" --note "See you soon" -o card.svg
//!
//! # Share link (copied to the clipboard), QR code, PNG
//! eid-card share --template 4 --name Rahim
//! eid-card qr --template 4 --name Rahim -o out/
//! eid-card export --template 4 --name Rahim -o out/
//!
//! # Render a received link read-only
//! eid-card receive 'http://localhost:8080/?name=Rahim&id=4' -o card.svg
//!
//! # Interactive editing session
//! eid-card edit --preview preview.svg
//!
//! # Host the template and font files
//! eid-card serve --listen 0.0.0.0:8080
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

use eid_card::{
    CardError, CardState,
    config::AppConfig,
    export::{self, Download, clipboard::SystemClipboard},
    link,
    loader::{self, Selected, Surface, TemplateLoader},
    logging, selection,
    server::{self, ServerConfig},
    template,
};

/// eid-card - Greeting card composer
#[derive(Parser, Debug)]
#[command(name = "eid-card")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Asset source: "embedded", a directory, or an http(s) URL
    #[arg(long, global = true, value_name = "SOURCE")]
    assets: Option<String>,

    /// Page that share links and QR codes point at
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// The card to work on.
#[derive(Args, Debug, Clone)]
struct CardArgs {
    /// Template id (1-based)
    #[arg(short, long, default_value = "1")]
    template: u32,

    /// Name shown at the bottom of the card
    #[arg(short, long, default_value = "")]
    name: String,

    /// Note line (repeat for several lines)
    #[arg(long)]
    note: Vec<String>,
}

impl CardArgs {
    fn state(&self) -> Result<CardState, CardError> {
        CardState::for_id(self.template, self.name.clone(), self.note.join("\n"))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available templates
    Templates,

    /// Compose a card and write the SVG
    Compose {
        #[command(flatten)]
        card: CardArgs,

        /// Render like a received link (explicit pixel size)
        #[arg(long = "static")]
        static_mode: bool,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the share link and copy it to the clipboard
    Share {
        #[command(flatten)]
        card: CardArgs,

        /// Only print the link
        #[arg(long)]
        no_clipboard: bool,
    },

    /// Save a QR code of the share link
    Qr {
        #[command(flatten)]
        card: CardArgs,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,
    },

    /// Save the card as a PNG
    Export {
        #[command(flatten)]
        card: CardArgs,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Also save a self-contained SVG with embedded fonts
        #[arg(long)]
        svg: bool,
    },

    /// Render a share link read-only
    Receive {
        /// The share link
        url: String,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Interactive editing session
    Edit {
        /// File the live preview is written to
        #[arg(long, value_name = "FILE", default_value = "preview.svg")]
        preview: PathBuf,
    },

    /// Host the template and font files over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,

        /// Serve this directory instead of the embedded assets
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CardError> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = AppConfig::new(cli.assets.as_deref(), cli.base_url.as_deref())?;

    match cli.command {
        Commands::Templates => {
            println!("Available templates:");
            for t in template::TEMPLATES {
                println!("  {}  {:<26} text {}", t.id(), t.path, t.text_color());
            }
        }

        Commands::Compose {
            card,
            static_mode,
            output,
        } => {
            let state = card.state()?;
            let markup = if static_mode {
                let shared = link::SharedCard {
                    template: state.template(),
                    name: state.name.clone(),
                    note: state.note.clone(),
                };
                loader::render_shared(config.assets.source()?.as_ref(), &shared).await?
            } else {
                compose_state(&config, &state).await?.1
            };
            write_output(output.as_deref(), &markup)?;
        }

        Commands::Share { card, no_clipboard } => {
            let state = card.state()?;
            if no_clipboard {
                println!("{}", link::encode(&config.base_url, &state)?);
            } else {
                let mut clipboard = SystemClipboard::open()?;
                let url = export::clipboard::share_to_clipboard(
                    &config.base_url,
                    &state,
                    &mut clipboard,
                )?;
                println!("Shareable link copied to clipboard:\n{}", url);
            }
        }

        Commands::Qr { card, output } => {
            let state = card.state()?;
            let download = export::qr::share_qr(&config.base_url, &state)?;
            report_saved(&download, &output)?;
        }

        Commands::Export { card, output, svg } => {
            let state = card.state()?;
            let (source, markup) = compose_state(&config, &state).await?;
            let now = chrono::Utc::now().timestamp_millis();

            let png = export::png::export_png(source.clone(), &markup, &state, now).await?;
            report_saved(&png, &output)?;
            if svg {
                let standalone = export::png::export_svg(source, &markup, &state, now).await?;
                report_saved(&standalone, &output)?;
            }
        }

        Commands::Receive { url, output } => {
            let url = Url::parse(&url)
                .map_err(|_| CardError::MissingInput(link::INVALID_LINK))?;
            let card = link::decode(&url)?;
            let markup = loader::render_shared(config.assets.source()?.as_ref(), &card).await?;
            write_output(output.as_deref(), &markup)?;
        }

        Commands::Edit { preview } => edit_session(&config, &preview).await?,

        Commands::Serve { listen, dir } => {
            server::serve(ServerConfig {
                listen_addr: listen,
                asset_dir: dir,
            })
            .await?;
        }
    }

    Ok(())
}

/// Load `state` through an editing session and return the composed markup.
async fn compose_state(
    config: &AppConfig,
    state: &CardState,
) -> Result<(Arc<dyn eid_card::assets::AssetSource>, String), CardError> {
    let source = config.assets.source()?;
    let loader = TemplateLoader::new(source.clone());
    loader.set_text(state.name.clone(), state.note.clone()).await;
    loader.select(state.ordinal()).await;

    match loader.surface().await {
        Surface::Card(markup) => Ok((source, markup)),
        Surface::Error(message) => Err(CardError::Fetch(message)),
        Surface::Blank => Err(CardError::Fetch("template did not load".into())),
    }
}

fn write_output(path: Option<&Path>, markup: &str) -> Result<(), CardError> {
    match path {
        Some(path) => {
            std::fs::write(path, markup)?;
            println!("Saved to {}", path.display());
        }
        None => println!("{}", markup),
    }
    Ok(())
}

fn report_saved(download: &Download, dir: &Path) -> Result<(), CardError> {
    std::fs::create_dir_all(dir)?;
    let path = download.save_in(dir)?;
    println!("Saved to {}", path.display());
    Ok(())
}

const EDIT_HELP: &str = "\
Commands:
  name <text>       set the name
  note <text>       set the note (use \\n for a new line)
  next | prev       switch template
  select <id>       jump to template id
  list              show the template strip
  share             copy the share link to the clipboard
  qr [dir]          save a QR code of the share link
  export [dir]      save the card as PNG
  help              this text
  quit              leave";

/// Line-oriented editor: every change recomposes and rewrites the preview.
async fn edit_session(config: &AppConfig, preview: &Path) -> Result<(), CardError> {
    let source = config.assets.source()?;
    let loader = TemplateLoader::new(source.clone());
    loader.select(0).await;
    refresh_preview(&loader, preview).await?;

    println!("{}", EDIT_HELP);
    println!("{}", selection::render_strip(0));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => continue,
            "quit" | "exit" => break,
            "help" => println!("{}", EDIT_HELP),
            "name" => loader.set_name(rest).await,
            "note" => loader.set_note(rest.replace("\\n", "\n")).await,
            "next" => report_selection(loader.next().await),
            "prev" => report_selection(loader.previous().await),
            "select" => match rest.trim().parse::<usize>() {
                Ok(id) if id >= 1 => report_selection(loader.select(id - 1).await),
                _ => println!("Usage: select <id>"),
            },
            "list" => {
                let state = loader.state().await;
                if selection::arrows_visible() {
                    println!("◀ {} ▶", selection::render_strip(state.ordinal()));
                } else {
                    println!("{}", selection::render_strip(state.ordinal()));
                }
                println!("text color {}", loader.text_color().await);
            }
            "share" => {
                let state = loader.state().await;
                let result = SystemClipboard::open().and_then(|mut clipboard| {
                    export::clipboard::share_to_clipboard(&config.base_url, &state, &mut clipboard)
                });
                match result {
                    Ok(url) => println!("Shareable link copied to clipboard:\n{}", url),
                    Err(e) => println!("{}", e.user_message()),
                }
            }
            "qr" => {
                let state = loader.state().await;
                let dir = output_dir(rest);
                match export::qr::share_qr(&config.base_url, &state) {
                    Ok(download) => report_saved(&download, &dir)?,
                    Err(e) => println!("{}", e.user_message()),
                }
            }
            "export" => {
                let state = loader.state().await;
                let Some(markup) = loader.surface().await.markup().map(str::to_string) else {
                    log::error!("No composed card to export");
                    continue;
                };
                let now = chrono::Utc::now().timestamp_millis();
                match export::png::export_png(source.clone(), &markup, &state, now).await {
                    Ok(download) => report_saved(&download, &output_dir(rest))?,
                    Err(e) => println!("{}", e.user_message()),
                }
            }
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }

        refresh_preview(&loader, preview).await?;
    }

    Ok(())
}

fn output_dir(arg: &str) -> PathBuf {
    match arg.trim() {
        "" => PathBuf::from("."),
        dir => PathBuf::from(dir),
    }
}

fn report_selection(selected: Selected) {
    match selected {
        Selected::Applied | Selected::Superseded => {}
        Selected::Rejected => println!("No such template."),
        Selected::Failed => println!("Template failed to load."),
    }
}

async fn refresh_preview(loader: &TemplateLoader, preview: &Path) -> Result<(), CardError> {
    match loader.surface().await {
        Surface::Card(markup) => std::fs::write(preview, markup)?,
        Surface::Error(message) => println!("{}", message),
        Surface::Blank => {}
    }
    Ok(())
}
