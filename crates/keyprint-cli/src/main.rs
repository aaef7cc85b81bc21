use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use keyprint_core::share::generate_share_code;
use keyprint_core::staff::{JsonFileStore, ScanCollector, ScanOutcome, StaffSession};
use keyprint_core::{
    HttpImageLoader, KioskOptions, Layout, SheetKind, SheetPlan, Template, decode_scanned,
};
use keyprint_runtime::{ExportFormat, export_sheet};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kpt", about = "Keyprint kiosk tools", version)]
struct Cli {
    /// Kiosk options file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a blank layout for a template as JSON
    Template {
        #[arg(value_enum)]
        template: TemplateArg,
    },

    /// Turn a layout file into a share link
    Encode {
        /// Layout JSON file
        #[arg(short, long)]
        layout: PathBuf,

        /// Origin the link points at (defaults to the configured origin)
        #[arg(long)]
        origin: Option<String>,

        /// Also write the QR code as a PNG
        #[arg(long)]
        qr: Option<PathBuf>,
    },

    /// Decode a scanned link, fragment or bare token
    Decode {
        text: String,

        /// Print the editable layout instead of the wire payload
        #[arg(long)]
        layout: bool,
    },

    /// Add scanned codes or photo links to a staff session
    Collect {
        /// Scanned text or photo link, one argument per card
        #[arg(required = true, num_args = 1..)]
        scans: Vec<String>,

        /// Session file (created when missing)
        #[arg(short, long)]
        session: PathBuf,
    },

    /// Render a print sheet from a staff session
    Export {
        #[arg(short, long)]
        session: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (defaults to the file extension, then the config)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Sheet to render (defaults to whatever the session is ready for)
        #[arg(long, value_enum)]
        sheet: Option<SheetArg>,
    },

    /// Run the image proxy
    Proxy {
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        #[arg(short, long, default_value = "8787")]
        port: u16,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TemplateArg {
    #[value(name = "4x5")]
    FourByFive,
    Cd3Simple,
    Cd3Panel,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
    Pdf,
}

#[derive(Clone, Copy, ValueEnum)]
enum SheetArg {
    FourUp,
    Cd,
}

impl From<TemplateArg> for Template {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::FourByFive => Self::FourByFive,
            TemplateArg::Cd3Simple => Self::Cd3Simple,
            TemplateArg::Cd3Panel => Self::Cd3Panel,
        }
    }
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => Self::Png,
            FormatArg::Jpeg => Self::Jpeg,
            FormatArg::Pdf => Self::Pdf,
        }
    }
}

impl From<SheetArg> for SheetKind {
    fn from(arg: SheetArg) -> Self {
        match arg {
            SheetArg::FourUp => Self::FourUp,
            SheetArg::Cd => Self::Cd,
        }
    }
}

async fn load_options(path: Option<&Path>) -> Result<KioskOptions> {
    match path {
        Some(path) => KioskOptions::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(KioskOptions::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let options = load_options(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Template { template } => {
            let layout = Layout::new(template.into());
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }

        Commands::Encode {
            layout,
            origin,
            qr,
        } => {
            let json = tokio::fs::read_to_string(&layout)
                .await
                .with_context(|| format!("Failed to read {}", layout.display()))?;
            let layout: Layout = serde_json::from_str(&json)?;
            let origin = origin.unwrap_or_else(|| options.app_origin.clone());
            let code = generate_share_code(&layout, &origin, &options.qr_encoder())?;
            if code.attempts > 1 {
                eprintln!(
                    "Embedded images were recompressed to fit a QR code ({} attempts)",
                    code.attempts
                );
            }
            if let Some(path) = qr {
                code.code
                    .save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("QR code written to {}", path.display());
            }
            println!("{}", code.url);
        }

        Commands::Decode { text, layout } => {
            let payload = decode_scanned(&text)?;
            if layout {
                println!("{}", serde_json::to_string_pretty(&payload.to_layout()?)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
        }

        Commands::Collect { scans, session } => {
            let store = JsonFileStore::open(&session).await?;
            let mut session = StaffSession::new(store);
            let mut collector = ScanCollector::from_session(&session);

            for scan in &scans {
                match collector.add_entry(scan) {
                    Ok(ScanOutcome::AddedFourUp { count }) => println!("Added 4x5 code ({count}/4)"),
                    Ok(ScanOutcome::AddedCd) => println!("Added CD code"),
                    Ok(ScanOutcome::Duplicate) => println!("Already collected"),
                    Ok(ScanOutcome::Full) => println!("Four-up sheet is full, code skipped"),
                    Err(e) if e.is_input_error() => eprintln!("Skipped unreadable code: {e}"),
                    Err(e) => return Err(e.into()),
                }
            }

            match collector.handoff(&mut session) {
                Ok(kind) => {
                    // A CD handoff should not drop 4x5 codes collected alongside it
                    if kind == SheetKind::Cd && !collector.four_up().is_empty() {
                        session.set_four_up(collector.four_up())?;
                    }
                    println!("Ready for the {} sheet", kind.file_stem());
                }
                Err(e) if e.is_input_error() => {
                    if !collector.four_up().is_empty() {
                        session.set_four_up(collector.four_up())?;
                    }
                    println!("{e}");
                }
                Err(e) => return Err(e.into()),
            }
            session.store().flush().await?;
        }

        Commands::Export {
            session,
            output,
            format,
            sheet,
        } => {
            let session = StaffSession::new(JsonFileStore::open(&session).await?);
            let kind = match sheet {
                Some(sheet) => sheet.into(),
                None => match ScanCollector::from_session(&session).ready_sheet() {
                    Some(kind) => kind,
                    None => bail!("Session has no sheet ready; collect more codes first"),
                },
            };
            let plan = SheetPlan::from_session(&session, kind)?;
            let format = format
                .map(ExportFormat::from)
                .or_else(|| ExportFormat::from_path(&output))
                .unwrap_or_else(|| options.export_format.into());

            let loader = Arc::new(HttpImageLoader::from_options(&options)?);
            let report = export_sheet(&plan, loader, &options, format, &output).await?;
            if let Some(warning) = report.warning() {
                eprintln!("{warning}");
            }
            println!(
                "Exported {} sheet ({}x{} px) → {}",
                kind.file_stem(),
                report.width_px,
                report.height_px,
                report.path.display()
            );
        }

        Commands::Proxy { host, port } => {
            let upstream = Arc::new(keyprint_proxy::UreqUpstream::new(Duration::from_secs(
                options.image_timeout_secs.max(1),
            )));
            keyprint_proxy::serve(SocketAddr::new(host, port), upstream).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_export_arguments() {
        let cli = Cli::try_parse_from([
            "kpt", "export", "--session", "s.json", "--output", "out.pdf", "--sheet", "cd",
            "--config", "kiosk.json",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("kiosk.json")));
        match cli.command {
            Commands::Export { sheet, format, .. } => {
                assert!(matches!(sheet, Some(SheetArg::Cd)));
                assert!(format.is_none());
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn template_names_match_wire_names() {
        let cli = Cli::try_parse_from(["kpt", "template", "4x5"]).unwrap();
        match cli.command {
            Commands::Template { template } => {
                assert_eq!(Template::from(template), Template::FourByFive)
            }
            _ => panic!("expected template"),
        }
        assert!(Cli::try_parse_from(["kpt", "template", "cd3-panel"]).is_ok());
        assert!(Cli::try_parse_from(["kpt", "template", "a4"]).is_err());
    }

    #[test]
    fn encode_takes_an_optional_qr_path() {
        let cli = Cli::try_parse_from(["kpt", "encode", "-l", "card.json", "--qr", "card.png"])
            .unwrap();
        match cli.command {
            Commands::Encode { qr, origin, .. } => {
                assert_eq!(qr.as_deref(), Some(Path::new("card.png")));
                assert!(origin.is_none());
            }
            _ => panic!("expected encode"),
        }
    }

    #[test]
    fn collect_accepts_photo_links() {
        let cli = Cli::try_parse_from([
            "kpt",
            "collect",
            "--session",
            "s.json",
            "https://img.example/a.png",
        ])
        .unwrap();
        match cli.command {
            Commands::Collect { scans, .. } => {
                let mut collector = ScanCollector::new();
                let outcome = collector.add_entry(&scans[0]).unwrap();
                assert_eq!(outcome, ScanOutcome::AddedFourUp { count: 1 });
            }
            _ => panic!("expected collect"),
        }
    }

    #[test]
    fn collect_needs_a_scan() {
        assert!(Cli::try_parse_from(["kpt", "collect", "--session", "s.json"]).is_err());
    }
}
