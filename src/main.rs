use aiu_assets::{brand, text::FontChain, Options};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[clap(
    name = "aiu-assets",
    about = "Generate the favicon and QR code images for the AIU Dance download page"
)]
struct Args {
    /// Logo placed in the middle of the favicons (text "AIU" is drawn when missing).
    #[clap(long, value_name = "FILE", default_value = brand::LOGO_PATH)]
    logo: PathBuf,

    /// TrueType font tried before the system fonts.
    #[clap(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Output directory for the favicons [default: ~/Downloads]
    #[clap(long, value_name = "DIR")]
    downloads: Option<PathBuf>,

    /// Output directory for the QR badge.
    #[clap(long, value_name = "DIR", default_value = "public")]
    public: PathBuf,

    /// Gradient colour at the rim of the badge (CSS color format)
    #[clap(long, default_value = "#9C0033")]
    primary_color: String,

    /// Gradient colour at the centre of the badge (CSS color format)
    #[clap(long, default_value = "#C00055")]
    secondary_color: String,

    /// Payload of the QR code.
    #[clap(long, default_value = brand::DOWNLOAD_URL)]
    url: String,

    /// First caption line under the QR code.
    #[clap(long, default_value = brand::QR_TITLE)]
    title: String,

    /// Second caption line under the QR code.
    #[clap(long, default_value = brand::QR_SUBTITLE)]
    subtitle: String,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// 96x96 Gmail favicon PNG
    Favicon,
    /// 16/32/48/64 favicon PNGs and the combined ICO
    Ico,
    /// QR code badge linking to the release APK
    Qr,
    /// Everything above
    All,
}

impl Args {
    fn options(&self) -> Options {
        let defaults = Options::default();
        Options {
            logo: self.logo.clone(),
            fonts: FontChain::new(self.font.clone()),
            downloads: self.downloads.clone().unwrap_or(defaults.downloads),
            public: self.public.clone(),
            palette: brand::Palette {
                primary: brand::parse_css_color(&self.primary_color, brand::PRIMARY),
                secondary: brand::parse_css_color(&self.secondary_color, brand::SECONDARY),
                outline: brand::WHITE,
            },
            url: self.url.clone(),
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = args.options();
    let command = args.command.unwrap_or(Command::All);

    if matches!(command, Command::Favicon | Command::All) {
        report_favicon(aiu_assets::generate_favicon_96(&options));
    }
    if matches!(command, Command::Ico | Command::All) {
        report_favicon(aiu_assets::generate_favicon_set(&options));
    }
    if matches!(command, Command::Qr | Command::All) {
        if let Err(err) = aiu_assets::generate_qr_badge(&options) {
            eprintln!("✗ Could not generate the QR code: {err:#}");
            eprintln!(
                "Hint: check that {} is writable and the URL is short enough for a QR code",
                options.public.display()
            );
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

/// Favicon failures are reported but never fail the run.
fn report_favicon(result: Result<PathBuf>) {
    if let Err(err) = result {
        log::error!("{err:#}");
    }
}
