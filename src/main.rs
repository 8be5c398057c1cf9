mod app;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use commit_canvas::graph::Direction;
use commit_canvas::graph::cycle::DEFAULT_LAYERED_THRESHOLD;
use commit_canvas::history::{DEFAULT_CHUNK_SIZE, HistorySource};
use commit_canvas::settings::Settings;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    Vertical,
    Horizontal,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Vertical => Direction::Vertical,
            DirectionArg::Horizontal => Direction::Horizontal,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Repository to read history from.
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// JSON file with commit records; takes precedence over --repo.
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long)]
    max_commits: Option<usize>,

    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    #[arg(long, value_enum, default_value = "vertical")]
    direction: DirectionArg,

    /// Draw commit cards instead of dots.
    #[arg(long)]
    expanded: bool,

    #[arg(long)]
    color_by_author: bool,

    #[arg(long)]
    hide_merges: bool,

    /// Largest history laid out with the layered algorithm.
    #[arg(long, default_value_t = DEFAULT_LAYERED_THRESHOLD)]
    layout_threshold: usize,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            direction: self.direction.into(),
            compact: !self.expanded,
            color_by_author: self.color_by_author,
            hide_merge_commits: self.hide_merges,
            layered_threshold: self.layout_threshold,
        }
    }

    fn source(&self) -> HistorySource {
        match &self.input {
            Some(path) => HistorySource::Json(path.clone()),
            None => HistorySource::Git {
                repo: self.repo.clone(),
                max_commits: self.max_commits,
            },
        }
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let settings = args.settings();
    let source = args.source();
    let chunk_size = args.chunk_size.max(1);
    log::info!("opening {}", source.describe());

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "commit-canvas",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::CommitCanvasApp::new(
                cc, source, chunk_size, settings,
            )))
        }),
    )
}
