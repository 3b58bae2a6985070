use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

use tileprint::{
    DOOR_TAGS_FILE_NAME, DoorTagSettings, Entry, Exporter, FitMode, LayoutRequest, LoadedImage,
    Orientation, POSTER_FILE_NAME, PaperPreset, PdfSink, PosterSettings, Settings,
};

#[derive(Parser, Debug)]
#[command(name = "tileprint", version, about = "Poster tiling and door-tag sheets")]
struct Cli {
    /// JSON settings file; command-line flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tile an image across pages and write a PDF.
    Poster(PosterArgs),
    /// Write door-tag sheets from a name list and optional photos.
    Tags(TagsArgs),
    /// Write a PNG preview of the poster canvas with tile boundaries.
    Preview(PreviewArgs),
    /// Print computed geometry as JSON.
    #[command(subcommand)]
    Layout(LayoutCommand),
}

#[derive(Subcommand, Debug)]
enum LayoutCommand {
    /// Poster tile geometry.
    Poster(PosterLayoutArgs),
    /// Door-tag cell geometry.
    Tags(TagsLayoutArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PaperArg {
    A4,
    Letter,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
    Auto,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FitArg {
    Cover,
    Contain,
}

#[derive(Args, Debug, Default)]
struct PageOpts {
    /// Paper size.
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,
    /// Page orientation.
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,
    /// Grid columns.
    #[arg(long)]
    columns: Option<u32>,
    /// Grid rows.
    #[arg(long)]
    rows: Option<u32>,
    /// Page margin in millimeters.
    #[arg(long)]
    margin_mm: Option<f64>,
    /// Output resolution.
    #[arg(long)]
    dpi: Option<u32>,
}

#[derive(Args, Debug)]
struct PosterOpts {
    #[command(flatten)]
    page: PageOpts,
    /// Overlap between adjacent tiles in millimeters.
    #[arg(long)]
    overlap_mm: Option<f64>,
    /// Fill the canvas (cover) or letterbox (contain).
    #[arg(long, value_enum)]
    fit: Option<FitArg>,
    /// Omit corner trim marks.
    #[arg(long, default_value_t = false)]
    no_trim_marks: bool,
}

#[derive(Args, Debug)]
struct TagOpts {
    #[command(flatten)]
    page: PageOpts,
    /// Gap between cells in millimeters.
    #[arg(long)]
    gutter_mm: Option<f64>,
    /// Label font size in points.
    #[arg(long)]
    label_pt: Option<f64>,
    /// Leave out the photo slot.
    #[arg(long, default_value_t = false)]
    no_photo: bool,
}

#[derive(Args, Debug)]
struct ThreadOpts {
    /// Worker threads for rendering.
    #[arg(long)]
    threads: Option<usize>,
    /// Pages rendered per batch.
    #[arg(long)]
    chunk_size: Option<usize>,
}

#[derive(Args, Debug)]
struct PosterArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,
    /// Output PDF path.
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(flatten)]
    opts: PosterOpts,
    #[command(flatten)]
    threads: ThreadOpts,
}

#[derive(Args, Debug)]
struct TagsArgs {
    /// Name list: `.csv` files use the "name" column, anything else is one name per line.
    #[arg(long)]
    names: PathBuf,
    /// Photo files, assigned to names round-robin.
    #[arg(long = "photo")]
    photos: Vec<PathBuf>,
    /// Output PDF path.
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(flatten)]
    opts: TagOpts,
    #[command(flatten)]
    threads: ThreadOpts,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
    /// Longest preview edge in pixels.
    #[arg(long, default_value_t = 1024)]
    max_edge: u32,
    #[command(flatten)]
    opts: PosterOpts,
}

#[derive(Args, Debug)]
struct PosterLayoutArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,
    #[command(flatten)]
    opts: PosterOpts,
}

#[derive(Args, Debug)]
struct TagsLayoutArgs {
    /// Name list, as for `tags`.
    #[arg(long)]
    names: PathBuf,
    /// Number of photos to assign round-robin.
    #[arg(long, default_value_t = 0)]
    photo_count: usize,
    #[command(flatten)]
    opts: TagOpts,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => tileprint::load_settings(path)?,
        None => Settings::default(),
    };
    match cli.cmd {
        Command::Poster(args) => cmd_poster(settings, args),
        Command::Tags(args) => cmd_tags(settings, args),
        Command::Preview(args) => cmd_preview(settings, args),
        Command::Layout(LayoutCommand::Poster(args)) => cmd_layout_poster(settings, args),
        Command::Layout(LayoutCommand::Tags(args)) => cmd_layout_tags(settings, args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_poster(settings: Settings, args: PosterArgs) -> anyhow::Result<()> {
    let poster = poster_settings(settings.poster, &args.opts);
    let image = tileprint::load_image(&args.image)?;
    let out = args.out.unwrap_or_else(|| PathBuf::from(POSTER_FILE_NAME));

    let exporter = Exporter::new(threading(settings.threading, &args.threads));
    let mut sink = PdfSink::new(&out);
    let stats = exporter.export_poster(&poster.to_request(), Some(&image), &mut sink)?;
    for advisory in &stats.advisories {
        eprintln!("note: {advisory}");
    }
    eprintln!(
        "wrote {} ({} pages at {} dpi)",
        out.display(),
        stats.pages,
        stats.effective_dpi
    );
    Ok(())
}

fn cmd_tags(settings: Settings, args: TagsArgs) -> anyhow::Result<()> {
    let tags = tag_settings(settings.door_tags, &args.opts);
    let photos = args
        .photos
        .iter()
        .map(|p| tileprint::load_image(p))
        .collect::<Result<Vec<LoadedImage>, _>>()?;
    let entries = read_entries(&args.names, photos.len())?;
    let out = args.out.unwrap_or_else(|| PathBuf::from(DOOR_TAGS_FILE_NAME));

    let exporter = Exporter::new(threading(settings.threading, &args.threads));
    let mut sink = PdfSink::new(&out);
    let stats = exporter.export_door_tags(&tags.to_request(), &entries, &photos, &mut sink)?;
    for advisory in &stats.advisories {
        eprintln!("note: {advisory}");
    }
    eprintln!(
        "wrote {} ({} names on {} pages)",
        out.display(),
        entries.len(),
        stats.pages
    );
    Ok(())
}

fn cmd_preview(settings: Settings, args: PreviewArgs) -> anyhow::Result<()> {
    let poster = poster_settings(settings.poster, &args.opts);
    let image = tileprint::load_image(&args.image)?;
    let layout = tileprint::compute_poster_layout(&poster.to_request(), Some(image.source))?;
    let preview = tileprint::render_preview(&layout, &image.pixels, args.max_edge);

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    preview
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_layout_poster(settings: Settings, args: PosterLayoutArgs) -> anyhow::Result<()> {
    let poster = poster_settings(settings.poster, &args.opts);
    let image = tileprint::load_image(&args.image)?;
    print_geometry(&LayoutRequest::Poster {
        request: poster.to_request(),
        source: Some(image.source),
    })
}

fn cmd_layout_tags(settings: Settings, args: TagsLayoutArgs) -> anyhow::Result<()> {
    let tags = tag_settings(settings.door_tags, &args.opts);
    let entries = read_entries(&args.names, args.photo_count)?;
    print_geometry(&LayoutRequest::DoorTags {
        request: tags.to_request(),
        entries,
    })
}

fn print_geometry(req: &LayoutRequest) -> anyhow::Result<()> {
    let geometry = tileprint::compute_layout(req)?;
    let json = serde_json::to_string_pretty(&geometry).context("serialize geometry")?;
    println!("{json}");
    Ok(())
}

fn read_entries(path: &Path, photo_count: usize) -> anyhow::Result<Vec<Entry>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read names '{}'", path.display()))?;
    let is_csv = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let labels = if is_csv {
        tileprint::parse_names_csv(&text)
    } else {
        tileprint::parse_name_list(&text)
    };
    Ok(tileprint::reconcile_entries(&[], labels, photo_count))
}

fn apply_page(
    opts: &PageOpts,
    paper: &mut PaperPreset,
    orientation: &mut Orientation,
    grid: (&mut u32, &mut u32),
    margin_mm: &mut f64,
    dpi: &mut u32,
) {
    if let Some(p) = opts.paper {
        *paper = match p {
            PaperArg::A4 => PaperPreset::A4,
            PaperArg::Letter => PaperPreset::Letter,
        };
    }
    if let Some(o) = opts.orientation {
        *orientation = match o {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
            OrientationArg::Auto => Orientation::Auto,
        };
    }
    if let Some(c) = opts.columns {
        *grid.0 = c;
    }
    if let Some(r) = opts.rows {
        *grid.1 = r;
    }
    if let Some(m) = opts.margin_mm {
        *margin_mm = m;
    }
    if let Some(d) = opts.dpi {
        *dpi = d;
    }
}

fn poster_settings(mut s: PosterSettings, opts: &PosterOpts) -> PosterSettings {
    apply_page(
        &opts.page,
        &mut s.paper,
        &mut s.orientation,
        (&mut s.columns, &mut s.rows),
        &mut s.margin_mm,
        &mut s.dpi,
    );
    if let Some(o) = opts.overlap_mm {
        s.overlap_mm = o;
    }
    if let Some(f) = opts.fit {
        s.fit = match f {
            FitArg::Cover => FitMode::Cover,
            FitArg::Contain => FitMode::Contain,
        };
    }
    if opts.no_trim_marks {
        s.trim_marks = false;
    }
    s.sanitized()
}

fn tag_settings(mut s: DoorTagSettings, opts: &TagOpts) -> DoorTagSettings {
    apply_page(
        &opts.page,
        &mut s.paper,
        &mut s.orientation,
        (&mut s.columns, &mut s.rows),
        &mut s.margin_mm,
        &mut s.dpi,
    );
    if let Some(g) = opts.gutter_mm {
        s.gutter_mm = g;
    }
    if let Some(l) = opts.label_pt {
        s.label_pt = l;
    }
    if opts.no_photo {
        s.include_photo = false;
    }
    s.sanitized()
}

fn threading(
    mut base: tileprint::RenderThreading,
    opts: &ThreadOpts,
) -> tileprint::RenderThreading {
    if let Some(t) = opts.threads {
        base.threads = Some(t);
    }
    if let Some(c) = opts.chunk_size {
        base.chunk_size = c;
    }
    base
}
