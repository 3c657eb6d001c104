use std::{
    ops::ControlFlow,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use sha2::Digest as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "nixie", version, about = "Render a Nixie tube clock face to PNG")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a widget-style timeline: one PNG per minute.
    Timeline(TimelineArgs),
    /// Re-render a PNG at every wall-clock minute.
    Watch(WatchArgs),
    /// Print the draw list for a frame as JSON.
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the bitmap bundle.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Hosting container: medium, extra-large or screen-saver.
    #[arg(long)]
    container: Option<String>,

    /// Hour cycle: auto, h12 or h24.
    #[arg(long)]
    hour_cycle: Option<String>,

    /// Container width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Container height in pixels (requires --width).
    #[arg(long)]
    height: Option<u32>,

    /// Font file for the AM/PM overlay and placeholder text.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Tube power state: on, off or env-off.
    #[arg(long)]
    power: Option<String>,

    /// Print the resolved font and the SHA-256 of its bytes.
    #[arg(long)]
    dump_font: bool,

    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Time to show as HH:MM (24-hour); defaults to now.
    #[arg(long)]
    time: Option<String>,

    /// Output PNG path.
    #[arg(long, default_value = "nixie.png")]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// First snapshot as HH:MM (24-hour); defaults to the current minute.
    #[arg(long)]
    start: Option<String>,

    /// Number of snapshots, one minute apart.
    #[arg(long, default_value_t = nixie::WIDGET_TIMELINE_ENTRIES)]
    count: usize,

    /// Output directory.
    #[arg(long = "out-dir", default_value = "nixie-timeline")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct WatchArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output PNG path, rewritten every minute.
    #[arg(long, default_value = "nixie.png")]
    out: PathBuf,

    /// Stop after this many frames.
    #[arg(long)]
    ticks: Option<u64>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Time to lay out as HH:MM (24-hour); defaults to now.
    #[arg(long)]
    time: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Timeline(args) => cmd_timeline(args),
        Command::Watch(args) => cmd_watch(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new(filter)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into())
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Defaults, then the settings file, then `NIXIE_*` variables, then flags.
fn resolve_config(common: &CommonArgs) -> anyhow::Result<nixie::NixieConfig> {
    let mut cfg = match &common.config {
        Some(path) => nixie::NixieConfig::load(path)?,
        None => nixie::NixieConfig::default(),
    };
    cfg.apply_env()?;

    if let Some(dir) = &common.assets {
        cfg.assets = Some(dir.clone());
    }
    if let Some(c) = &common.container {
        cfg.container = c.parse()?;
    }
    if let Some(h) = &common.hour_cycle {
        cfg.hour_cycle = h.parse()?;
    }
    if let Some(w) = common.width {
        cfg.width = Some(w);
    }
    if let Some(h) = common.height {
        cfg.height = Some(h);
    }
    if let Some(f) = &common.font {
        cfg.font = Some(f.clone());
    }
    if let Some(p) = &common.power {
        cfg.power = p.parse()?;
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Everything a render command needs, built once per invocation.
struct Face {
    cfg: nixie::NixieConfig,
    engine: nixie::LayoutEngine,
    view: nixie::ClockView,
    backend: nixie::CpuBackend,
    locale: nixie::LocaleObserver,
}

impl Face {
    fn prepare(common: &CommonArgs) -> anyhow::Result<Self> {
        let cfg = resolve_config(common)?;
        let bundle = nixie::DirBundle::new(cfg.asset_dir());
        let view = nixie::ClockView::load(&bundle, cfg.container)
            .with_context(|| format!("load assets from '{}'", cfg.asset_dir().display()))?;
        if view.is_placeholder() {
            eprintln!(
                "warning: incomplete bundle at '{}', rendering placeholder",
                cfg.asset_dir().display()
            );
        }

        let font = nixie::load_font(&cfg.font_source())?;
        if common.dump_font {
            dump_font_diagnostics(font.as_ref());
        }
        let backend = nixie::CpuBackend::new(cfg.render_settings(), font.as_ref())?;

        Ok(Self {
            engine: nixie::LayoutEngine::new(cfg.container).with_power(cfg.power),
            locale: nixie::LocaleObserver::new(cfg.hour_cycle.into_source()),
            view,
            backend,
            cfg,
        })
    }

    fn render(&mut self, reading: nixie::ClockReading) -> anyhow::Result<nixie::FrameRGBA> {
        Ok(nixie::render_frame(
            &self.engine,
            &self.view,
            &mut self.backend,
            self.cfg.container_size(),
            reading,
            self.locale.hour_cycle(),
        )?)
    }
}

fn parse_time_or_now(time: Option<&str>) -> anyhow::Result<nixie::ClockReading> {
    match time {
        Some(t) => Ok(t
            .parse::<nixie::ClockReading>()
            .with_context(|| format!("parse time '{t}'"))?),
        None => Ok(nixie::ClockReading::from_time(
            &nixie::TimeSource::now(&nixie::SystemClock),
        )),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    init_tracing(args.common.verbose);
    let reading = parse_time_or_now(args.time.as_deref())?;
    let mut face = Face::prepare(&args.common)?;
    let frame = face.render(reading)?;
    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    init_tracing(args.common.verbose);
    if args.count == 0 {
        anyhow::bail!("--count must be > 0");
    }

    let now = nixie::TimeSource::now(&nixie::SystemClock);
    let start = match args.start.as_deref() {
        Some(t) => {
            let reading: nixie::ClockReading =
                t.parse().with_context(|| format!("parse start '{t}'"))?;
            let time = chrono::NaiveTime::from_hms_opt(
                u32::from(reading.hour()),
                u32::from(reading.minute()),
                0,
            )
            .context("start time out of range")?;
            now.date().and_time(time)
        }
        None => nixie::minute_start(now),
    };

    let mut face = Face::prepare(&args.common)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    for (i, tick) in nixie::timeline(start, args.count).into_iter().enumerate() {
        let frame = face.render(tick.reading)?;
        let name = format!(
            "frame_{i:03}_{:02}{:02}.png",
            tick.reading.hour(),
            tick.reading.minute()
        );
        write_png(&args.out_dir.join(name), &frame)?;
    }
    eprintln!("wrote {} frames to {}", args.count, args.out_dir.display());
    Ok(())
}

fn cmd_watch(args: WatchArgs) -> anyhow::Result<()> {
    init_tracing(args.common.verbose);
    let mut face = Face::prepare(&args.common)?;
    let mut ticker = nixie::MinuteTicker::new(nixie::SystemClock, nixie::ThreadSleeper);
    let _sub = face.locale.subscribe(|cycle| {
        tracing::info!(?cycle, "hour cycle changed");
    });

    let out = args.out.clone();
    let delivered = ticker.run(args.ticks, |tick| {
        face.locale.refresh();
        let frame = nixie::render_frame(
            &face.engine,
            &face.view,
            &mut face.backend,
            face.cfg.container_size(),
            tick.reading,
            face.locale.hour_cycle(),
        )?;
        write_png(&out, &frame).map_err(nixie::NixieError::from)?;
        eprintln!("{} -> {}", tick.reading, out.display());
        Ok(ControlFlow::Continue(()))
    })?;

    tracing::debug!(delivered, "watch finished");
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    init_tracing(args.common.verbose);
    let cfg = resolve_config(&args.common)?;
    let reading = parse_time_or_now(args.time.as_deref())?;
    let locale = nixie::LocaleObserver::new(cfg.hour_cycle.into_source());

    let list = nixie::LayoutEngine::new(cfg.container)
        .with_power(cfg.power)
        .render(cfg.container_size(), reading, locale.hour_cycle())?;
    let json = serde_json::to_string_pretty(&list).context("serialize draw list")?;
    println!("{json}");
    Ok(())
}

fn write_png(path: &Path, frame: &nixie::FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn dump_font_diagnostics(font: Option<&nixie::LoadedFont>) {
    eprintln!("font diagnostics:");
    match font {
        Some(f) => {
            eprintln!("  origin: {}", f.origin);
            eprintln!("  index:  {}", f.index);
            eprintln!("  sha256: {}", sha256_hex(&f.bytes));
        }
        None => eprintln!("  none (text is skipped)"),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
