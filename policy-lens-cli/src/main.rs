mod report;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use policy_lens::{
    EngineConfig, HostSnapshot, ImprovementCatalog, PolicyEngine, TextComposer, TownFocus,
    summarize_improvements,
};
use report::{FocusSummary, LensReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "policy-lens", version)]
#[command(about = "Resolve active policy modifiers from a host table snapshot")]
struct Args {
    /// Host snapshot JSON: { "tables": {...}, "activeRules": [...], "locale": {...}, "city": {...} }
    #[arg(long)]
    snapshot: PathBuf,

    /// Engine configuration JSON (allow-list, label keys)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Include the fully resolved modifier graph
    #[arg(long)]
    resolved: bool,

    /// Verbose diagnostics (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let snapshot = load_snapshot(&args.snapshot)?;
    let config = load_config(args.config.as_deref())?;
    let report = build_report(&snapshot, config, args.resolved)?;

    let mut output_target = OutputTarget::new(args.output.clone())?;
    write_report(&mut output_target, args.report, &report)?;
    output_target.flush_inner()?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn load_snapshot(path: &Path) -> Result<HostSnapshot> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    HostSnapshot::from_json(&json)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    EngineConfig::from_json(&json)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn build_report(
    snapshot: &HostSnapshot,
    config: EngineConfig,
    include_resolved: bool,
) -> Result<LensReport> {
    let rules = snapshot.rules_provider();
    let composer = snapshot.locale.as_ref().map(|l| l as &dyn TextComposer);

    let mut engine = PolicyEngine::new(&snapshot.tables, &rules).with_config(config);
    if let Some(composer) = composer {
        engine = engine.with_composer(composer);
    }
    log::debug!(
        "allow-listed requirement types: {:?}",
        engine.config().allowed_requirement_types
    );

    let labels = engine.get_display_labels_for_active_rule_modifiers();
    let resolved = engine
        .get_resolved_modifiers_for_active_rules()
        .context("resolving active rules")?;
    log::debug!(
        "{} active rules, {} entries, {} labels",
        resolved.active_rule_count,
        resolved.entries.len(),
        labels.len()
    );

    Ok(LensReport {
        active_rule_count: resolved.active_rule_count,
        labels,
        summaries: focus_summaries(snapshot, composer),
        resolved: include_resolved.then_some(resolved),
    })
}

fn focus_summaries(
    snapshot: &HostSnapshot,
    composer: Option<&dyn TextComposer>,
) -> Vec<FocusSummary> {
    let Some(city) = &snapshot.city else {
        return Vec::new();
    };
    let catalog = ImprovementCatalog::default();
    [TownFocus::Food, TownFocus::Production]
        .into_iter()
        .filter_map(|focus| {
            summarize_improvements(
                &city.improvements,
                catalog.targets(focus),
                &catalog,
                composer,
                1,
                city.age.as_deref(),
            )
            .map(|summary| FocusSummary { focus, summary })
        })
        .collect()
}

fn write_report(out: &mut dyn Write, format: ReportFormat, report: &LensReport) -> Result<()> {
    match format {
        ReportFormat::Console => report::generate_console_report(out, report),
        ReportFormat::Json => report::generate_json_report(out, report),
        ReportFormat::Markdown => report::generate_markdown_report(out, report),
    }
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
