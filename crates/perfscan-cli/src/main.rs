//! perfscan CLI - analyze syntax-tree dumps for performance anti-patterns

use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ariadne::{Color, Label, Report as AriadneReport, ReportKind, Source};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use perfscan_adapter::{parse_sexp, SyntaxDump, SyntaxNode};
use perfscan_engine::{AnalysisError, AnalysisHints, AnalysisRequest, Analyzer, EngineConfig, Report};
use perfscan_findings::Finding;
use perfscan_isg::Language;
use perfscan_rules::{RuleRegistry, Severity};

#[derive(Parser)]
#[command(name = "perfscan")]
#[command(about = "Static performance and complexity analysis over parsed syntax trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one syntax-tree dump (.json or .sexp)
    Analyze {
        /// Input dump
        file: PathBuf,
        /// Language tag; overrides the dump's own
        #[arg(short, long)]
        lang: Option<String>,
        /// Hints file (TOML, or JSON with a .json extension)
        #[arg(long)]
        hints: Option<PathBuf>,
        /// Engine configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Original source text, for annotated output
        #[arg(short, long)]
        source: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze every dump under a directory
    Scan {
        /// Directory to walk for *.tree.json and *.sexp files
        dir: PathBuf,
        /// Language tag for dumps that do not carry one
        #[arg(short, long)]
        lang: Option<String>,
        /// Engine configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print one JSON report per line
        #[arg(long)]
        json: bool,
    },
    /// List the built-in rules
    Rules,
    /// List supported language tags
    Languages,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            lang,
            hints,
            config,
            source,
            json,
        } => cmd_analyze(&file, lang.as_deref(), hints.as_deref(), config.as_deref(), source.as_deref(), json),
        Commands::Scan { dir, lang, config, json } => cmd_scan(&dir, lang.as_deref(), config.as_deref(), json),
        Commands::Rules => cmd_rules(),
        Commands::Languages => cmd_languages(),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`)
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn cmd_analyze(
    file: &Path,
    lang: Option<&str>,
    hints: Option<&Path>,
    config: Option<&Path>,
    source: Option<&Path>,
    json: bool,
) {
    let analyzer = load_analyzer(config).unwrap_or_else(|e| fail(&e));
    let hints = match hints {
        Some(path) => load_hints(path).unwrap_or_else(|e| fail(&e)),
        None => AnalysisHints::default(),
    };
    let source = source.map(|path| match fs::read_to_string(path) {
        Ok(text) => (path.to_path_buf(), text),
        Err(e) => fail(&format!("Error reading {}: {}", path.display(), e)),
    });

    let report = match analyze_file(&analyzer, file, lang, hints) {
        Ok(report) => report,
        Err(e) => fail(&e),
    };

    if json {
        print_json(&report, true);
    } else {
        match &source {
            Some((path, text)) => render_annotated(&report, path, text),
            None => print_report(file, &report),
        }
    }

    if report.partial || report.has_critical() {
        std::process::exit(1);
    }
}

fn cmd_scan(dir: &Path, lang: Option<&str>, config: Option<&Path>, json: bool) {
    let analyzer = load_analyzer(config).unwrap_or_else(|e| fail(&e));
    let files = discover(dir);
    info!(dir = %dir.display(), files = files.len(), "discovered syntax-tree dumps");

    let mut failed = false;
    let mut critical = false;
    for file in &files {
        match analyze_file(&analyzer, file, lang, AnalysisHints::default()) {
            Ok(report) => {
                critical |= report.has_critical();
                failed |= report.partial;
                if json {
                    print_json(&report, false);
                } else {
                    print_report(file, &report);
                }
            }
            Err(e) => {
                eprintln!("✗ {}", e);
                failed = true;
            }
        }
    }

    if !json {
        println!("{} files analyzed", files.len());
    }
    if failed || critical {
        std::process::exit(1);
    }
}

fn cmd_rules() {
    println!("{:<30} {:<10} {:<14} TITLE", "ID", "SEVERITY", "CATEGORY");
    for rule in RuleRegistry::builtin().iter() {
        let meta = rule.meta();
        let languages = if meta.languages.is_empty() {
            String::new()
        } else {
            let tags: Vec<&str> = meta.languages.iter().map(|l| l.tag()).collect();
            format!(" [{}]", tags.join(", "))
        };
        println!(
            "{:<30} {:<10} {:<14} {}{}",
            meta.id,
            meta.severity.to_string(),
            meta.category.to_string(),
            meta.title,
            languages
        );
    }
}

fn cmd_languages() {
    for language in Language::ALL {
        println!("{}", language.tag());
    }
}

/// Dump files under `dir`, sorted so output order is stable
fn discover(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| is_dump(path))
        .collect();
    files.sort();
    files
}

fn is_dump(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.ends_with(".tree.json") || name.ends_with(".sexp")
}

fn load_analyzer(config: Option<&Path>) -> Result<Analyzer, String> {
    let config = match config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
            EngineConfig::from_toml(&text).map_err(|e| format!("{} [{}]: {}", path.display(), e.code(), e))?
        }
        None => EngineConfig::default(),
    };
    Analyzer::new(config).map_err(|e| format!("[{}] {}", e.code(), e))
}

fn load_hints(path: &Path) -> Result<AnalysisHints, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
    let parsed = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&text).map_err(|e| e.to_string())
    } else {
        toml::from_str(&text).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| format!("invalid hints in {}: {}", path.display(), e))
}

/// Read a dump; the language comes from the JSON envelope when present
fn load_dump(path: &Path) -> Result<(Option<String>, SyntaxNode), String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
    if path.extension().is_some_and(|ext| ext == "sexp") {
        let tree = parse_sexp(&text).map_err(|e| format!("{}: {}", path.display(), e))?;
        return Ok((None, tree));
    }
    let dump: SyntaxDump = serde_json::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok((dump.language, dump.tree))
}

/// `handler.py.sexp` names its language through the inner extension
fn language_from_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.trim_end_matches(".sexp").trim_end_matches(".tree.json").trim_end_matches(".json");
    let ext = Path::new(stem).extension()?.to_str()?;
    Language::from_tag(ext).map(|l| l.tag().to_string())
}

fn analyze_file(analyzer: &Analyzer, file: &Path, lang: Option<&str>, hints: AnalysisHints) -> Result<Report, String> {
    let started = Instant::now();
    let (dump_language, tree) = load_dump(file)?;
    let language = lang
        .map(str::to_string)
        .or(dump_language)
        .or_else(|| language_from_name(file))
        .ok_or_else(|| format!("{}: no language given; pass --lang", file.display()))?;

    let request = AnalysisRequest::new(&language, &tree).with_hints(hints);
    let result = analyzer.analyze(&request);
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(report) => {
            log_faults(file, &report);
            debug!(file = %file.display(), elapsed_ms, findings = report.findings.len(), "analyzed");
            Ok(report)
        }
        Err(AnalysisError::AnalysisTimeout { budget_ms, partial }) => {
            warn!(file = %file.display(), budget_ms, elapsed_ms, "analysis timed out; reporting partial results");
            log_faults(file, &partial);
            Ok(*partial)
        }
        Err(e) => Err(format!("{} [{}]: {}", file.display(), e.code(), e)),
    }
}

fn log_faults(file: &Path, report: &Report) {
    for fault in &report.faults {
        warn!(
            file = %file.display(),
            rule = fault.rule_id,
            line = fault.span.start_line,
            "rule fault: {}",
            fault.fault
        );
    }
}

fn print_report(file: &Path, report: &Report) {
    let marker = if report.partial { " (partial)" } else { "" };
    if report.findings.is_empty() {
        println!("✓ {} - no findings{}", file.display(), marker);
        return;
    }
    println!(
        "✗ {} - {} findings ({} critical, {} high){}",
        file.display(),
        report.findings.len(),
        report.count(Severity::Critical),
        report.count(Severity::High),
        marker
    );
    for finding in &report.findings {
        for line in finding.format_simple().lines() {
            println!("  {}", line);
        }
    }
}

fn print_json(report: &Report, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => fail(&format!("Error serializing report: {}", e)),
    }
}

/// Render findings against the original source text
fn render_annotated(report: &Report, path: &Path, source: &str) {
    let id = path.to_string_lossy().to_string();
    for finding in &report.findings {
        if let Err(e) = annotate(finding, &id, source).eprint((id.clone(), Source::from(source))) {
            warn!(error = %e, "could not render finding");
        }
    }
}

fn annotate(finding: &Finding, id: &str, source: &str) -> AriadneReport<'static, (String, Range<usize>)> {
    let (kind, color) = match finding.severity {
        Severity::Critical | Severity::High => (ReportKind::Error, Color::Red),
        Severity::Medium => (ReportKind::Warning, Color::Yellow),
        Severity::Low => (ReportKind::Advice, Color::Blue),
    };
    let end = finding.span.end.min(source.len());
    let start = finding.span.start.min(end);

    let mut builder = AriadneReport::build(kind, id.to_string(), start)
        .with_code(finding.id)
        .with_message(format!("{} ({})", finding.title, finding.severity))
        .with_label(
            Label::new((id.to_string(), start..end))
                .with_message(&finding.message)
                .with_color(color),
        );
    if let Some(note) = &finding.complexity {
        builder = builder.with_note(format!("complexity: {}", note));
    }
    if let Some(suggestion) = &finding.suggestion {
        builder = builder.with_help(&suggestion.advice);
    }
    builder.finish()
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}
