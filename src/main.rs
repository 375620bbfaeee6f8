use clap::Parser;
use dictpress_scanner::{
    export_to_path, scan_paths, CitationMatch, ExportStats, Format, ParallelConfig, Profile,
    Report, Result, ScanOptions, Schema, Skipped, Strategy,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dictpress-scanner")]
#[command(about = "Converts legacy Malayalam dictionaries into dictpress import files")]
struct Args {
    /// Input files of one dictionary (.txt, .xml, .xdxf; .bz2 accepted)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Dictionary profile slug (bailey, gundert, stv)
    #[arg(short, long)]
    dictionary: String,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Output format (default: from the output file extension, else csv)
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Processing strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::Sequential)]
    strategy: Strategy,

    /// Number of threads (0 = auto-detect)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Batch size for batch-parallel strategy
    #[arg(long, default_value_t = 1000)]
    batch_size: usize,

    /// Stop after this many entries, counted across all inputs
    #[arg(long)]
    limit: Option<usize>,

    /// First page, line or record of the dictionary body (overrides the profile)
    #[arg(long)]
    start_at: Option<usize>,

    /// Match citation markers anywhere, even inside words (old converter output)
    #[arg(long)]
    legacy_citations: bool,

    /// Path to a dictionary schema YAML file (default: built-in profiles)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,

    /// Number of skipped units to list per kind in the summary
    #[arg(long, default_value_t = 10)]
    report_examples: usize,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap(),
        );
        pb
    }
}

fn load_profile(args: &Args) -> Result<Profile> {
    let loaded;
    let schema = match &args.schema {
        Some(path) => {
            loaded = Schema::load(path)?;
            &loaded
        }
        None => Schema::builtin()?,
    };

    let mut profile = schema.profile(&args.dictionary)?.clone();
    if args.legacy_citations {
        profile = profile.with_citation_match(CitationMatch::Substring);
    }
    if args.start_at.is_some() {
        profile = profile.with_start_at(args.start_at);
    }
    Ok(profile)
}

fn run(args: &Args) -> Result<()> {
    let profile = load_profile(args)?;

    let mut parallel = ParallelConfig::default();
    if args.threads > 0 {
        parallel.num_threads = args.threads;
    }
    parallel.batch_size = args.batch_size;

    let options = ScanOptions {
        strategy: args.strategy,
        parallel,
        limit: args.limit,
        example_limit: args.report_examples,
    };
    let format = args.format.unwrap_or_else(|| Format::from_path(&args.output));

    if !args.quiet {
        println!("Dictionary: {} ({})", profile.title, profile.slug);
        for input in &args.inputs {
            println!("Input: {}", input.display());
        }
        println!("Output: {} ({:?})", args.output.display(), format);
        println!("Strategy: {:?}", args.strategy);
        if args.strategy != Strategy::Sequential {
            println!("Threads: {}", options.parallel.num_threads);
        }
        if let Some(limit) = args.limit {
            println!("Limit: {} entries", limit);
        }
        println!();
    }

    let pb = spinner(args.quiet);
    let start_time = Instant::now();

    let mut on_progress = |report: &Report| {
        let elapsed = start_time.elapsed().as_secs_f64();
        let rate = report.candidates as f64 / elapsed.max(f64::EPSILON);
        pb.set_message(format!(
            "Units: {} | Entries: {} | Skipped: {} | Rate: {:.0} units/s",
            report.candidates,
            report.entries,
            report.not_entries + report.empty_entries,
            rate
        ));
    };
    let (entries, mut report) = scan_paths(&profile, &args.inputs, &options, &mut on_progress)?;
    pb.finish_and_clear();
    report.elapsed = start_time.elapsed();

    if entries.is_empty() {
        warn!("no entries found in {} input(s)", args.inputs.len());
    }

    let stats = export_to_path(format, &profile, &entries, &args.output)?;

    if !args.quiet {
        print_report(&report, &stats, &profile, args.strategy);
    }

    Ok(())
}

fn print_skipped(title: &str, count: usize, examples: &[Skipped]) {
    if examples.is_empty() {
        return;
    }
    println!("{} (first {} of {}):", title, examples.len(), count);
    for skipped in examples {
        println!("  {}: {}", skipped.location, skipped.preview);
    }
}

fn print_unmapped(title: &str, entries: usize, markers: &BTreeMap<String, usize>) {
    if markers.is_empty() {
        return;
    }
    let distinct: Vec<&str> = markers.keys().map(String::as_str).collect();
    println!("{}: {} entries", title, entries);
    println!("  Markers: {}", distinct.join(", "));
}

fn print_report(report: &Report, stats: &ExportStats, profile: &Profile, strategy: Strategy) {
    println!();
    println!("============================================================");
    println!("Dictionary: {} ({})", profile.short_name, profile.year);
    println!("Dialect: {}", profile.dialect.name());
    println!("Strategy: {:?}", strategy);
    println!("Sources scanned: {}", report.sources_scanned);
    println!("Candidate units: {}", report.candidates);
    println!("Entries written: {}", stats.entries);
    println!("Senses: {}", report.senses);
    println!(
        "Avg senses/entry: {:.2}",
        report.senses as f64 / report.entries.max(1) as f64
    );
    println!("Rows written: {}", stats.rows);
    println!("------------------------------------------------------------");
    println!("Boundaries: {}", report.boundaries);
    println!("Furniture: {}", report.furniture);
    println!("Front matter: {}", report.front_matter);
    println!("Not entries: {}", report.not_entries);
    println!("Empty entries: {}", report.empty_entries);
    if !report.unmapped_grammar.is_empty() || !report.unmapped_etymology.is_empty() {
        println!("------------------------------------------------------------");
        print_unmapped(
            "Unmapped grammar markers",
            report.unmapped_grammar_entries(),
            &report.unmapped_grammar,
        );
        print_unmapped(
            "Unmapped etymology markers",
            report.unmapped_etymology_entries(),
            &report.unmapped_etymology,
        );
    }
    if !report.not_entry_examples.is_empty() || !report.empty_entry_examples.is_empty() {
        println!("------------------------------------------------------------");
        print_skipped("Not entries", report.not_entries, &report.not_entry_examples);
        print_skipped("Empty entries", report.empty_entries, &report.empty_entry_examples);
    }
    if !report.failed_sources.is_empty() {
        println!("------------------------------------------------------------");
        println!("Failed sources: {}", report.failed_sources.len());
        for (origin, reason) in &report.failed_sources {
            println!("  {}: {}", origin, reason);
        }
    }
    println!(
        "Time: {}m {}s",
        report.elapsed.as_secs() / 60,
        report.elapsed.as_secs() % 60
    );
    println!(
        "Rate: {:.0} units/sec",
        report.candidates as f64 / report.elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("============================================================");
}

fn main() {
    let args = Args::parse();
    init_tracing();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
