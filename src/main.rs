use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use abif::{
    process_parallel, MmapReader, ParallelProcessor, ParseConfig, ParsedAb1, Summary,
    SUMMARY_HEADER,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "abif", version, about = "Decode ABIF (.ab1) Sanger sequencing traces")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a trace file to JSON (summary, base table and peak data)
    Parse {
        input: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
        /// File name reported in the summary (defaults to the input's file name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the base call table as tab-separated text
    Bases {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print one summary row per trace file
    Summary {
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        /// Worker threads (0 = all cores)
        #[arg(short, long, default_value = "0")]
        threads: usize,
    },
    /// List the directory entries of a trace file
    Tags { input: PathBuf },
    /// Convert trace files to `<stem>.json` in an output directory
    Convert {
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        #[arg(short = 'O', long, default_value = ".")]
        output_dir: PathBuf,
        #[arg(short, long, default_value = "0")]
        threads: usize,
        #[arg(long)]
        pretty: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn open_reader(path: &Path) -> Result<MmapReader> {
    MmapReader::new(path).with_context(|| format!("failed to open {}", path.display()))
}

/// Collects summary rows from every worker
#[derive(Clone, Default)]
struct SummaryCollector {
    rows: Arc<Mutex<Vec<(PathBuf, Summary)>>>,
}
impl ParallelProcessor for SummaryCollector {
    fn process_trace(&mut self, path: &Path, parsed: ParsedAb1) -> abif::Result<()> {
        self.rows.lock().push((path.to_path_buf(), parsed.summary));
        Ok(())
    }
}

/// Output path of `input` when converted into `output_dir`
fn json_target(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "trace".into(), |s| s.to_string_lossy());
    output_dir.join(format!("{stem}.json"))
}

/// Fails if two inputs would be written to the same output file
fn check_targets(inputs: &[PathBuf], output_dir: &Path) -> Result<()> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::with_capacity(inputs.len());
    for input in inputs {
        let target = json_target(output_dir, input);
        if let Some(previous) = seen.insert(target.clone(), input) {
            bail!(
                "{} and {} would both be written to {}",
                previous.display(),
                input.display(),
                target.display()
            );
        }
    }
    Ok(())
}

/// Writes each parsed file as JSON into a shared output directory
#[derive(Clone)]
struct JsonConverter {
    output_dir: Arc<PathBuf>,
    pretty: bool,
    written: Arc<Mutex<usize>>,
    tid: Option<usize>,
}
impl ParallelProcessor for JsonConverter {
    fn process_trace(&mut self, path: &Path, parsed: ParsedAb1) -> abif::Result<()> {
        let target = json_target(&self.output_dir, path);
        let mut writer = BufWriter::new(File::create(&target)?);
        parsed.write_json(&mut writer, self.pretty)?;
        writer.flush()?;
        *self.written.lock() += 1;
        Ok(())
    }

    fn on_batch_complete(&mut self) -> abif::Result<()> {
        info!(tid = ?self.tid, "conversion batch complete");
        Ok(())
    }

    fn set_tid(&mut self, tid: usize) {
        self.tid = Some(tid);
    }

    fn get_tid(&self) -> Option<usize> {
        self.tid
    }
}

fn run_parse(input: &Path, output: Option<&Path>, pretty: bool, name: Option<String>) -> Result<()> {
    let reader = open_reader(input)?;
    let config = ParseConfig::builder()
        .filename(name.unwrap_or_else(|| reader.filename()))
        .build();
    let parsed = reader
        .parse_with_config(&config)
        .with_context(|| format!("failed to parse {}", input.display()))?;

    let mut writer = open_output(output)?;
    parsed.write_json(&mut writer, pretty)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn run_bases(input: &Path, output: Option<&Path>) -> Result<()> {
    let parsed = open_reader(input)?
        .parse()
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let mut writer = open_output(output)?;
    writeln!(writer, "{}", parsed.base_data)?;
    writer.flush()?;
    Ok(())
}

fn run_summary(inputs: Vec<PathBuf>, threads: usize) -> Result<()> {
    let order: HashMap<PathBuf, usize> = inputs
        .iter()
        .enumerate()
        .map(|(idx, path)| (path.clone(), idx))
        .collect();
    let collector = SummaryCollector::default();
    process_parallel(inputs, collector.clone(), threads)?;

    let mut rows = std::mem::take(&mut *collector.rows.lock());
    rows.sort_by_key(|(path, _)| order.get(path).copied().unwrap_or(usize::MAX));

    let mut writer = open_output(None)?;
    writeln!(writer, "{SUMMARY_HEADER}")?;
    for (_, summary) in &rows {
        writeln!(writer, "{}", summary.tsv_row())?;
    }
    writer.flush()?;
    Ok(())
}

fn run_tags(input: &Path) -> Result<()> {
    let reader = open_reader(input)?;
    let file = reader
        .file()
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let mut writer = open_output(None)?;
    match file.header() {
        Some(header) => writeln!(writer, "version\t{}", header.version)?,
        None => warn!(path = %input.display(), "header truncated; directory is empty"),
    }
    writeln!(writer, "name\tnumber\ttype\tsize\tcount\tdata_size\toffset")?;
    for entry in file.directory().entries() {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            entry.name,
            entry.number,
            entry.element_type,
            entry.element_size,
            entry.num_elements,
            entry.data_size,
            entry.data_offset,
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn run_convert(inputs: Vec<PathBuf>, output_dir: PathBuf, threads: usize, pretty: bool) -> Result<()> {
    check_targets(&inputs, &output_dir)?;
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let converter = JsonConverter {
        output_dir: Arc::new(output_dir),
        pretty,
        written: Arc::new(Mutex::new(0)),
        tid: None,
    };
    process_parallel(inputs, converter.clone(), threads)?;
    info!(
        written = *converter.written.lock(),
        output_dir = %converter.output_dir.display(),
        "conversion finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse {
            input,
            output,
            pretty,
            name,
        } => run_parse(&input, output.as_deref(), pretty, name),
        Commands::Bases { input, output } => run_bases(&input, output.as_deref()),
        Commands::Summary { inputs, threads } => run_summary(inputs, threads),
        Commands::Tags { input } => run_tags(&input),
        Commands::Convert {
            inputs,
            output_dir,
            threads,
            pretty,
        } => run_convert(inputs, output_dir, threads, pretty),
    }
}
