mod settings;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use charlens_core::report::{self, ReportOptions};
use charlens_core::{
    character, file, registry, CharacterEncodingResult, DataKind, DecodeResult, FileDecoder, TextConverter,
};

/// Inspect and convert character encodings
#[derive(Parser)]
#[command(name = "charlens", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Config file (defaults to <config dir>/charlens/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Characters that get a per-character breakdown
    #[arg(long, global = true)]
    char_limit: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported encodings
    List,
    /// Guess the encoding of a file, stdin or a string
    Detect(DetectArgs),
    /// Show text in one or more encodings
    Convert(ConvertArgs),
    /// Decode a file and show it in one or more encodings
    File(FileArgs),
    /// Encode a single character
    Encode(EncodeArgs),
    /// Decode raw, hex or base64 bytes
    Decode(DecodeArgs),
    /// Re-encode a file
    Transcode(TranscodeArgs),
    /// Write the hex of a text in one encoding
    Export(ExportArgs),
}

#[derive(Args)]
struct DetectArgs {
    /// Input file (stdin if neither a file nor --text is given)
    input: Option<PathBuf>,

    /// Detect over the UTF-8 bytes of this text instead
    #[arg(long, conflicts_with = "input")]
    text: Option<String>,
}

#[derive(Args)]
struct ConvertArgs {
    text: String,

    /// Target encodings
    #[arg(short, long = "encoding", default_values_t = default_targets())]
    encodings: Vec<String>,

    /// Separate hex bytes with spaces
    #[arg(long)]
    spaced: bool,
}

#[derive(Args)]
struct FileArgs {
    input: PathBuf,

    /// Target encodings
    #[arg(short, long = "encoding", default_values_t = default_targets())]
    encodings: Vec<String>,

    /// Decode with this encoding instead of detecting one
    #[arg(long = "as")]
    source: Option<String>,
}

#[derive(Args)]
struct EncodeArgs {
    character: char,

    #[arg(short, long)]
    encoding: String,
}

#[derive(Args)]
struct DecodeArgs {
    /// Payload; "-" reads stdin
    data: String,

    #[arg(short, long, value_enum, default_value_t = KindArg::Hex)]
    kind: KindArg,

    #[arg(short, long)]
    encoding: String,
}

#[derive(Args)]
struct TranscodeArgs {
    input: PathBuf,

    #[arg(short, long)]
    from: String,

    #[arg(short, long)]
    to: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ExportArgs {
    text: String,

    #[arg(short, long, default_value = "utf-8")]
    encoding: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Raw,
    Hex,
    Base64,
}

impl From<KindArg> for DataKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Raw => DataKind::Raw,
            KindArg::Hex => DataKind::Hex,
            KindArg::Base64 => DataKind::Base64,
        }
    }
}

fn default_targets() -> Vec<String> {
    ["utf-8", "utf-16", "gbk", "ascii"].into_iter().map(String::from).collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = settings::load(cli.config.as_deref())?;
    if let Some(limit) = cli.char_limit {
        config = config.with_char_limit(limit);
        config.validate()?;
    }
    let converter = TextConverter::new(config);

    match &cli.command {
        Commands::List => list(&cli),
        Commands::Detect(args) => detect(args, &cli, &converter),
        Commands::Convert(args) => convert(args, &cli, &converter),
        Commands::File(args) => analyze_file(args, &cli, &converter),
        Commands::Encode(args) => encode(args, &cli),
        Commands::Decode(args) => decode(args, &cli),
        Commands::Transcode(args) => transcode(args),
        Commands::Export(args) => export(args, &converter),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(bytes = data.len(), path = %path.display(), "wrote output");
            Ok(())
        }
        None => io::stdout().write_all(data).context("failed to write stdout"),
    }
}

fn list(cli: &Cli) -> Result<()> {
    let encodings = registry::list_encodings();
    if cli.format == OutputFormat::Json {
        return print_json(&encodings);
    }
    for d in encodings {
        let caps = match (d.capability.can_encode(), d.capability.can_decode()) {
            (true, true) => "enc/dec",
            (true, false) => "enc",
            (false, true) => "dec",
            (false, false) => "-",
        };
        println!("{:<12} {:<12} {:<8} {}", d.id, d.display_name, caps, d.description);
    }
    println!("{} encodings", encodings.len());
    Ok(())
}

fn detect(args: &DetectArgs, cli: &Cli, converter: &TextConverter) -> Result<()> {
    let result = match &args.text {
        Some(text) => converter.detector().detect_text(text),
        None => converter.detect(&read_input(args.input.as_deref())?),
    };
    if cli.format == OutputFormat::Json {
        return print_json(&result);
    }
    println!("Encoding:   {}", result.guessed_encoding);
    println!("Confidence: {:.1}%", result.confidence * 100.0);
    if let Some(language) = &result.language {
        println!("Language:   {language}");
    }
    Ok(())
}

fn convert(args: &ConvertArgs, cli: &Cli, converter: &TextConverter) -> Result<()> {
    let result = converter.convert(&args.text, &args.encodings)?;
    if cli.format == OutputFormat::Json {
        return print_json(&result);
    }
    let opts = ReportOptions { spaced_hex: args.spaced, ..Default::default() };
    print!("{}", report::render_with(&result, &opts));
    Ok(())
}

fn analyze_file(args: &FileArgs, cli: &Cli, converter: &TextConverter) -> Result<()> {
    let bytes = read_input(Some(&args.input))?;
    let decoder = FileDecoder::new(converter.detector());
    let analysis = match &args.source {
        Some(source) => {
            let file = decoder.decode_file_as(&bytes, source)?;
            let conversion = converter.convert(&file.text, &args.encodings)?;
            charlens_core::FileAnalysis { file, conversion }
        }
        None => decoder.analyze_file(&bytes, &args.encodings, converter)?,
    };
    if cli.format == OutputFormat::Json {
        return print_json(&analysis);
    }
    println!(
        "File: {} ({} bytes, {} at {:.1}%)\n",
        args.input.display(),
        analysis.file.size,
        analysis.file.detected,
        analysis.file.confidence * 100.0
    );
    print!("{}", report::render(&analysis.conversion));
    Ok(())
}

fn encode(args: &EncodeArgs, cli: &Cli) -> Result<()> {
    let result = character::encode_char(args.character, &args.encoding);
    if cli.format == OutputFormat::Json {
        return print_json(&result);
    }
    match &result {
        CharacterEncodingResult::Encoded(bytes) => {
            println!("hex:    {}", bytes.hex_bytes);
            println!("bytes:  {:?}", bytes.raw_bytes.bytes);
            println!("base64: {}", bytes.base64);
            println!("length: {}", bytes.byte_length);
            Ok(())
        }
        CharacterEncodingResult::Failed(reason) => {
            bail!("cannot encode {:?} as {}: {reason}", args.character, args.encoding)
        }
    }
}

fn decode(args: &DecodeArgs, cli: &Cli) -> Result<()> {
    let data = if args.data == "-" { read_input(None)? } else { args.data.clone().into_bytes() };
    let result = character::decode_bytes(&data, args.kind.into(), &args.encoding);
    if cli.format == OutputFormat::Json {
        return print_json(&DecodeResult::from(result));
    }
    println!("{}", result?);
    Ok(())
}

fn transcode(args: &TranscodeArgs) -> Result<()> {
    let bytes = read_input(Some(&args.input))?;
    let output = file::transcode(&bytes, &args.from, &args.to)
        .with_context(|| format!("cannot transcode {} from {} to {}", args.input.display(), args.from, args.to))?;
    write_output(args.output.as_deref(), &output)
}

fn export(args: &ExportArgs, converter: &TextConverter) -> Result<()> {
    let result = converter.convert(&args.text, &[args.encoding.as_str()])?;
    let Some(hex) = result.export_hex(&args.encoding) else {
        bail!("text cannot be encoded as {}", args.encoding);
    };
    write_output(args.output.as_deref(), hex.as_bytes())
}
