use anyhow::{anyhow, bail, Result};
use osmz::stream;
use osmz::{CodecOptions, CompressionRegistry, Descriptor, FileCompression, Fsync};
use std::env;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::process;
use tracing::{debug, info};

mod progress;
use progress::ProgressReporter;

fn short_opt(opt: char, arg: &str, argv: &mut env::Args) -> Option<String> {
    let mut chars = arg.chars();
    if chars.next() != Some('-') || chars.next() != Some(opt) {
        return None;
    }

    if arg.len() == 2 {
        return argv.next();
    }

    Some(arg[2..].to_owned())
}

struct Options {
    output: String,
    input_compression: Option<FileCompression>,
    output_compression: Option<FileCompression>,
    level: Option<u32>,
    fsync: Fsync,
    drop_pages: bool,
    progress: bool,
    verbosity: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            output: "-".into(),
            input_compression: None,
            output_compression: None,
            level: None,
            fsync: Fsync::No,
            drop_pages: false,
            progress: false,
            verbosity: 0,
        }
    }
}

impl Options {
    fn codec_options(&self) -> CodecOptions {
        match self.level {
            Some(level) => CodecOptions::with_level(level),
            None => CodecOptions::default(),
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// Explicit compression wins, then the file suffix, then magic bytes.
fn input_compression(path: &str, forced: Option<FileCompression>) -> Result<FileCompression> {
    if let Some(compression) = forced {
        return Ok(compression);
    }

    let by_suffix = FileCompression::from_suffix(path);
    if by_suffix != FileCompression::None || path == "-" {
        return Ok(by_suffix);
    }

    let mut prefix = Vec::with_capacity(FileCompression::magic_len());
    File::open(path)?
        .take(FileCompression::magic_len() as u64)
        .read_to_end(&mut prefix)?;
    let detected = FileCompression::detect(&prefix);
    debug!(path, %detected, "compression detected from content");
    Ok(detected)
}

fn cmd_cat(registry: &CompressionRegistry, inputs: &[String], opts: &Options) -> Result<()> {
    let output_compression = opts
        .output_compression
        .unwrap_or_else(|| FileCompression::from_suffix(&opts.output));
    let mut c = registry.create_compressor(
        output_compression,
        Descriptor::create(&opts.output)?,
        opts.fsync,
    )?;

    for input in inputs {
        let compression = input_compression(input, opts.input_compression)?;
        let mut d = registry.create_decompressor(compression, Descriptor::open(input)?)?;
        d.set_want_buffered_pages_removed(opts.drop_pages);

        let reporter = if opts.progress {
            Some(ProgressReporter::spawn(input.clone(), d.progress().clone()))
        } else {
            None
        };

        let res = stream::copy(&mut d, &mut c);
        d.close();
        if let Some(reporter) = reporter {
            reporter.stop();
        }

        let bytes = res?;
        info!(input = input.as_str(), %compression, bytes, "input done");
    }

    c.close()?;
    info!(output = opts.output.as_str(), %output_compression, bytes = c.file_size(), "output done");

    Ok(())
}

fn cmd_info(registry: &CompressionRegistry, inputs: &[String], opts: &Options) -> Result<()> {
    let mut out = io::stdout().lock();
    for input in inputs {
        let compression = input_compression(input, opts.input_compression)?;
        let size = if input == "-" {
            0
        } else {
            fs::metadata(input)?.len()
        };
        let support = if registry.contains(compression) {
            ""
        } else {
            " (not supported)"
        };
        writeln!(out, "{}: {}{}, {} bytes", input, compression, support, size)?;
    }

    Ok(())
}

fn cmd_codecs(registry: &CompressionRegistry) -> Result<()> {
    let mut out = io::stdout().lock();
    for id in registry.ids() {
        let suffix = if id.suffix().is_empty() {
            "-"
        } else {
            id.suffix()
        };
        writeln!(out, "{:<6} {}", id, suffix)?;
    }

    Ok(())
}

fn usage(argv0: &str) {
    println!("Usage:");
    println!("  {} [options] cat <inputs...>", argv0);
    println!("  {} [options] info <inputs...>", argv0);
    println!("  {} codecs", argv0);
    println!("Options:");
    println!("  -o<path>: Output file (default: stdout)");
    println!("  -c<format>: Input compression (default: from suffix or content)");
    println!("  -C<format>: Output compression (default: from suffix)");
    println!("  -l<level>: Compression level");
    println!("  -s: Fsync output before closing it");
    println!("  -d: Drop cached pages of inputs while reading");
    println!("  -p: Report progress on stderr");
    println!("  -v: More logging (repeat for more)");
}

fn main() -> Result<()> {
    let mut opts = Options::default();
    let mut args = Vec::<String>::new();

    let mut argv = env::args();
    let argv0 = argv.next().unwrap_or_else(|| "osmz".into());
    while let Some(arg) = argv.next() {
        if arg.len() < 2 || !arg.starts_with('-') {
            args.push(arg);
            continue;
        }

        match arg.as_str() {
            "-s" => opts.fsync = Fsync::Yes,
            "-d" => opts.drop_pages = true,
            "-p" => opts.progress = true,
            "-v" => opts.verbosity += 1,
            "-vv" => opts.verbosity += 2,
            _ => {
                if let Some(val) = short_opt('o', &arg, &mut argv) {
                    opts.output = val;
                } else if let Some(val) = short_opt('c', &arg, &mut argv) {
                    opts.input_compression = Some(val.parse()?);
                } else if let Some(val) = short_opt('C', &arg, &mut argv) {
                    opts.output_compression = Some(val.parse()?);
                } else if let Some(val) = short_opt('l', &arg, &mut argv) {
                    opts.level = Some(
                        val.parse()
                            .map_err(|_| anyhow!("Invalid level: {}", val))?,
                    );
                } else {
                    bail!("Invalid option: {}", arg);
                }
            }
        }
    }

    if args.is_empty() {
        usage(&argv0);
        process::exit(1);
    }

    init_logging(opts.verbosity);

    // All codecs are registered here, before any stream is opened.
    let registry = CompressionRegistry::with_builtin_codecs(&opts.codec_options());
    debug!(?registry, "codecs ready");

    let subcmd = args[0].as_str();
    let inputs = &args[1..];
    match subcmd {
        "cat" => {
            if inputs.is_empty() {
                bail!("'cat' expects at least one input");
            }
            cmd_cat(&registry, inputs, &opts)
        }
        "info" => cmd_info(&registry, inputs, &opts),
        "codecs" => {
            if !inputs.is_empty() {
                bail!("'codecs' expects no further arguments");
            }
            cmd_codecs(&registry)
        }
        _ => Err(anyhow!("Unknown subcommand: {}", subcmd)),
    }
}
