use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use ramfuzz_build::{CompileCommands, RamfuzzConfig};
use ramfuzz_driver::Driver;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ramfuzz")]
#[command(author, version, about = "Generate fuzzing harness scaffolding for C++ classes")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate harness code for a set of source files
    Gen {
        /// Source files (default: the configured or compile database sources)
        files: Vec<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Project configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// compile_commands.json supplying sources and include directories
        #[arg(long)]
        compile_commands: Option<PathBuf>,
    },

    /// Check which source files the front end accepts
    Check {
        /// Source files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the declaration model or harness descriptors of a source file
    Dump {
        /// Source file to dump
        file: PathBuf,

        /// What to dump
        #[arg(long, default_value = "decls")]
        format: DumpFormat,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DumpFormat {
    /// Classes and members as the front end sees them
    Decls,
    /// Stub names chosen for each qualifying class
    Descriptors,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Gen {
            files,
            output,
            config,
            compile_commands,
        } => {
            let code = generate(files, output, config, compile_commands)?;
            std::process::exit(code);
        }

        Commands::Check { files } => {
            let driver = Driver::default();
            let mut failed = false;

            for file in &files {
                match driver.load_file(file) {
                    Ok(_) => println!("{}: OK", file.display()),
                    Err(e) => {
                        eprintln!("{}: Error", file.display());
                        eprintln!("{:?}", miette::Report::new(e));
                        failed = true;
                    }
                }
            }
            if failed {
                std::process::exit(1);
            }
        }

        Commands::Dump { file, format } => {
            let driver = Driver::default();
            let unit = driver.load_file(&file)?;

            match format {
                DumpFormat::Decls => {
                    println!("{:#?}", unit.main);
                }
                DumpFormat::Descriptors => {
                    for desc in driver.generator().descriptors(&unit.main) {
                        println!(
                            "{} ({}): {} constructor(s), {} method(s)",
                            desc.type_name,
                            desc.class.qualified_name,
                            desc.constructor_count,
                            desc.method_count
                        );
                        for stub in &desc.stubs {
                            println!("  {:?} {} <- {}", stub.kind, stub.ident, stub.member.name);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Run the batch entry point and return the process exit code.
fn generate(
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    compile_commands: Option<PathBuf>,
) -> Result<i32> {
    let config = match config {
        Some(path) => RamfuzzConfig::from_file(&path)
            .wrap_err_with(|| format!("Failed to load {}", path.display()))?,
        None => RamfuzzConfig::named("ramfuzz"),
    };

    let mut sources = if files.is_empty() {
        config.source_paths()
    } else {
        files
    };
    let mut include_dirs = config.include_dirs();

    if let Some(path) = compile_commands {
        let db = CompileCommands::from_file(&path)
            .wrap_err_with(|| format!("Failed to load {}", path.display()))?;
        if sources.is_empty() {
            sources = db.sources();
        }
        include_dirs.extend(db.all_includes());
    }

    if sources.is_empty() {
        miette::bail!("No source files given");
    }
    tracing::debug!(sources = sources.len(), includes = include_dirs.len(), "starting run");

    let driver = Driver::from_config(&config).with_include_dirs(include_dirs);

    let status = match output {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            let status = driver.run(&sources, &mut out).into_diagnostic()?;
            out.flush().into_diagnostic()?;
            status
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let status = driver.run(&sources, &mut out).into_diagnostic()?;
            out.flush().into_diagnostic()?;
            status
        }
    };

    let code = status.code();
    for (path, err) in status.failures {
        eprintln!("{}: Error", path.display());
        eprintln!("{:?}", miette::Report::new(err));
    }

    Ok(code)
}
