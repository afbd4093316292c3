//! triq CLI

use clap::Parser as ClapParser;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use triq::diagnostics::Diagnostics;
use triq::{run, Emit, Format, TriqError, TriqResult, LANGUAGE_NAME, VERSION};

#[derive(ClapParser, Debug)]
#[command(name = "triq")]
#[command(version = VERSION)]
#[command(about = "Translate a small imperative language to triples or quadruples", long_about = None)]
struct Args {
    /// Source file
    input: PathBuf,

    /// Stage to print: tokens, ast, triples, quadruples
    #[arg(short, long, default_value = "quadruples")]
    emit: Emit,

    /// Output format: text, json
    #[arg(short, long, default_value = "text")]
    format: Format,

    /// Write the output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Watch the input for changes and re-run
    #[arg(short, long)]
    watch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Plain diagnostics without ANSI colors
    #[arg(long)]
    no_color: bool,
}

/// Run the pipeline once. Diagnostics go to stderr, the rendered stage to
/// stdout or the output file.
fn run_once(args: &Args) -> TriqResult<()> {
    let source = fs::read_to_string(&args.input)?;

    if args.verbose {
        eprintln!(" Reading: {}", args.input.display());
        eprintln!(" Source: {} bytes, {} lines", source.len(), source.lines().count());
    }

    let output = run(&source, args.emit, args.format)?;

    let filename = args.input.file_name().and_then(|s| s.to_str()).unwrap_or("input");
    let diag = Diagnostics::new(&source, filename).with_color(!args.no_color);
    for token in &output.lex_errors {
        if let Some(report) = diag.format_token(token) {
            eprint!("{}", report);
        }
    }
    for error in &output.parse_errors {
        eprint!("{}", diag.format_parse_error(error));
    }

    if args.verbose {
        eprintln!(
            " Stages: {} tokens, {} statements, {} instructions",
            output.counts.tokens, output.counts.statements, output.counts.instructions
        );
    }

    match &args.output {
        Some(path) => {
            output.save(path)?;
            eprintln!(" Wrote {} to: {} ({} bytes)", args.emit, path.display(), output.text.len());
        }
        None => print!("{}", output.text),
    }

    if output.has_errors() {
        return Err(TriqError::Diagnostics { lexical: output.lex_errors.len(), syntax: output.parse_errors.len() });
    }
    Ok(())
}

fn report(args: &Args, result: TriqResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            let diag = Diagnostics::new("", "").with_color(!args.no_color);
            eprint!("{}", diag.format_error(&e));
            false
        }
    }
}

fn watch_mode(args: &Args) -> TriqResult<()> {
    use notify::{Event, RecursiveMode, Watcher};
    use std::sync::mpsc::channel;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\n Stopping watch mode...");
        r.store(false, Ordering::SeqCst);
    }) {
        eprintln!(" Failed to set Ctrl-C handler: {}", e);
    }

    eprintln!(" Watching {} for changes... (Ctrl+C to stop)", args.input.display());
    eprintln!();

    // Initial run
    report(args, run_once(args));
    eprintln!();

    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                let _ = tx.send(());
            }
        }
    })?;

    watcher.watch(&args.input, RecursiveMode::NonRecursive)?;

    // Also watch parent directory in case file is replaced
    if let Some(parent) = args.input.parent().filter(|p| !p.as_os_str().is_empty()) {
        let _ = watcher.watch(parent, RecursiveMode::NonRecursive);
    }

    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_) => {
                // Debounce - wait a bit for writes to settle
                std::thread::sleep(Duration::from_millis(50));
                while rx.try_recv().is_ok() {}

                eprintln!(" File changed, re-running...");
                eprintln!();
                report(args, run_once(args));
                eprintln!();
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

fn main() {
    // Expression chains recurse once per operator
    let builder = std::thread::Builder::new().name("main-thread".into()).stack_size(8 * 1024 * 1024);

    let handler = builder.spawn(|| {
        let args = Args::parse();

        if args.verbose {
            eprintln!(" {} v{}", LANGUAGE_NAME, VERSION);
        }

        if !args.input.is_file() {
            eprintln!(" No such file: {}", args.input.display());
            return false;
        }

        if args.watch {
            let result = watch_mode(&args);
            report(&args, result)
        } else {
            let result = run_once(&args);
            report(&args, result)
        }
    });

    let ok = match handler {
        Ok(handle) => handle.join().unwrap_or(false),
        Err(e) => {
            eprintln!(" Failed to spawn main thread: {}", e);
            false
        }
    };

    if !ok {
        std::process::exit(1);
    }
}
