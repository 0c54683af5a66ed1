//! # pystack - Main Entry Point
//!
//! Parses the CLI, validates the target, attaches, locates the interpreter's
//! thread state, then either prints one stack or runs the sampling loop and
//! prints the folded aggregate.
//!
//! Exit codes: 0 for success, including `--help`/`--version` and the target
//! ending benignly before or during a capture; 1 for usage errors, fatal
//! capture errors, and anything unexpected.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use log::info;
use std::io;
use std::time::Duration;

use pystack::cli::Args;
use pystack::domain::TraceError;
use pystack::interpreter;
use pystack::preflight::run_preflight_checks;
use pystack::report;
use pystack::sampling::{self, RemotePython, SampleSource, Sampler};
use pystack::tracer::{ProcessMemory, TracerSession};

const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;

fn main() {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // clap prints help/version to stdout and usage errors to stderr.
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_ERROR,
            };
            std::process::exit(code);
        }
    };

    std::process::exit(match run(&args) {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => match err.downcast_ref::<TraceError>() {
            // A failed capture of a target that went away on its own is not
            // this tool's failure.
            Some(trace_err) if trace_err.is_recoverable() => {
                eprintln!("{trace_err}");
                EXIT_SUCCESS
            }
            _ => {
                eprintln!("error: {err:#}");
                EXIT_ERROR
            }
        },
    });
}

fn run(args: &Args) -> Result<()> {
    let pid = args.validated_pid()?;
    let (interval, duration) = args.validated_timing()?;

    run_preflight_checks(pid)?;

    let mut session = TracerSession::attach(pid)?;
    let target = {
        let reader = ProcessMemory::new(&session);
        interpreter::locate(pid, &reader)?
    };
    info!("python {} in process {pid}, thread state at {}", target.version, target.thread_state);

    if args.sampling() {
        run_sampling(session, &target, interval, duration)
    } else {
        run_once(&mut session, &target)
    }
}

/// Single-shot mode: one capture, printed root first.
fn run_once(session: &mut TracerSession, target: &interpreter::InterpreterInfo) -> Result<()> {
    let stack = {
        let reader = ProcessMemory::new(session);
        sampling::capture(&reader, &target.layout, target.thread_state)?
    };
    // Resume the target before doing our own output. The captured stack is
    // printed even if the target vanished in between.
    if let Err(err) = session.detach() {
        log::debug!("detach after capture: {err}");
    }
    report::write_stack(&mut io::stdout().lock(), &stack)?;
    Ok(())
}

/// Sampling mode: timed capture loop, folded aggregate on stdout.
fn run_sampling(
    session: TracerSession,
    target: &interpreter::InterpreterInfo,
    interval: Duration,
    duration: Duration,
) -> Result<()> {
    let sampler = Sampler::new(interval, duration);
    let mut source = RemotePython::new(session, target.layout, target.thread_state);

    let samples = sampler.run(&mut source)?;

    if let Err(err) = source.release() {
        log::debug!("release after sampling: {err}");
    }
    report::write_folded(&mut io::stdout().lock(), &samples)?;
    Ok(())
}
