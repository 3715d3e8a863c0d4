//! The thin entry point used as the re-exec'd worker child (§4.5). Registers the
//! benchmarks this binary knows how to run, then hands off to
//! [`benchcore::worker::run_child`] for the read-run-reply lifecycle.
//!
//! `clap` parses the one sliver of CLI surface this crate owns -- the `--worker`
//! flag the parent orchestrator passes when it re-execs the current binary as a
//! child (§4.5 point 1). Standalone logging setup via `env_logger`, the same
//! initializer the teacher's own binaries use -- the library crate itself never
//! initializes a logger.

use benchcore::worker::Registry;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    /// Re-exec as the isolated child side of the worker protocol.
    #[arg(long)]
    worker: bool,
}

fn fib(n: u64) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        n => fib(n - 1) + fib(n - 2),
    }
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register("demo::fib", "run", |param| {
        let n: u64 = param.and_then(|p| p.parse().ok()).unwrap_or(20);
        std::hint::black_box(fib(n));
        Ok(())
    });
    registry.register("demo::alloc", "run", |param| {
        let n: usize = param.and_then(|p| p.parse().ok()).unwrap_or(1024);
        let v: Vec<u8> = std::hint::black_box(vec![0u8; n]);
        drop(v);
        Ok(())
    });
    registry.register("demo::math", "run", |_param| {
        std::hint::black_box(2.0_f64.sqrt().exp().ln());
        Ok(())
    });
    registry
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if !args.worker {
        eprintln!("bench-worker is only meant to be re-exec'd with --worker");
        std::process::exit(2);
    }

    let code = benchcore::worker::run_child(&registry());
    std::process::exit(code);
}
