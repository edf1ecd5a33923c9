// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Reference CLI: decodes a subunit stream from a file or stdin, tallies
//! outcomes, and prints a one-line summary. Mainly useful for manually
//! poking at `subunit-core` and for demonstrating the pass-through and
//! forward-stream options.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use subunit_core::passthrough::PassThroughSink;
use subunit_core::{Discarding, Server, SinkBuilder, WriteTo};

#[derive(Parser)]
#[command(author, version, about = "Decode a subunit stream and print a summary")]
struct Args {
    /// Path to a subunit stream; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Where unrecognized, non-directive lines go.
    #[arg(long, value_enum, default_value_t = Passthrough::Discard)]
    passthrough: Passthrough,

    /// Tee every raw input line, directive or not, to this file. Unlike
    /// `--passthrough`, this sees the protocol-recognized lines too.
    #[arg(long)]
    forward: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum)]
enum Passthrough {
    Discard,
    Stdout,
}

fn build_passthrough(args: &Args) -> Box<dyn PassThroughSink> {
    match args.passthrough {
        Passthrough::Discard => Box::new(Discarding),
        Passthrough::Stdout => Box::new(WriteTo::new(io::stdout())),
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let successes = Cell::new(0u64);
    let failures = Cell::new(0u64);
    let errors = Cell::new(0u64);
    let skips = Cell::new(0u64);
    let xfails = Cell::new(0u64);

    let sink = SinkBuilder::new()
        .start_test(|id| tracing::debug!(test = %id, "test started"))
        .add_success(|_| successes.set(successes.get() + 1))
        .add_failure(|id, err| {
            failures.set(failures.get() + 1);
            tracing::info!(test = %id, error = %err, "test failed");
        })
        .add_error(|id, err| {
            errors.set(errors.get() + 1);
            tracing::info!(test = %id, error = %err, "test errored");
        })
        .add_skip(|id, reason| {
            skips.set(skips.get() + 1);
            tracing::debug!(test = %id, reason, "test skipped");
        })
        .add_expected_failure(|id, err| {
            xfails.set(xfails.get() + 1);
            tracing::debug!(test = %id, error = %err, "expected failure");
        })
        .build();

    let passthrough = build_passthrough(&args);
    let mut builder = Server::builder(sink).passthrough(passthrough);
    if let Some(path) = &args.forward {
        builder = builder.forward_stream(File::create(path)?);
    }
    let mut server = builder.build();

    match &args.input {
        Some(path) => {
            let file = File::open(path)?;
            server.read_from(BufReader::new(file))?;
        }
        None => {
            let stdin = io::stdin();
            server.read_from(stdin.lock())?;
        }
    }

    println!(
        "successes={} failures={} errors={} skips={} expected_failures={}",
        successes.get(),
        failures.get(),
        errors.get(),
        skips.get(),
        xfails.get()
    );

    if failures.get() > 0 || errors.get() > 0 {
        std::process::exit(1);
    }
    Ok(())
}
