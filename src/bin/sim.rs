/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use sparcx::simulator::Simulator;
use sparcx::target;

#[derive(Parser)]
#[clap(version = "0.1.0", about = "Simulator for the SPARC V8 single-path ISA extension targets")]
struct Opts {
    /// Target: v8, v8-blockicc-movcc, v8-blockpreg-selcc or v8-blockicc-selcc
    #[clap(short, long)]
    target: String,
    /// Binary input file (defaults to standard input)
    #[clap(short, long)]
    input: Option<PathBuf>,
    /// Log output file (defaults to standard output)
    #[clap(short, long)]
    output: Option<PathBuf>,
    /// Silent mode: suppress the memory and register dumps
    #[clap(short, long)]
    silent: bool,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let Some(target) = target::by_name(&opts.target) else {
        bail!("{}", target::TARGET_HELP);
    };

    let mut reader: Box<dyn Read> = match &opts.input {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("Could not open file \"{}\" for reading!", path.display())
        })?)),
        None => Box::new(io::stdin()),
    };

    let mut out: Box<dyn Write> = match &opts.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Could not open file \"{}\" for writing!", path.display())
        })?)),
        None => Box::new(io::stdout()),
    };

    let mut simulator = Simulator::load(&mut *reader, target)?;

    simulator.print_instructions(&mut *out)?;
    if !opts.silent {
        simulator.print_memory(&mut *out)?;
    }

    simulator.run(&mut *out)?;
    writeln!(out, "\nFinished simulation...")?;

    if !opts.silent {
        simulator.print_registers(&mut *out)?;
        simulator.print_memory(&mut *out)?;
    }
    simulator.print_results(&mut *out)?;
    out.flush()?;

    Ok(())
}
