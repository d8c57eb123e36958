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

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use sparcx::target;

#[derive(Parser)]
#[clap(version = "0.1.0", about = "Assembler for the SPARC V8 single-path ISA extension targets")]
struct Opts {
    /// Target: v8, v8-blockicc-movcc, v8-blockpreg-selcc or v8-blockicc-selcc
    #[clap(short, long)]
    target: String,
    /// Assembly source file (defaults to standard input)
    #[clap(short, long)]
    input: Option<PathBuf>,
    /// Binary output file (defaults to standard output)
    #[clap(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let Some(target) = target::by_name(&opts.target) else {
        bail!("{}", target::TARGET_HELP);
    };

    let source = match &opts.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Could not open file \"{}\" for reading!", path.display()))?,
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            source
        }
    };

    let binary = sparcx::assemble(&source, target)?;

    match &opts.output {
        Some(path) => fs::write(path, &binary)
            .with_context(|| format!("Could not open file \"{}\" for writing!", path.display()))?,
        None => io::stdout().write_all(&binary)?,
    }

    Ok(())
}
