use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use log::info;

/// Disassemble a flat 16-bit 8086 binary into NASM-style MOV listings
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Binary file to disassemble
  file: PathBuf,

  /// Verbosity level (-v, -vv, -vvv)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn main() {
  let args = match Args::try_parse() {
    Ok(args) => args,
    // --help and --version
    Err(err) if !err.use_stderr() => err.exit(),
    Err(err) => {
      // stderr may be closed; the exit code still reports the failure
      err.print().ok();
      process::exit(1);
    }
  };

  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
    match args.verbose {
      0 => "warn",
      1 => "info",
      2 => "debug",
      _ => "trace",
    },
  ))
  .init();

  if let Err(err) = run(&args) {
    eprintln!("Error: {err:#}");
    process::exit(1);
  }
}

fn run(args: &Args) -> anyhow::Result<()> {
  let data = std::fs::read(&args.file)
    .with_context(|| format!("failed to read {}", args.file.display()))?;
  info!("read {} bytes from {}", data.len(), args.file.display());

  match disasm_8086::disassemble(&data) {
    Ok(lines) => {
      print_lines(&lines);
      Ok(())
    }
    Err(err) => {
      print_lines(&err.lines);
      Err(err).with_context(|| format!("failed to disassemble {}", args.file.display()))
    }
  }
}

fn print_lines(lines: &[String]) {
  for line in lines {
    println!("{line}");
  }
}
