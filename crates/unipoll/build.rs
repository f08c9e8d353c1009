use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::Shell;

// cli.rs only needs clap and clap_complete, both build-dependencies.
#[path = "src/cli.rs"]
mod cli;

const BIN_NAME: &str = "unipoll";

/// Writes man pages to `$OUT_DIR/man` and completion scripts to
/// `$OUT_DIR/completions` for packaging.
fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = PathBuf::from(
        std::env::var_os("OUT_DIR").ok_or_else(|| io::Error::other("OUT_DIR not set by Cargo"))?,
    );

    let mut cmd = cli::Cli::command().name(BIN_NAME);
    // Every visible subcommand gets its own page (`unipoll-probe.1`, ...).
    clap_mangen::generate_to(cmd.clone(), ensure_dir(out_dir.join("man"))?)?;

    let completions = ensure_dir(out_dir.join("completions"))?;
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
        clap_complete::generate_to(shell, &mut cmd, BIN_NAME, &completions)?;
    }
    Ok(())
}

fn ensure_dir(dir: PathBuf) -> io::Result<PathBuf> {
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
