use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for marchlight")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy, tests and docs in one go
    Check,
    /// cargo fmt --check
    Fmt,
    /// Clippy with warnings denied
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Launch the desktop demo
    Run {
        /// Config file passed through to the demo
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        release: bool,
    },
    /// Fly the camera headlessly through the CLI and print the last frame
    Smoke,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            fmt()?;
            clippy()?;
            test()?;
            doc()?;
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test => test()?,
        Commands::Doc => doc()?,
        Commands::Run { config, release } => {
            let mut args = vec!["run".to_string()];
            if release {
                args.push("--release".into());
            }
            args.extend(["-p".into(), "marchlight-desktop".into()]);
            if let Some(config) = config {
                args.extend(["--".into(), "--config".into()]);
                args.push(config.display().to_string());
            }
            cargo(&args, "desktop demo")?;
        }
        Commands::Smoke => cargo(
            &[
                "run",
                "-p",
                "marchlight-cli",
                "--",
                "simulate",
                "--frames",
                "120",
                "--keys",
                "w",
                "--drag-x",
                "2",
            ],
            "headless simulation",
        )?,
    }

    Ok(())
}

fn fmt() -> Result<()> {
    cargo(&["fmt", "--all", "--", "--check"], "cargo fmt check")
}

fn clippy() -> Result<()> {
    cargo(
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
        "cargo clippy",
    )
}

fn test() -> Result<()> {
    cargo(&["test", "--workspace"], "cargo test")
}

fn doc() -> Result<()> {
    cargo(&["doc", "--workspace", "--no-deps"], "cargo doc")
}

fn cargo<S: AsRef<str>>(args: &[S], label: &str) -> Result<()> {
    let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo").args(&args).status()?;
    if !status.success() {
        bail!("{label} failed");
    }
    Ok(())
}
