mod args;
mod commands;

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;

use jobq_observability::LogFormat;
use jobq_store::{Backend, StoreConfig};

use crate::args::{Args, Command};
use crate::commands::Ctx;

fn main() -> Result<()> {
    let args = Args::parse();

    jobq_observability::init(if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Plain
    });

    let config = match args.store {
        Backend::Memory => StoreConfig::memory(),
        Backend::Disk => StoreConfig::disk(&args.root),
    };
    let ctx = Ctx::new(&config).context("opening queue stores")?;

    match args.command {
        Command::Submit {
            job_type,
            body,
            raw,
            nice,
        } => {
            let job_id = match raw {
                Some(path) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    commands::submit_raw(&ctx, &job_type, bytes, nice)?
                }
                None => {
                    let body = match body {
                        Some(inline) => serde_json::from_str(&inline),
                        None => serde_json::from_str(&read_stdin_string()?),
                    }
                    .context("parsing job body as JSON")?;
                    commands::submit(&ctx, &job_type, body, nice)?
                }
            };
            println!("{job_id}");
        }
        Command::Pop { job_type, output } => {
            let job = commands::pop(&ctx, job_type.as_deref())?;
            match output {
                Some(path) => {
                    write_file(&path, &job.job_body_serialized)?;
                    println!("{}", job.job_id);
                }
                None => write_stdout(&job.job_body_serialized)?,
            }
        }
        Command::PostStatus {
            job_id,
            status,
            detail,
        } => {
            let status = commands::post_status(&ctx, job_id, status, detail)?;
            println!("{}", status.status_id);
        }
        Command::Status { job_id } => match commands::latest_status(&ctx, &job_id)? {
            Some(status) => println!("{} {} {}", status.status, status.issue_time, status.detail),
            None => println!("(no status)"),
        },
        Command::Upload { job_id, file } => {
            let raw = match file {
                Some(path) => std::fs::read(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => read_stdin_bytes()?,
            };
            let result = commands::upload(&ctx, job_id, raw)?;
            println!("{}", result.result_id);
        }
        Command::Download {
            job_id,
            index,
            output,
        } => {
            let Some(result) = commands::download(&ctx, &job_id, index)? else {
                bail!("no result at index {index} for job {job_id}");
            };
            match output {
                Some(path) => write_file(&path, &result.result_serialized)?,
                None => write_stdout(&result.result_serialized)?,
            }
        }
        Command::List => {
            for job in commands::list(&ctx)? {
                println!(
                    "{}\t{}\tnice={}\t{}",
                    job.job_id, job.job_type, job.nice, job.created_time
                );
            }
        }
        Command::Export { output } => {
            let blob = commands::export(&ctx)?;
            match output {
                Some(path) => write_file(&path, &blob)?,
                None => write_stdout(&blob)?,
            }
        }
        Command::Import { input } => {
            let blob = match input {
                Some(path) => std::fs::read(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => read_stdin_bytes()?,
            };
            commands::import(&ctx, &blob)?;
        }
    }

    Ok(())
}

fn read_stdin_string() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading stdin")?;
    Ok(buf)
}

fn read_stdin_bytes() -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .context("reading stdin")?;
    Ok(buf)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    std::io::stdout()
        .write_all(bytes)
        .context("writing stdout")
}
