//! `warden fetch`

use std::fs::File;
use std::io::Write;
use std::path::Path;

use warden_block::{FileArgs, OpenMode, scoped};

use super::demo::surface;
use crate::cli::FetchArgs;
use crate::config::CliConfig;

pub async fn run(config: &CliConfig, args: FetchArgs) -> anyhow::Result<()> {
    let questions = super::question_cache(config, &args.limits)?;
    for id in &args.ids {
        questions.prefetch(id);
    }

    let mut bodies = Vec::with_capacity(args.ids.len());
    for id in &args.ids {
        let body = questions.get(id).await;
        println!("{id}: {}", questions.status(id));
        if body.is_empty() {
            continue;
        }
        if args.out.is_none() {
            println!("{body}");
        }
        bodies.push((id.as_str(), body));
    }

    if let Some(path) = &args.out {
        write_bodies(path, &bodies)?;
    }
    Ok(())
}

fn write_bodies(path: &Path, bodies: &[(&str, String)]) -> anyhow::Result<()> {
    scoped::<File>(FileArgs::new(path, OpenMode::Write))
        .with(|file| {
            for (id, body) in bodies {
                writeln!(file, "== {id} ==")?;
                writeln!(file, "{body}")?;
            }
            tracing::info!(path = %path.display(), count = bodies.len(), "bodies written");
            Ok(())
        })
        .else_()
        .otherwise(|| {
            eprintln!("could not write bodies to {}", path.display());
            Ok(())
        })
        .map_err(surface)
}
