//! `warden status`

use std::time::Duration;

use warden_fetch::parse_id;

use crate::cli::StatusArgs;
use crate::config::CliConfig;

pub async fn run(config: &CliConfig, args: StatusArgs) -> anyhow::Result<()> {
    let questions = super::question_cache(config, &args.limits)?;
    for id in &args.ids {
        questions.prefetch(id);
    }

    let limit = Duration::from_millis(args.wait_ms);
    for id in &args.ids {
        if let Ok(parsed) = parse_id(id) {
            questions.cache().wait(parsed, limit).await;
        }
        println!("{id}: {}", questions.status(id));
    }
    Ok(())
}
