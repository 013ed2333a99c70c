pub mod demo;
pub mod fetch;
pub mod status;

use warden_fetch::{HttpFetcher, QuestionCache};

use crate::cli::LimitArgs;
use crate::config::CliConfig;

/// Build the question cache for a fetching command.
pub(crate) fn question_cache(
    config: &CliConfig,
    limits: &LimitArgs,
) -> anyhow::Result<QuestionCache<HttpFetcher>> {
    let fetcher = HttpFetcher::new(&config.url_template)?;
    Ok(QuestionCache::new(fetcher, config.fetch_with(limits))?)
}
