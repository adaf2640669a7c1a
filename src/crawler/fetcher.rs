use std::time::Duration;

use reqwest::Client;

use crate::error::PipelineError;

pub fn build_client(timeout: Duration) -> Result<Client, PipelineError> {
    let client = Client::builder()
        .user_agent("baltic-bonds-etl/0.1")
        .timeout(timeout)
        .build()?;

    Ok(client)
}

/// One GET against the listing page. A transport error or non-success status
/// is fatal to the run; nothing downstream executes after it.
pub async fn fetch_html(client: &Client, url: &str) -> Result<String, PipelineError> {
    let res = client.get(url).send().await?;

    let status = res.status();
    if !status.is_success() {
        return Err(PipelineError::FetchStatus { status });
    }

    Ok(res.text().await?)
}
