use anyhow::{Result, anyhow};
use serde::de::DeserializeOwned;
use serde_json::json;
use story_app::{rest_api::Envelope, service::Story};
use story_dal::category::Category;
use tracing::info;
use url::Url;

/// Checks status code and unwraps `data` from response envelope
pub async fn envelope_data<T: DeserializeOwned>(
    response: reqwest::Response,
    expected_status: u16,
) -> Result<T> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    info!("Response {status}: {body}");
    if status != expected_status {
        return Err(anyhow!("Unexpected status {status}, body {body}"));
    }
    let envelope: Envelope<T> = serde_json::from_str(&body)?;
    if !envelope.is_success() {
        return Err(anyhow!("Error envelope: {:?}", envelope.message));
    }
    envelope.data.ok_or_else(|| anyhow!("Missing data in envelope"))
}

pub async fn create_category(client: &reqwest::Client, base_url: &Url, name: &str) -> Result<Category> {
    let payload = json!({"name": name});
    let api_url = base_url.join("v1/categories")?;

    let response = client.post(api_url).json(&payload).send().await?;
    envelope_data(response, 201).await
}

pub async fn create_story(
    client: &reqwest::Client,
    base_url: &Url,
    title: &str,
    category_id: i64,
) -> Result<Story> {
    let payload = json!({
        "title": title,
        "content": format!("Once upon a time there was {title}"),
        "thumbnail_url": "https://images.example.com/thumb.jpg",
        "category_id": category_id
    });
    let api_url = base_url.join("v1/stories")?;

    let response = client.post(api_url).json(&payload).send().await?;
    envelope_data(response, 201).await
}

pub async fn list_stories(
    client: &reqwest::Client,
    base_url: &Url,
    query: Option<&str>,
) -> Result<Vec<Story>> {
    let mut api_url = base_url.join("v1/stories")?;
    api_url.set_query(query);
    let response = client.get(api_url).send().await?;
    envelope_data(response, 200).await
}
