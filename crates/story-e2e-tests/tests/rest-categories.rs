use serde_json::json;
use story_app::rest_api::Envelope;
use story_dal::category::Category;
use story_e2e_tests::{
    extend_url, prepare_env,
    rest::{create_category, envelope_data},
    spawn_comment_service, spawn_server,
};
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_categories() {
    let comments_url = spawn_comment_service(vec![]).await.unwrap();
    let (args, _config_guard) = prepare_env("test_categories", &comments_url)
        .await
        .unwrap();
    let base_url = spawn_server(args).await.unwrap();
    let client = reqwest::Client::new();
    let api_url = base_url.join("v1/categories").unwrap();

    let response = client.get(api_url.clone()).send().await.unwrap();
    let empty: Vec<Category> = envelope_data(response, 200).await.unwrap();
    assert!(empty.is_empty());

    for name in ["Fiction", "Poetry", "History"] {
        let category = create_category(&client, &base_url, name).await.unwrap();
        assert_eq!(category.name, name);
    }

    let response = client.get(api_url.clone()).send().await.unwrap();
    let categories: Vec<Category> = envelope_data(response, 200).await.unwrap();
    let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Fiction", "Poetry", "History"]);

    let record_url = extend_url(&api_url, categories[1].id);
    let response = client
        .put(record_url.clone())
        .json(&json!({"name": "Verse"}))
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 200);

    let response = client.get(record_url.clone()).send().await.unwrap();
    let updated: Category = envelope_data(response, 200).await.unwrap();
    assert_eq!(updated.name, "Verse");

    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client.get(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Envelope<()> = response.json().await.unwrap();
    assert!(!body.is_success());
    assert_eq!(body.message.as_deref(), Some("category not found"));
}

#[tokio::test]
#[traced_test]
async fn test_invalid_category_requests() {
    let comments_url = spawn_comment_service(vec![]).await.unwrap();
    let (args, _config_guard) = prepare_env("test_invalid_categories", &comments_url)
        .await
        .unwrap();
    let base_url = spawn_server(args).await.unwrap();
    let client = reqwest::Client::new();
    let api_url = base_url.join("v1/categories").unwrap();

    let response = client
        .post(api_url.clone())
        .json(&json!({"name": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");

    let response = client
        .post(api_url.clone())
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .get(extend_url(&api_url, "abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}
