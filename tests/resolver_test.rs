//! Source resolution against a mocked Notion backend

use mockito::{Matcher, Server};
use notion_image_extractor::config::ExtractorConfig;
use notion_image_extractor::error::ExtractError;
use notion_image_extractor::page_context::{ImageReference, PageSnapshot, discover};
use notion_image_extractor::rasterizer::{Rasterizer, decode_data_uri};
use notion_image_extractor::resolver::SourceResolver;
use serde_json::json;
use std::sync::Arc;

mod common;
use common::{DIAGRAM_SVG, PageFixture, create_test_dir, solid_png, test_config};

fn resolver_for(config: ExtractorConfig, page: &PageFixture) -> SourceResolver {
    let config = Arc::new(config);
    let rasterizer = Rasterizer::new(&config).expect("rasterizer builds");
    SourceResolver::new(config, page.context(), rasterizer).expect("resolver builds")
}

fn first_reference(page: &PageFixture) -> ImageReference {
    let snapshot = PageSnapshot::parse(&page.build());
    discover(&snapshot)
        .into_iter()
        .next()
        .expect("fixture has an image target")
}

#[tokio::test]
async fn test_hosted_image_resolves_through_descriptor() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();

    let descriptor = server
        .mock("POST", "/api/v3/getBlockFileDownloadUrl")
        .match_header("x-notion-space-id", "s1")
        .match_header("x-notion-active-user-header", "u1")
        .match_header("cookie", Matcher::Regex("token_v2=test-token".to_string()))
        .match_body(Matcher::PartialJson(json!({
            "blockId": "blk1",
            "pageBlockId": "page1",
            "meta": { "name": "downloadSource" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"url":"abc123"}"#)
        .expect(1)
        .create_async()
        .await;

    let png = solid_png(4, 3);
    let image = server
        .mock("GET", "/image/abc123")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("table".into(), "block".into()),
            Matcher::UrlEncoded("id".into(), "blk1".into()),
            Matcher::UrlEncoded("spaceId".into(), "s1".into()),
            Matcher::UrlEncoded("userId".into(), "u1".into()),
            Matcher::UrlEncoded("cache".into(), "v2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png.clone())
        .expect(1)
        .create_async()
        .await;

    let page = PageFixture::new()
        .page_block("page1")
        .identifiers("s1", "u1")
        .hosted_image("blk1", "https://cdn.example.com/displayed.png", "A chart");
    let resolver = resolver_for(test_config(&server, dir.path()), &page);

    let resolved = resolver
        .resolve(&first_reference(&page))
        .await
        .expect("hosted image resolves");

    descriptor.assert_async().await;
    image.assert_async().await;

    assert_eq!(resolved.mime, "image/png");
    assert_eq!(resolved.extension, "png");
    assert_eq!(resolved.bytes, png);
    assert!(resolved.uri.starts_with(&format!("{}/image/abc123?", server.url())));
    assert!(resolved
        .uri
        .ends_with("?table=block&id=blk1&spaceId=s1&userId=u1&cache=v2"));
}

#[tokio::test]
async fn test_mime_comes_from_content_type_not_url() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();

    common::create_descriptor_mock(&mut server, "photo.png").await;
    server
        .mock("GET", "/image/photo.png")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "image/webp; charset=binary")
        .with_body(b"RIFF....WEBP".to_vec())
        .create_async()
        .await;

    let page = PageFixture::new()
        .page_block("page1")
        .identifiers("s1", "u1")
        .hosted_image("blk1", "/image/displayed.png", "");
    let resolver = resolver_for(test_config(&server, dir.path()), &page);

    let resolved = resolver.resolve(&first_reference(&page)).await.unwrap();
    assert_eq!(resolved.mime, "image/webp");
    assert_eq!(resolved.extension, "webp");
}

#[tokio::test]
async fn test_missing_content_type_defaults_to_jpeg() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();

    common::create_descriptor_mock(&mut server, "raw").await;
    server
        .mock("GET", "/image/raw")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(vec![0xFF, 0xD8, 0xFF])
        .create_async()
        .await;

    let page = PageFixture::new()
        .page_block("page1")
        .identifiers("s1", "u1")
        .hosted_image("blk1", "/x.jpg", "");
    let resolver = resolver_for(test_config(&server, dir.path()), &page);

    let resolved = resolver.resolve(&first_reference(&page)).await.unwrap();
    assert_eq!(resolved.mime, "image/jpeg");
    assert_eq!(resolved.extension, "jpeg");
}

#[tokio::test]
async fn test_missing_identifiers_still_send_request() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();

    let descriptor = server
        .mock("POST", "/api/v3/getBlockFileDownloadUrl")
        .match_header("x-notion-space-id", Matcher::Missing)
        .match_header("x-notion-active-user-header", Matcher::Missing)
        .with_status(401)
        .with_body(r#"{"errorId":"unauthorized"}"#)
        .expect(1)
        .create_async()
        .await;

    let page = PageFixture::new()
        .page_block("page1")
        .hosted_image("blk1", "/x.png", "");
    let resolver = resolver_for(test_config(&server, dir.path()), &page);

    let err = resolver.resolve(&first_reference(&page)).await.unwrap_err();
    descriptor.assert_async().await;
    assert!(matches!(err, ExtractError::Resolution(_)), "got {err:?}");
}

#[tokio::test]
async fn test_required_identifiers_short_circuit() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();

    let descriptor = server
        .mock("POST", "/api/v3/getBlockFileDownloadUrl")
        .expect(0)
        .create_async()
        .await;

    let config = ExtractorConfig::builder()
        .api_base_url(server.url())
        .require_auth_headers(true)
        .output_dir(dir.path())
        .build()
        .unwrap();
    let page = PageFixture::new()
        .page_block("page1")
        .hosted_image("blk1", "/x.png", "");
    let resolver = resolver_for(config, &page);

    let err = resolver.resolve(&first_reference(&page)).await.unwrap_err();
    descriptor.assert_async().await;
    assert!(matches!(err, ExtractError::Resolution(_)), "got {err:?}");
}

#[tokio::test]
async fn test_missing_page_block_fails_before_network() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();

    let descriptor = server
        .mock("POST", "/api/v3/getBlockFileDownloadUrl")
        .expect(0)
        .create_async()
        .await;

    let page = PageFixture::new()
        .identifiers("s1", "u1")
        .hosted_image("blk1", "/x.png", "");
    let resolver = resolver_for(test_config(&server, dir.path()), &page);

    let err = resolver.resolve(&first_reference(&page)).await.unwrap_err();
    descriptor.assert_async().await;
    assert!(matches!(err, ExtractError::Context(_)), "got {err:?}");
}

#[tokio::test]
async fn test_image_fetch_failure_is_resolution_error() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();

    common::create_descriptor_mock(&mut server, "gone").await;
    server
        .mock("GET", "/image/gone")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let page = PageFixture::new()
        .page_block("page1")
        .identifiers("s1", "u1")
        .hosted_image("blk1", "/x.png", "");
    let resolver = resolver_for(test_config(&server, dir.path()), &page);

    let err = resolver.resolve(&first_reference(&page)).await.unwrap_err();
    assert!(matches!(err, ExtractError::Resolution(_)), "got {err:?}");
}

#[tokio::test]
async fn test_vector_resolves_locally_to_png() {
    let mut server = Server::new_async().await;
    let dir = create_test_dir();

    let untouched = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    // No page block: diagrams do not need page context
    let page = PageFixture::new().diagram("code1", DIAGRAM_SVG);
    let resolver = resolver_for(test_config(&server, dir.path()), &page);

    let resolved = resolver.resolve(&first_reference(&page)).await.unwrap();
    untouched.assert_async().await;

    assert_eq!(resolved.mime, "image/png");
    assert_eq!(resolved.extension, "png");
    assert!(resolved.uri.starts_with("data:image/png;base64,"));

    let decoded = decode_data_uri(&resolved.uri).unwrap();
    assert_eq!(decoded.bytes, resolved.bytes);

    let img = image::load_from_memory(&resolved.bytes).unwrap();
    assert_eq!((img.width(), img.height()), (120, 80));
}
