//! Page identity, auth identifiers and target discovery from snapshots

use notion_image_extractor::error::ExtractError;
use notion_image_extractor::page_context::{
    ImageReference, PageContextProvider, PageSnapshot, SnapshotContext, discover,
};

mod common;
use common::{DIAGRAM_SVG, PageFixture};

#[test]
fn test_page_context_from_full_page() {
    let page = PageFixture::new()
        .page_block("page1")
        .identifiers("s1", "u1");
    let context = page.context();

    let ctx = context.page_context().unwrap();
    assert_eq!(ctx.page_id, "page1");
    assert_eq!(ctx.space_id.as_deref(), Some("s1"));
    assert_eq!(ctx.user_id.as_deref(), Some("u1"));

    let headers = context.auth_headers();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers["x-notion-space-id"], "s1");
    assert_eq!(headers["x-notion-active-user-header"], "u1");
}

#[test]
fn test_missing_page_block_is_context_error() {
    let context = PageFixture::new().identifiers("s1", "u1").context();

    let err = context.page_id().unwrap_err();
    assert!(matches!(err, ExtractError::Context(_)), "got {err:?}");
    assert!(err.to_string().contains("Could not locate page ID"));
}

#[test]
fn test_missing_identifiers_yield_empty_headers() {
    let context = PageFixture::new().page_block("page1").context();

    let ids = context.special_ids();
    assert_eq!(ids.space_id, None);
    assert_eq!(ids.user_id, None);
    assert!(context.auth_headers().is_empty());
}

#[test]
fn test_refresh_is_observed_on_next_query() {
    let context = SnapshotContext::new(PageFixture::new().build());
    assert!(context.page_id().is_err());

    context.refresh(PageFixture::new().page_block("page2").build());
    assert_eq!(context.page_id().unwrap(), "page2");
}

#[test]
fn test_discovery_order_and_classification() {
    let html = PageFixture::new()
        .page_block("page1")
        .hosted_image("blk1", "/a.png", "first")
        .diagram("code1", DIAGRAM_SVG)
        .build();
    let references = discover(&PageSnapshot::parse(&html));

    assert_eq!(references.len(), 2);
    match &references[0] {
        ImageReference::Vector {
            element,
            parent_block_id,
        } => {
            assert_eq!(element.id.as_deref(), Some("mermaid-1"));
            assert_eq!(parent_block_id.as_deref(), Some("code1"));
            assert!(element.markup.contains("xmlns=\"http://www.w3.org/2000/svg\""));
        }
        other => panic!("expected vector first, got {other:?}"),
    }
    match &references[1] {
        ImageReference::Hosted {
            element,
            parent_block_id,
        } => {
            assert_eq!(parent_block_id, "blk1");
            assert_eq!(element.src, "/a.png");
            assert_eq!(element.alt.as_deref(), Some("first"));
        }
        other => panic!("expected hosted second, got {other:?}"),
    }
}

#[test]
fn test_images_outside_blocks_are_not_targets() {
    // The identifier-bearing icon lives in <nav>, outside <main>
    let html = PageFixture::new()
        .page_block("page1")
        .identifiers("s1", "u1")
        .build();
    assert!(discover(&PageSnapshot::parse(&html)).is_empty());
}

#[test]
fn test_diagram_labels_survive_serialization() {
    let flowchart = r#"<svg id="mermaid-7" width="200" height="100" viewBox="0 0 200 100"><g class="node"><rect x="20" y="20" width="160" height="60"></rect><g class="label" transform="translate(20,20)"><foreignObject width="160" height="60"><div xmlns="http://www.w3.org/1999/xhtml"><span class="nodeLabel">Start here</span></div></foreignObject></g></g></svg>"#;
    let html = PageFixture::new().diagram("code9", flowchart).build();
    let references = discover(&PageSnapshot::parse(&html));

    let ImageReference::Vector { element, .. } = &references[0] else {
        panic!("expected a vector reference");
    };
    assert!(element.markup.contains(">Start here</tspan>"));
    assert!(!element.markup.contains("foreignObject"));
}
