//! Trigger installation on saved pages

use kuchiki::traits::TendrilSink;
use notion_image_extractor::trigger::{TRIGGER_TARGET_ATTR, annotate_html, install_triggers};

mod common;
use common::{DIAGRAM_SVG, PageFixture};

fn fixture() -> String {
    PageFixture::new()
        .page_block("page1")
        .diagram("code1", DIAGRAM_SVG)
        .hosted_image("blk1", "/a.png", "")
        .hosted_image("blk2", "/b.png", "")
        .build()
}

fn count_triggers(html: &str) -> usize {
    let document = kuchiki::parse_html().one(html);
    document
        .select(".notionImageExtractorTrigger")
        .map(Iterator::count)
        .unwrap_or(0)
}

#[test]
fn test_one_trigger_per_target() {
    let (html, installed) = annotate_html(&fixture()).unwrap();

    assert_eq!(installed, 3);
    assert_eq!(count_triggers(&html), 3);
    assert!(html.contains(&format!(r#"{TRIGGER_TARGET_ATTR}="blk2""#)));
    assert!(html.contains(&format!(r#"{TRIGGER_TARGET_ATTR}="code1""#)));
    assert!(html.contains("💾"));
}

#[test]
fn test_installation_is_idempotent() {
    let (once, first) = annotate_html(&fixture()).unwrap();
    let (twice, second) = annotate_html(&once).unwrap();

    assert_eq!(first, 3);
    assert_eq!(second, 0);
    assert_eq!(count_triggers(&twice), 3);
}

#[test]
fn test_repeated_install_on_live_document() {
    let document = kuchiki::parse_html().one(fixture());

    assert_eq!(install_triggers(&document).unwrap(), 3);
    assert_eq!(install_triggers(&document).unwrap(), 0);

    let mut out = Vec::new();
    document.serialize(&mut out).unwrap();
    assert_eq!(count_triggers(&String::from_utf8(out).unwrap()), 3);
}

#[test]
fn test_page_without_targets_is_unchanged() {
    let html = PageFixture::new().page_block("page1").build();
    let (_, installed) = annotate_html(&html).unwrap();
    assert_eq!(installed, 0);
}
