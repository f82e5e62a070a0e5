//! End-to-end tests for the batch pipeline.

use presswork_core::{
    builder::BuildError,
    config::Config,
    frontmatter::FrontmatterError,
    render::RenderError,
    template::{Document, TemplateError},
    CollisionPolicy, IndexRecord, SiteBuilder,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Newspaper</title>
</head>
<body>
<main id="Newspaper">
<h1 class="newspaper-title">Headline</h1>
<p class="newspaper-info">
<span class="newspaper-info-author">By Someone</span>
<span class="newspaper-info-date">01/01/1970</span>
</p>
<div class="newspaper-info-tags" id="meta-tags"></div>
<article class="newspaper-container"><p>Placeholder</p></article>
</main>
</body>
</html>
"#;

fn write_project(root: &Path, on_collision: &str) -> Config {
    fs::create_dir_all(root.join("articles")).unwrap();
    fs::create_dir_all(root.join("templates")).unwrap();
    fs::write(root.join("templates/newspaper.html"), TEMPLATE).unwrap();
    fs::write(
        root.join("presswork.yml"),
        format!("on_collision: {}\n", on_collision),
    )
    .unwrap();
    Config::from_file(root.join("presswork.yml")).unwrap()
}

fn write_article(root: &Path, name: &str, front: &str, body: &str) {
    fs::write(
        root.join("articles").join(name),
        format!("---\n{}\n---\n{}", front, body),
    )
    .unwrap();
}

#[test]
fn test_end_to_end_single_article() {
    let dir = tempdir().unwrap();
    let config = write_project(dir.path(), "error");
    write_article(
        dir.path(),
        "post.md",
        "title: My Post\ndate: 2024-01-05\nauthor: Jo\ntags: [a, b]",
        "# Hi\nSome *text*.",
    );

    let report = SiteBuilder::new(config).build().unwrap();
    assert!(report.is_success());
    assert_eq!(report.rendered.len(), 1);

    let output = dir.path().join("news/my-post.html");
    assert_eq!(report.rendered[0].output, output);

    let page = fs::read_to_string(&output).unwrap();
    let doc = Document::parse(&page).unwrap();
    assert_eq!(doc.find_tag("title").unwrap().text(), "My Post");
    assert_eq!(doc.find_class("newspaper-title").unwrap().text(), "My Post");
    assert_eq!(doc.find_class("newspaper-info-author").unwrap().text(), "By Jo");
    assert_eq!(doc.find_class("newspaper-info-date").unwrap().text(), "01/05/2024");
    assert_eq!(
        doc.find_class("newspaper-info-tags").unwrap().attr("data-tags"),
        Some("a,b")
    );

    let content = doc.find_class("newspaper-container").unwrap().inner_html();
    assert!(content.contains("<h1>Hi</h1>"), "content: {}", content);
    assert!(content.contains("<p>Some <em>text</em>.</p>"), "content: {}", content);
    assert!(!content.contains("Placeholder"));

    let index: Vec<IndexRecord> =
        serde_json::from_str(&fs::read_to_string(dir.path().join("news/index.json")).unwrap())
            .unwrap();
    assert_eq!(
        index,
        vec![IndexRecord {
            title: "My Post".into(),
            author: "Jo".into(),
            date: "2024-01-05".into(),
            tags: vec!["a".into(), "b".into()],
            filename: "my-post.html".into(),
        }]
    );
}

#[test]
fn test_index_follows_filename_order() {
    let dir = tempdir().unwrap();
    let config = write_project(dir.path(), "error");
    write_article(
        dir.path(),
        "b.md",
        "title: Second\ndate: 2024-01-01\nauthor: A\ntags: []",
        "two",
    );
    write_article(
        dir.path(),
        "a.md",
        "title: First\ndate: 2024-06-01\nauthor: A\ntags: []",
        "one",
    );

    SiteBuilder::new(config.clone()).build().unwrap();

    let titles: Vec<String> = presswork_core::IndexStore::new(config.index_path())
        .records()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[test]
fn test_failing_article_is_isolated() {
    let dir = tempdir().unwrap();
    let config = write_project(dir.path(), "error");
    write_article(
        dir.path(),
        "1-good.md",
        "title: Good One\ndate: 2024-01-01\nauthor: A\ntags: [x]",
        "body",
    );
    write_article(
        dir.path(),
        "2-bad.md",
        "title: No Author\ndate: 2024-01-01\ntags: [x]",
        "body",
    );
    write_article(
        dir.path(),
        "3-good.md",
        "title: Good Two\ndate: 2024-01-02\nauthor: B\ntags: [y]",
        "body",
    );

    let report = SiteBuilder::new(config).build().unwrap();
    assert_eq!(report.rendered.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(!report.is_success());

    let failure = &report.failures[0];
    assert!(failure.source.ends_with("2-bad.md"));
    assert!(matches!(
        failure.error,
        BuildError::Frontmatter(FrontmatterError::MissingField("author"))
    ));

    assert!(dir.path().join("news/good-one.html").exists());
    assert!(dir.path().join("news/good-two.html").exists());
    assert!(!dir.path().join("news/no-author.html").exists());
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_does_not_abort_batch() {
    let dir = tempdir().unwrap();
    let config = write_project(dir.path(), "error");
    write_article(
        dir.path(),
        "a.md",
        "title: Good\ndate: 2024-01-01\nauthor: A\ntags: [x]",
        "body",
    );
    std::os::unix::fs::symlink("nowhere.md", dir.path().join("articles/z.md")).unwrap();

    let report = SiteBuilder::new(config).build().unwrap();
    assert_eq!(report.rendered.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].source.ends_with("z.md"));
    assert!(matches!(
        report.failures[0].error,
        BuildError::Discover { .. }
    ));
    assert!(dir.path().join("news/good.html").exists());
}

#[test]
fn test_missing_template_aborts_batch() {
    let dir = tempdir().unwrap();
    let config = write_project(dir.path(), "error");
    fs::remove_file(dir.path().join("templates/newspaper.html")).unwrap();
    write_article(
        dir.path(),
        "post.md",
        "title: T\ndate: 2024-01-01\nauthor: A\ntags: []",
        "body",
    );

    let err = SiteBuilder::new(config).build().unwrap_err();
    assert!(matches!(err, BuildError::Template(TemplateError::Load { .. })));
    assert!(!dir.path().join("news/index.json").exists());
}

#[test]
fn test_big_news_titles_do_not_collide() {
    let dir = tempdir().unwrap();
    let config = write_project(dir.path(), "error");
    write_article(
        dir.path(),
        "a.md",
        "title: Big News\ndate: 2024-01-01\nauthor: A\ntags: []",
        "single",
    );
    write_article(
        dir.path(),
        "b.md",
        "title: Big  News\ndate: 2024-01-01\nauthor: A\ntags: []",
        "double",
    );

    let report = SiteBuilder::new(config).build().unwrap();
    assert!(report.is_success());
    assert!(dir.path().join("news/big-news.html").exists());
    assert!(dir.path().join("news/big--news.html").exists());
}

#[test]
fn test_colliding_slugs_fail_under_error_policy() {
    let dir = tempdir().unwrap();
    let config = write_project(dir.path(), "error");
    assert_eq!(config.on_collision, CollisionPolicy::Error);
    write_article(
        dir.path(),
        "a.md",
        "title: Big News\ndate: 2024-01-01\nauthor: A\ntags: []",
        "first",
    );
    write_article(
        dir.path(),
        "b.md",
        "title: big news\ndate: 2024-01-01\nauthor: A\ntags: []",
        "second",
    );

    let report = SiteBuilder::new(config).build().unwrap();
    assert_eq!(report.rendered.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        BuildError::Render(RenderError::SlugCollision(_))
    ));

    let page = fs::read_to_string(dir.path().join("news/big-news.html")).unwrap();
    assert!(page.contains("first"));
}

#[test]
fn test_colliding_slugs_overwrite_when_allowed() {
    let dir = tempdir().unwrap();
    let config = write_project(dir.path(), "overwrite");
    write_article(
        dir.path(),
        "a.md",
        "title: Big News\ndate: 2024-01-01\nauthor: A\ntags: []",
        "first",
    );
    write_article(
        dir.path(),
        "b.md",
        "title: big news\ndate: 2024-01-01\nauthor: A\ntags: []",
        "second",
    );

    let report = SiteBuilder::new(config).build().unwrap();
    assert!(report.is_success());
    let page = fs::read_to_string(dir.path().join("news/big-news.html")).unwrap();
    assert!(page.contains("second"));
}

#[test]
fn test_rerun_appends_to_existing_index() {
    let dir = tempdir().unwrap();
    let config = write_project(dir.path(), "error");
    write_article(
        dir.path(),
        "post.md",
        "title: Again\ndate: 2024-01-01\nauthor: A\ntags: []",
        "body",
    );

    SiteBuilder::new(config.clone()).build().unwrap();
    SiteBuilder::new(config.clone()).build().unwrap();

    let records = presswork_core::IndexStore::new(config.index_path()).records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], records[1]);
}
