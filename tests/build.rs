use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use atom_syndication::Feed;
use chrono::{DateTime, TimeZone, Utc};
use plume::build::{build_site, Error, Outcome, Summary};
use plume::config::Config;
use rss::Channel;
use tempfile::TempDir;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn project() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_root(dir.path()).unwrap();
    fs::create_dir_all(&config.posts_directory).unwrap();
    (dir, config)
}

fn write_post(config: &Config, name: &str, frontmatter: &str, body: &str) {
    fs::write(
        config.posts_directory.join(name),
        format!("---\n{}\n---\n{}", frontmatter, body),
    )
    .unwrap();
}

fn build(config: &Config) -> Summary {
    match build_site(config, now()).unwrap() {
        Outcome::Built(summary) => summary,
        outcome => panic!("expected a build, got {:?}", outcome),
    }
}

fn html_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".html"))
        .collect();
    names.sort();
    names
}

fn read(config: &Config, name: &str) -> String {
    fs::read_to_string(config.output_directory.join(name)).unwrap()
}

fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.file_name().to_string_lossy().into_owned(),
                fs::read(entry.path()).unwrap(),
            )
        })
        .collect()
}

fn three_posts(config: &Config) {
    write_post(
        config,
        "a.md",
        "title: Alpha\ndate: 2024-01-01\ntags: [rust, Web Dev]",
        "Alpha body.\n",
    );
    write_post(
        config,
        "b.md",
        "title: Beta\ndate: 2024-01-02\ntags: [rust]",
        "Beta body.\n",
    );
    write_post(
        config,
        "c.md",
        "title: Gamma\ndate: 2023-12-31\ntags: [old]\narchived: true",
        "Gamma body.\n",
    );
}

#[test]
fn test_builds_every_page() {
    let (_dir, config) = project();
    three_posts(&config);

    let summary = build(&config);
    assert_eq!(3, summary.posts);
    assert_eq!(2, summary.active);
    assert_eq!(1, summary.archived);
    assert!(summary.deleted.is_empty());
    assert_eq!(config.output_directory, summary.output_directory);

    assert_eq!(
        vec![
            "a.html",
            "archive.html",
            "b.html",
            "c.html",
            "index.html",
            "tag-old.html",
            "tag-rust.html",
            "tag-web-dev.html",
            "tags.html",
        ],
        html_files(&config.output_directory)
    );
    assert!(config.output_directory.join("feed.xml").is_file());
    assert!(config.output_directory.join("atom.xml").is_file());

    let index = read(&config, "index.html");
    assert!(index.contains(r#"<a href="archive.html">View archive (1)</a>"#), "{}", index);
    assert!(!index.contains("Gamma"));

    let archive = read(&config, "archive.html");
    assert!(archive.contains(r#"<a href="c.html">Gamma</a>"#));
    assert!(!archive.contains("Alpha"));
}

#[test]
fn test_no_archive_without_archived_posts() {
    let (_dir, config) = project();
    write_post(&config, "a.md", "title: Alpha\ndate: 2024-01-01", "Body.\n");

    let summary = build(&config);
    assert_eq!(0, summary.archived);
    assert!(!config.output_directory.join("archive.html").exists());
    assert!(!read(&config, "index.html").contains("archive.html"));
}

#[test]
fn test_tag_pages_include_archived_posts() {
    let (_dir, config) = project();
    three_posts(&config);
    write_post(
        &config,
        "d.md",
        "title: Delta\ndate: 2023-06-01\ntags: [rust]\narchived: true",
        "Delta body.\n",
    );
    build(&config);

    let tags = read(&config, "tags.html");
    assert!(tags.contains(
        r#"<li><a href="tag-rust.html" class="tag-link">rust</a> <span class="tag-count">(3)</span></li>"#
    ));
    assert!(tags.contains(
        r#"<li><a href="tag-web-dev.html" class="tag-link">Web Dev</a> <span class="tag-count">(1)</span></li>"#
    ));
    assert!(tags.find("tag-old.html") < tags.find("tag-rust.html"));

    let rust = read(&config, "tag-rust.html");
    let positions: Vec<usize> = ["b.html", "a.html", "d.html"]
        .iter()
        .map(|name| rust.find(&format!(r#"href="{}""#, name)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{}", rust);
}

#[test]
fn test_posts_are_listed_newest_first_with_stable_ties() {
    let (_dir, config) = project();
    write_post(&config, "a.md", "title: Old\ndate: 2024-01-01", "x\n");
    write_post(&config, "b.md", "title: Tie One\ndate: 2024-01-02", "x\n");
    write_post(&config, "c.md", "title: Tie Two\ndate: 2024-01-02", "x\n");
    build(&config);

    let index = read(&config, "index.html");
    let b = index.find(r#"href="b.html""#).unwrap();
    let c = index.find(r#"href="c.html""#).unwrap();
    let a = index.find(r#"href="a.html""#).unwrap();
    assert!(b < c && c < a, "{}", index);
}

#[test]
fn test_rebuild_is_byte_identical() {
    let (_dir, config) = project();
    three_posts(&config);

    build(&config);
    let first = snapshot(&config.output_directory);
    let summary = build(&config);
    assert!(summary.deleted.is_empty());
    assert_eq!(first, snapshot(&config.output_directory));
}

#[test]
fn test_removed_sources_leave_nothing_behind() {
    let (_dir, config) = project();
    three_posts(&config);
    build(&config);

    fs::write(config.output_directory.join("stale.html"), "old").unwrap();
    fs::write(config.output_directory.join("notes.txt"), "keep").unwrap();
    fs::remove_file(config.posts_directory.join("c.md")).unwrap();

    let summary = build(&config);
    assert_eq!(
        vec!["archive.html", "c.html", "stale.html", "tag-old.html"],
        summary.deleted
    );
    assert_eq!(
        vec![
            "a.html",
            "b.html",
            "index.html",
            "tag-rust.html",
            "tag-web-dev.html",
            "tags.html",
        ],
        html_files(&config.output_directory)
    );
    assert_eq!("keep", read(&config, "notes.txt"));
    assert!(config.output_directory.join("feed.xml").is_file());
}

#[test]
fn test_feeds_escape_titles_and_truncate_excerpts() {
    let (_dir, config) = project();
    let title = r#"Fish & Chips <"Deluxe">"#;
    write_post(
        &config,
        "fish.md",
        &format!("title: '{}'\ndate: 2024-03-09", title),
        &format!("{}\n", "plenty ".repeat(150)),
    );
    write_post(
        &config,
        "old.md",
        "title: Hidden\ndate: 2024-01-01\narchived: true",
        "Archived.\n",
    );
    build(&config);

    let channel = Channel::read_from(read(&config, "feed.xml").as_bytes()).unwrap();
    assert_eq!(1, channel.items().len());
    let item = &channel.items()[0];
    assert_eq!(Some(title), item.title());
    assert_eq!(Some("https://example.com/fish.html"), item.link());
    assert_eq!(300, item.description().unwrap().chars().count());
    assert_eq!(Some("Sun, 01 Jun 2025 12:00:00 GMT"), channel.last_build_date());

    let feed: Feed = read(&config, "atom.xml").parse().unwrap();
    assert_eq!(1, feed.entries().len());
    let entry = &feed.entries()[0];
    assert_eq!(title, entry.title().value);
    assert_eq!(200, entry.summary().unwrap().value.chars().count());
    assert!(entry.content().unwrap().value().unwrap().starts_with("<p>plenty plenty"));
}

#[test]
fn test_empty_posts_directory_creates_sample_post() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_root(dir.path()).unwrap();

    let outcome = build_site(&config, now()).unwrap();
    let sample = config.posts_directory.join("welcome.md");
    assert_eq!(Outcome::SamplePostCreated(sample.clone()), outcome);
    assert!(sample.is_file());
    assert!(html_files(&config.output_directory).is_empty());

    let summary = build(&config);
    assert_eq!(1, summary.posts);
    assert!(read(&config, "welcome.html").contains("Welcome to My Blog"));
}

#[test]
fn test_missing_title_aborts() {
    let (_dir, config) = project();
    write_post(&config, "a.md", "date: 2024-01-01", "No title.\n");

    match build_site(&config, now()) {
        Err(Error::Post(err)) => assert!(err.to_string().contains("a.md"), "{}", err),
        result => panic!("expected a post error, got {:?}", result),
    }
    assert!(!config.output_directory.join("index.html").exists());
}

#[test]
fn test_post_page_has_toc_anchors_and_math() {
    let (_dir, config) = project();
    write_post(
        &config,
        "math.md",
        "title: Math\ndate: 2024-01-01\nmodified: 2024-02-01\nmath: true",
        "## Hello World\n\nInline $x^2$ here.\n\n### Sub Part\n\nSee [next](plain.md).\n",
    );
    write_post(&config, "plain.md", "title: Plain\ndate: 2024-01-01", "Plain.\n");
    build(&config);

    let page = read(&config, "math.html");
    assert!(page.contains("mathjax@3"));
    assert!(page.contains(r"\(x^2\)"));
    assert!(page.contains(r#"<h2 id="hello-world">Hello World</h2>"#));
    assert!(page.contains(r##"<li><a href="#sub-part">Sub Part</a></li>"##));
    assert!(page.contains(r#"<a href="plain.html">next</a>"#));
    assert!(page.contains("Published: 2024-01-01 | Last Modified: 2024-02-01"));

    let plain = read(&config, "plain.html");
    assert!(!plain.contains("mathjax"));
    assert!(!plain.contains(r#"class="toc""#));
}

#[test]
fn test_project_file_and_custom_template() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("plume.yaml"),
        "site:\n  title: My Notes\n  page_title: Notes\n  base_url: https://notes.example.org/blog\n\
         paths:\n  posts: src\n  template: page.html\n  output: public\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("page.html"),
        "<title>{{TITLE}}</title>\n{{UNKNOWN}}\n{{CONTENT}}\n",
    )
    .unwrap();
    let nested = dir.path().join("src");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        nested.join("hi.md"),
        "---\ntitle: Hi\ndate: 2024-01-01\n---\nHello.\n",
    )
    .unwrap();

    let config = Config::from_directory(&nested, None).unwrap();
    assert_eq!(dir.path().join("public"), config.output_directory);
    build(&config);

    let home = read(&config, "index.html");
    assert!(home.starts_with("<title>Home - Notes</title>\n{{UNKNOWN}}\n"), "{}", home);
    assert!(home.contains("<h1>My Notes</h1>"));

    let channel = Channel::read_from(read(&config, "feed.xml").as_bytes()).unwrap();
    assert_eq!(
        Some("https://notes.example.org/blog/hi.html"),
        channel.items()[0].link()
    );
}
