use std::path::{Path, PathBuf};

use shelfwise::books::{self, BookRecord, export::BooksDocument};
use shelfwise::config::{GoodreadsConfig, ShelfBackend};
use shelfwise::books::extract::StartDatePolicy;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

const USER: &str = "18740796";

fn config_for(output_dir: &Path) -> GoodreadsConfig {
    GoodreadsConfig {
        user_id: USER.to_string(),
        base_url: Url::parse("https://www.goodreads.com/").unwrap(),
        backend: ShelfBackend::Html {
            session_cookie: None,
        },
        page_size: 2,
        max_pages: 50,
        concurrency: 2,
        start_date_policy: StartDatePolicy::MirrorFinished,
        output_dir: output_dir.to_path_buf(),
    }
}

fn config(server: &MockServer, backend: ShelfBackend, output_dir: &Path) -> GoodreadsConfig {
    GoodreadsConfig {
        base_url: Url::parse(&server.uri()).unwrap(),
        backend,
        ..config_for(output_dir)
    }
}

fn read_view(dir: &Path, file: &str) -> Vec<BookRecord> {
    let text = std::fs::read_to_string(dir.join(file)).unwrap();
    serde_json::from_str::<BooksDocument>(&text).unwrap().books
}

fn titles(books: &[BookRecord]) -> Vec<&str> {
    books.iter().map(|b| b.title.as_str()).collect()
}

fn rss_channel(items: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>shelf</title>{}</channel></rss>"#,
        items.join("")
    )
}

fn rss_item(title: &str, author: &str, rating: u8, read_at: &str, shelves: &str) -> String {
    format!(
        "<item><title>{title}</title>\
         <link><![CDATA[https://www.goodreads.com/review/show/{rating}?utm_source=rss]]></link>\
         <book_image_url><![CDATA[https://i.gr-assets.com/images/S/books/{rating}._SY75_.jpg]]></book_image_url>\
         <author_name>{author}</author_name>\
         <user_rating>{rating}</user_rating>\
         <user_read_at>{read_at}</user_read_at>\
         <user_shelves>{shelves}</user_shelves></item>"
    )
}

async fn mount_rss_shelf(server: &MockServer, shelf: &str, pages: Vec<Vec<String>>) {
    for (index, items) in pages.into_iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(format!("/review/list_rss/{USER}")))
            .and(query_param("key", "feed-key"))
            .and(query_param("shelf", shelf))
            .and(query_param("page", (index + 1).to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(rss_channel(&items))
                    .insert_header("Content-Type", "application/rss+xml; charset=utf-8"),
            )
            .expect(1)
            .mount(server)
            .await;
    }
}

async fn mount_empty_rss_fallback(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/review/list_rss/{USER}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss_channel(&[]))
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test]
async fn rss_backend_end_to_end() {
    let server = MockServer::start().await;

    mount_rss_shelf(
        &server,
        "currently-reading",
        vec![vec![rss_item("Hyperion", "Dan Simmons", 0, "", "currently-reading")]],
    )
    .await;
    mount_rss_shelf(
        &server,
        "read",
        vec![
            vec![
                rss_item("Dune", "Frank Herbert", 5, "Wed, 08 Feb 2023 00:00:00 +0000", "read"),
                rss_item("Skipped", "Nobody", 2, "", "read"),
            ],
            vec![rss_item("Solaris", "Stanisław Lem", 3, "Fri, 01 Mar 2019 10:00:00 -0800", "read")],
        ],
    )
    .await;
    mount_rss_shelf(
        &server,
        "own",
        vec![vec![rss_item("Dune", "Frank Herbert", 5, "", "own")]],
    )
    .await;
    mount_rss_shelf(
        &server,
        "bookcrossing",
        vec![vec![
            rss_item("Ubik", "Philip K. Dick", 4, "", "bookcrossing"),
            rss_item("Dune", "Frank Herbert", 5, "", "bookcrossing"),
        ]],
    )
    .await;
    mount_empty_rss_fallback(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(
        &server,
        ShelfBackend::Rss {
            key: "feed-key".into(),
        },
        dir.path(),
    );
    let shelves = books::run(&config).await.unwrap();
    assert_eq!(titles(&shelves.books), vec!["Hyperion", "Dune", "Solaris"]);

    let all = read_view(dir.path(), "read.json");
    assert_eq!(all, shelves.books);

    let hyperion = &all[0];
    assert!(hyperion.is_currently_reading);
    assert_eq!(hyperion.rating, None);
    assert_eq!(hyperion.date_finished, None);

    let dune = &all[1];
    assert_eq!(dune.author.as_deref(), Some("Frank Herbert"));
    assert!(dune.is_owned);
    assert_eq!(dune.rating, Some(5));
    assert_eq!(dune.date_finished.map(|d| d.to_string()).as_deref(), Some("2023-02-08"));
    assert_eq!(dune.date_started, dune.date_finished);
    assert_eq!(dune.review_url.as_deref(), Some("https://www.goodreads.com/review/show/5"));
    assert_eq!(
        dune.cover_url.as_deref(),
        Some("https://i.gr-assets.com/images/S/books/5.jpg")
    );

    let solaris = &all[2];
    assert_eq!(solaris.date_finished.map(|d| d.to_string()).as_deref(), Some("2019-03-01"));
    assert!(!solaris.is_owned);

    assert_eq!(titles(&read_view(dir.path(), "top_rated.json")), vec!["Dune"]);
    assert_eq!(titles(&read_view(dir.path(), "reading.json")), vec!["Hyperion"]);

    let crossing = read_view(dir.path(), "bookcrossing.json");
    assert_eq!(titles(&crossing), vec!["Ubik", "Dune"]);
    assert!(!crossing[0].is_owned);
    assert!(crossing[1].is_owned);
}

#[tokio::test]
async fn rss_fetch_failure_aborts_without_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output: PathBuf = dir.path().join("data");
    let config = config(
        &server,
        ShelfBackend::Rss {
            key: "feed-key".into(),
        },
        &output,
    );

    let err = books::run(&config).await.unwrap_err();
    assert!(matches!(err, books::ShelfError::Fetch { page: 1, .. }));
    assert!(!output.exists());
}

fn html_row(title: &str, author: &str, stars: usize, date_read: &str, shelves: &[&str]) -> String {
    let stars_html: String = (0..5)
        .map(|i| if i < stars { r#"<a class="star on"></a>"# } else { r#"<a class="star off"></a>"# })
        .collect();
    let shelves_html: String = shelves
        .iter()
        .map(|s| format!(r#"<a class="shelfLink">{s}</a>"#))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"<tr class="bookalike review">
  <td class="field cover"><div class="value"><img src="https://images.example.com/{title}._SX50_SY75_.jpg"></div></td>
  <td class="field title"><div class="value"><a href="/book/show/1">
    {title}
  </a></div></td>
  <td class="field author"><div class="value"><a href="/author/show/2">{author}</a></div></td>
  <td class="field rating"><div class="value">{stars_html}</div></td>
  <td class="field shelves"><div class="value">{shelves_html}</div></td>
  <td class="field date_started"><div class="value"><span class="date_started_value">not set</span></div></td>
  <td class="field date_read"><div class="value"><span class="date_read_value">{date_read}</span></div></td>
  <td class="field actions"><div class="value"><a class="actionLinkLite viewLink nobreak" href="/review/show/{title}">view</a></div></td>
</tr>"#
    )
}

fn html_page(total: Option<usize>, rows: &[String]) -> String {
    let header = total
        .map(|t| format!(r#"<h1><span class="h1Shelf">Shelf <span class="greyText">({t})</span></span></h1>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>{header}<table id="books"><tr id="booksHeader"><th>title</th></tr>{}</table></body></html>"#,
        rows.join("\n")
    )
}

async fn mount_html_page(server: &MockServer, shelf: &str, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/review/list/{USER}")))
        .and(query_param("shelf", shelf))
        .and(query_param("per_page", "2"))
        .and(query_param("page", page.to_string()))
        .and(header("cookie", "session=xyz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn html_backend_end_to_end() {
    let server = MockServer::start().await;

    mount_html_page(
        &server,
        "currently-reading",
        1,
        html_page(None, &[html_row("Hyperion", "Simmons, Dan", 0, "not set", &["currently-reading"])]),
    )
    .await;

    // 3 books at 2 per page: exactly pages 1 and 2
    mount_html_page(
        &server,
        "read",
        1,
        html_page(
            Some(3),
            &[
                html_row("Dune", "Herbert, Frank", 5, "Feb 08, 2023", &["read", "own"]),
                html_row("Never Finished", "Nobody", 1, "not set", &["read"]),
            ],
        ),
    )
    .await;
    mount_html_page(
        &server,
        "read",
        2,
        html_page(Some(3), &[html_row("Solaris", "Lem, Stanisław", 4, "Mar 2019", &["read"])]),
    )
    .await;

    mount_html_page(
        &server,
        "own",
        1,
        html_page(Some(1), &[html_row("Solaris", "Lem, Stanisław", 4, "", &["own"])]),
    )
    .await;
    mount_html_page(&server, "bookcrossing", 1, html_page(Some(0), &[])).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(
        &server,
        ShelfBackend::Html {
            session_cookie: Some("session=xyz".into()),
        },
        dir.path(),
    );
    let shelves = books::run(&config).await.unwrap();

    let all = read_view(dir.path(), "read.json");
    assert_eq!(all, shelves.books);
    assert_eq!(titles(&all), vec!["Hyperion", "Dune", "Solaris"]);

    let dune = &all[1];
    assert_eq!(dune.author.as_deref(), Some("Frank Herbert"));
    assert_eq!(dune.rating, Some(5));
    assert!(dune.is_owned);
    assert_eq!(dune.date_started, None);
    assert_eq!(
        dune.review_url.as_deref(),
        Some(format!("{}/review/show/Dune", server.uri()).as_str())
    );
    assert_eq!(dune.cover_url.as_deref(), Some("https://images.example.com/Dune.jpg"));

    let solaris = &all[2];
    assert_eq!(solaris.author.as_deref(), Some("Stanisław Lem"));
    assert_eq!(solaris.date_finished.map(|d| d.to_string()).as_deref(), Some("2019-03-01"));
    assert!(solaris.is_owned);

    assert_eq!(titles(&read_view(dir.path(), "top_rated.json")), vec!["Dune", "Solaris"]);
    assert!(read_view(dir.path(), "bookcrossing.json").is_empty());
}

#[tokio::test]
async fn rss_connect_failure_keeps_feed_key_out_of_error_chain() {
    let dir = tempfile::tempdir().unwrap();
    let config = GoodreadsConfig {
        // nothing listens on port 1
        base_url: Url::parse("http://127.0.0.1:1/").unwrap(),
        backend: ShelfBackend::Rss {
            key: "SUPERSECRET".into(),
        },
        ..config_for(dir.path())
    };

    let err = books::run(&config).await.unwrap_err();
    assert!(matches!(err, books::ShelfError::Fetch { page: 1, .. }));

    let rendered = format!("{:#}", anyhow::Error::from(err));
    assert!(!rendered.contains("SUPERSECRET"), "{rendered}");
    assert!(rendered.starts_with("fetching shelf 'currently-reading' page 1: dns or connect failure"), "{rendered}");
    assert_eq!(rendered.matches("dns or connect failure").count(), 1, "{rendered}");
}
