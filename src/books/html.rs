use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::books::rows::{HtmlRow, RawRow, ShelfPage};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid shelf selector")
}

static BOOKS_TABLE: Lazy<Selector> = Lazy::new(|| selector("table#books"));
static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static TITLE_LINK: Lazy<Selector> = Lazy::new(|| selector("td.field.title a"));
static AUTHOR_LINK: Lazy<Selector> = Lazy::new(|| selector("td.field.author a"));
static COVER_IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static FILLED_STAR: Lazy<Selector> = Lazy::new(|| selector("td.field.rating a.star.on"));
static DATE_STARTED: Lazy<Selector> =
    Lazy::new(|| selector("td.field.date_started span.date_started_value"));
static DATE_READ: Lazy<Selector> = Lazy::new(|| selector("td.field.date_read span.date_read_value"));
static REVIEW_LINK: Lazy<Selector> =
    Lazy::new(|| selector("td.field.actions a.actionLinkLite.viewLink.nobreak"));
static SHELF_LINK: Lazy<Selector> = Lazy::new(|| selector("td.field.shelves a"));
static SHELF_TOTAL: Lazy<Selector> = Lazy::new(|| selector("span.h1Shelf span.greyText"));

static TOTAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d,]*").expect("valid shelf total regex"));

/// Parse one shelf list page into raw rows and the advertised shelf size.
pub fn parse_shelf_page(html: &str) -> ShelfPage {
    let document = Html::parse_document(html);
    let total = shelf_total(&document);

    let Some(table) = document.select(&BOOKS_TABLE).next() else {
        warn!("no books table found on shelf page");
        return ShelfPage { rows: Vec::new(), total };
    };

    let rows = table
        .select(&ROW)
        .filter_map(parse_row)
        .map(RawRow::Html)
        .collect();

    ShelfPage { rows, total }
}

fn parse_row(row: ElementRef<'_>) -> Option<HtmlRow> {
    // Header rows have no title cell
    let title_link = row.select(&TITLE_LINK).next()?;

    Some(HtmlRow {
        title: Some(text_of(title_link)),
        author: row.select(&AUTHOR_LINK).next().map(text_of),
        cover_src: row
            .select(&COVER_IMG)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string),
        filled_stars: row.select(&FILLED_STAR).count(),
        date_started: row.select(&DATE_STARTED).next().map(text_of),
        date_read: row.select(&DATE_READ).next().map(text_of),
        review_href: row
            .select(&REVIEW_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string),
        shelves: row
            .select(&SHELF_LINK)
            .map(text_of)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn shelf_total(document: &Html) -> Option<usize> {
    let text = text_of(document.select(&SHELF_TOTAL).next()?);
    let digits = TOTAL_REGEX.find(&text)?.as_str().replace(',', "");
    digits.parse().ok()
}
