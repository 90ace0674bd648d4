#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use shelfwise::books::extract::{ExtractContext, StartDatePolicy, extract};
use shelfwise::books::html::parse_shelf_page;
use shelfwise::books::rss::parse_shelf_feed;
use shelfwise::books::ShelfCategory;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let ctx = ExtractContext {
        base_url: Url::parse("https://www.goodreads.com").unwrap(),
        category: ShelfCategory::Read,
        start_date_policy: StartDatePolicy::MirrorFinished,
    };

    // Neither parser nor the extractor may panic on arbitrary markup
    let mut rows = parse_shelf_page(&text).rows;
    if let Ok(page) = parse_shelf_feed(&text) {
        rows.extend(page.rows);
    }
    for row in rows {
        let _ = extract(row, &ctx);
    }
});
