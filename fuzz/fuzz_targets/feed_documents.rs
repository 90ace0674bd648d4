#![no_main]

use libfuzzer_sys::fuzz_target;

use shelfwise::feeds::parse_feed;
use shelfwise::reeder::parse_payload;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let _ = parse_feed(&text);
    let _ = parse_payload(&text);
});
