use std::collections::HashSet;

use crate::books::model::BookRecord;

/// Flag every target book whose exact (title, author) pair appears in
/// `owned`. Never clears a flag that is already set.
pub fn mark_owned(target: &mut [BookRecord], owned: &[BookRecord]) -> usize {
    let keys: HashSet<(&str, Option<&str>)> = owned.iter().map(BookRecord::match_key).collect();

    let mut marked = 0;
    for book in target.iter_mut() {
        if !book.is_owned && keys.contains(&book.match_key()) {
            book.is_owned = true;
            marked += 1;
        }
    }
    marked
}
