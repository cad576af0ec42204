//! Console rendering for book records.

use crate::model::book::{Book, DATE_READ_FORMAT};
use std::fmt::Write;

/// Renders one record followed by a blank separator line.
///
/// `ID` and `Title` are always printed; other fields only when set.
pub fn render_book(book: &Book) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_record(&mut out, book);
    out
}

fn write_record(out: &mut String, book: &Book) -> std::fmt::Result {
    writeln!(out, "ID: {}", book.id)?;
    writeln!(out, "Title: {}", book.title)?;
    if !book.author.is_empty() {
        writeln!(out, "Author: {}", book.author)?;
    }
    if !book.additional_authors.is_empty() {
        writeln!(out, "Additional authors: {}", book.additional_authors)?;
    }
    if !book.state.is_empty() {
        writeln!(out, "State: {}", book.state)?;
    }
    if let Some(date_read) = book.date_read {
        writeln!(out, "Date Read: {}", date_read.format(DATE_READ_FORMAT))?;
    }
    if book.stars > 0 {
        writeln!(out, "Stars: {}", book.stars)?;
    }
    writeln!(out)
}
