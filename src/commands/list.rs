//! List command - show one page of the listing

use crate::{
    BulkError,
    config::BulkConfig,
    db::Database,
    output,
    query::Listing,
    render::SourceField,
};
use colored::Colorize;

type Result<T> = std::result::Result<T, BulkError>;

/// Execute the list command
///
/// `page` is zero-based.
///
/// # Errors
/// Returns an error if the query fails
pub fn execute(
    db: &Database,
    config: &BulkConfig,
    page: usize,
    index: Option<&str>,
    quiet: bool,
) -> Result<Listing> {
    let listing = Listing::fetch(&db.query(index), page, config.page_size)?;
    let columns: Vec<SourceField> = config.columns.iter().map(SourceField::new).collect();

    if listing.is_empty() {
        if !quiet {
            println!("No documents found.");
        }
        return Ok(listing);
    }

    if !quiet {
        println!(
            "{} {} of {} ({} total)",
            "Page".bold(),
            listing.page + 1,
            listing.page_count(),
            listing.total_count
        );
    }
    for entry in &listing.rows {
        println!("{}", output::listing_row(entry, &columns, quiet));
    }
    if !quiet {
        println!();
        println!("{}", listing.select_this_page_label().dimmed());
        println!("{}", listing.select_all_pages_label().dimmed());
    }
    Ok(listing)
}
