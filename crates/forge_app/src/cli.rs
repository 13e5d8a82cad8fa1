use std::path::PathBuf;

use clap::Parser;
use forge_core::{SelectorEdits, SelectorField, SelectorSet};

#[derive(Parser, Debug, Default)]
#[command(
    name = "selector_forge",
    version,
    about = "Validate CSS selectors against a page and regenerate the scraper script"
)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file (default: selector_forge.ron in current dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long)]
    pub backend: Option<String>,

    /// Directory for saved scripts and CSV files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Target page to prefill the URL input with
    #[arg(long)]
    pub url: Option<String>,

    /// Selector for the repeating product element
    #[arg(long)]
    pub product_container: Option<String>,

    /// Selector for the product title
    #[arg(long)]
    pub product_title: Option<String>,

    /// Selector for the product link
    #[arg(long)]
    pub product_url: Option<String>,

    /// Selector for the product image
    #[arg(long)]
    pub product_image: Option<String>,

    /// Selector for the product price
    #[arg(long)]
    pub product_price: Option<String>,

    /// Selector for the next-page link
    #[arg(long)]
    pub pagination_next: Option<String>,
}

impl Cli {
    /// Selectors typed on the command line, or `None` when no flag was given.
    pub fn selector_edits(&self) -> Option<SelectorEdits> {
        let flags = [
            (SelectorField::ProductContainer, &self.product_container),
            (SelectorField::ProductTitle, &self.product_title),
            (SelectorField::ProductUrl, &self.product_url),
            (SelectorField::ProductImage, &self.product_image),
            (SelectorField::ProductPrice, &self.product_price),
            (SelectorField::PaginationNext, &self.pagination_next),
        ];
        if flags.iter().all(|(_, value)| value.is_none()) {
            return None;
        }
        let mut set = SelectorSet::default();
        for (field, value) in flags {
            if let Some(value) = value {
                set.set(field, value.as_str());
            }
        }
        Some(SelectorEdits(set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_flags_build_a_full_set() {
        let cli = Cli::parse_from([
            "selector_forge",
            "--product-container",
            ".item",
            "--product-price",
            ".item .price",
            "-vv",
        ]);
        let edits = cli.selector_edits().expect("edits");
        assert_eq!(edits.get(SelectorField::ProductContainer), ".item");
        assert_eq!(edits.get(SelectorField::ProductPrice), ".item .price");
        assert_eq!(edits.get(SelectorField::ProductTitle), "");
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn no_selector_flags_means_no_manual_entry() {
        let cli = Cli::parse_from(["selector_forge", "--url", "https://shop.example"]);
        assert!(cli.selector_edits().is_none());
        assert_eq!(cli.url.as_deref(), Some("https://shop.example"));
    }
}
