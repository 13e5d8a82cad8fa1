use serde::{Deserialize, Serialize};

pub const CSV_HEADER: [&str; 4] = ["Title", "URL", "Image URL", "Price"];
pub const TITLE_DISPLAY_LIMIT: usize = 100;
pub const URL_DISPLAY_LIMIT: usize = 60;
pub const MISSING_VALUE: &str = "N/A";
pub const EMPTY_TABLE_NOTICE: &str = "No data scraped. Please check your selectors and try again.";
const ELLIPSIS: &str = "...";

/// One extracted product item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrapedRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}

/// Display form of a record. Truncation applies here only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub index: usize,
    pub title: String,
    pub url: String,
    pub image_url: String,
    pub price: String,
}

impl RecordRow {
    pub fn from_record(index: usize, record: &ScrapedRecord) -> Self {
        Self {
            index,
            title: display_value(record.title.as_deref(), Some(TITLE_DISPLAY_LIMIT)),
            url: display_value(record.url.as_deref(), Some(URL_DISPLAY_LIMIT)),
            image_url: display_value(record.image_url.as_deref(), None),
            price: display_value(record.price.as_deref(), None),
        }
    }
}

/// Rows for the record table, numbered from 1.
pub fn record_rows(records: &[ScrapedRecord]) -> Vec<RecordRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| RecordRow::from_record(i + 1, record))
        .collect()
}

fn display_value(value: Option<&str>, limit: Option<usize>) -> String {
    match value.filter(|v| !v.is_empty()) {
        None => MISSING_VALUE.to_string(),
        Some(v) => match limit {
            Some(limit) => truncate_chars(v, limit),
            None => v.to_string(),
        },
    }
}

/// Cuts `text` to `limit` characters and appends an ellipsis when longer.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}{ELLIPSIS}", &text[..end]),
        None => text.to_string(),
    }
}

/// Builds the CSV download from held records.
///
/// Every field is quoted and embedded quotes are doubled; rows end in CRLF.
pub fn records_to_csv(records: &[ScrapedRecord]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADER.join(","));
    out.push_str("\r\n");
    for record in records {
        let row = [
            &record.title,
            &record.url,
            &record.image_url,
            &record.price,
        ]
        .map(|value| quote_field(value.as_deref().unwrap_or("")));
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, url: &str, image: &str, price: &str) -> ScrapedRecord {
        ScrapedRecord {
            title: Some(title.into()),
            url: Some(url.into()),
            image_url: Some(image.into()),
            price: Some(price.into()),
        }
    }

    #[test]
    fn csv_quotes_all_fields_and_doubles_quotes() {
        let csv = records_to_csv(&[record("A\"B", "u", "i", "$1")]);
        assert_eq!(csv, "Title,URL,Image URL,Price\r\n\"A\"\"B\",\"u\",\"i\",\"$1\"\r\n");
    }

    #[test]
    fn csv_writes_missing_values_as_empty_quoted_fields() {
        let csv = records_to_csv(&[ScrapedRecord::default()]);
        assert!(csv.ends_with("\"\",\"\",\"\",\"\"\r\n"));
    }

    #[test]
    fn csv_keeps_long_values_untruncated() {
        let long_title = "t".repeat(250);
        let csv = records_to_csv(&[record(&long_title, "u", "i", "p")]);
        assert!(csv.contains(&long_title));
    }

    #[test]
    fn table_truncates_title_and_url_only() {
        let long_title = "x".repeat(101);
        let long_url = format!("https://shop.example/{}", "p".repeat(60));
        let rec = record(&long_title, &long_url, &"i".repeat(200), "$5");

        let row = RecordRow::from_record(1, &rec);

        assert_eq!(row.title, format!("{}...", "x".repeat(100)));
        assert_eq!(row.url.chars().count(), 63);
        assert!(row.url.ends_with("..."));
        assert_eq!(row.image_url.len(), 200);
        assert_eq!(rec.title.as_deref(), Some(long_title.as_str()));
    }

    #[test]
    fn table_keeps_values_at_the_limit() {
        let exact = "y".repeat(TITLE_DISPLAY_LIMIT);
        assert_eq!(truncate_chars(&exact, TITLE_DISPLAY_LIMIT), exact);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(5);
        assert_eq!(truncate_chars(&text, 3), "ééé...");
    }

    #[test]
    fn missing_values_render_as_na() {
        let rows = record_rows(&[ScrapedRecord::default()]);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].title, "N/A");
        assert_eq!(rows[0].price, "N/A");
    }
}
