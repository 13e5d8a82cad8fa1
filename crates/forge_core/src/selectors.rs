use serde::{Deserialize, Serialize};

/// One of the six named selectors a session tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectorField {
    ProductContainer,
    ProductTitle,
    ProductUrl,
    ProductImage,
    ProductPrice,
    PaginationNext,
}

impl SelectorField {
    pub const ALL: [SelectorField; 6] = [
        SelectorField::ProductContainer,
        SelectorField::ProductTitle,
        SelectorField::ProductUrl,
        SelectorField::ProductImage,
        SelectorField::ProductPrice,
        SelectorField::PaginationNext,
    ];

    /// Wire name used by the backend.
    pub fn key(self) -> &'static str {
        match self {
            SelectorField::ProductContainer => "product_container",
            SelectorField::ProductTitle => "product_title",
            SelectorField::ProductUrl => "product_url",
            SelectorField::ProductImage => "product_image",
            SelectorField::ProductPrice => "product_price",
            SelectorField::PaginationNext => "pagination_next",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SelectorField::ProductContainer => "Product Container",
            SelectorField::ProductTitle => "Product Title",
            SelectorField::ProductUrl => "Product URL",
            SelectorField::ProductImage => "Product Image",
            SelectorField::ProductPrice => "Product Price",
            SelectorField::PaginationNext => "Pagination Next",
        }
    }

    /// Accepts the wire name as well as the short form without `product_`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|field| {
            let key = field.key();
            key == raw || key.strip_prefix("product_") == Some(raw.as_str())
        })
    }
}

/// The six named selectors. An empty string means "not yet identified".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    pub product_container: String,
    pub product_title: String,
    pub product_url: String,
    pub product_image: String,
    pub product_price: String,
    pub pagination_next: String,
}

impl SelectorSet {
    pub fn get(&self, field: SelectorField) -> &str {
        match field {
            SelectorField::ProductContainer => &self.product_container,
            SelectorField::ProductTitle => &self.product_title,
            SelectorField::ProductUrl => &self.product_url,
            SelectorField::ProductImage => &self.product_image,
            SelectorField::ProductPrice => &self.product_price,
            SelectorField::PaginationNext => &self.pagination_next,
        }
    }

    pub fn set(&mut self, field: SelectorField, value: impl Into<String>) {
        let slot = match field {
            SelectorField::ProductContainer => &mut self.product_container,
            SelectorField::ProductTitle => &mut self.product_title,
            SelectorField::ProductUrl => &mut self.product_url,
            SelectorField::ProductImage => &mut self.product_image,
            SelectorField::ProductPrice => &mut self.product_price,
            SelectorField::PaginationNext => &mut self.pagination_next,
        };
        *slot = value.into();
    }

    /// One-line `{key: "value", ...}` rendering for notices.
    pub fn summary(&self) -> String {
        let pairs: Vec<String> = self
            .iter()
            .map(|(field, value)| format!("{}: {:?}", field.key(), value))
            .collect();
        format!("{{{}}}", pairs.join(", "))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SelectorField, &str)> + '_ {
        SelectorField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }
}

/// A full set of selectors as typed on the editing surface.
///
/// The editing surface always round-trips all six fields, so an edit is a
/// complete set, never a partial patch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorEdits(pub SelectorSet);

impl SelectorEdits {
    pub fn from_current(current: &SelectorSet) -> Self {
        Self(current.clone())
    }

    pub fn set(&mut self, field: SelectorField, value: impl Into<String>) {
        self.0.set(field, value);
    }

    pub fn get(&self, field: SelectorField) -> &str {
        self.0.get(field)
    }

    /// The edited set with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> SelectorSet {
        let mut set = SelectorSet::default();
        for (field, value) in self.0.iter() {
            set.set(field, value.trim());
        }
        set
    }
}

/// Holds the session's target URL and its single SelectorSet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorStore {
    url: String,
    selectors: Option<SelectorSet>,
}

impl SelectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose selectors start out as six empty strings.
    pub fn with_blank_selectors() -> Self {
        Self {
            url: String::new(),
            selectors: Some(SelectorSet::default()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn is_initialized(&self) -> bool {
        self.selectors.is_some()
    }

    pub fn current(&self) -> Option<&SelectorSet> {
        self.selectors.as_ref()
    }

    /// Wholesale replacement after a successful analyze/regenerate round.
    pub fn replace(&mut self, next: SelectorSet) {
        self.selectors = Some(next);
    }

    /// Overwrites all six fields from the editing surface.
    pub fn patch(&mut self, edits: &SelectorEdits) -> &SelectorSet {
        self.selectors.insert(edits.trimmed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_trims_every_field_and_keeps_empty_values() {
        let mut store = SelectorStore::new();
        let mut edits = SelectorEdits::default();
        edits.set(SelectorField::ProductContainer, "  .item ");
        edits.set(SelectorField::ProductTitle, "\t.item h2\n");
        edits.set(SelectorField::PaginationNext, "   ");

        let patched = store.patch(&edits).clone();

        assert_eq!(patched.product_container, ".item");
        assert_eq!(patched.product_title, ".item h2");
        assert_eq!(patched.pagination_next, "");
        assert_eq!(patched.iter().count(), 6);
        assert!(patched.iter().all(|(_, v)| v == v.trim()));
        assert!(store.is_initialized());
    }

    #[test]
    fn patch_overwrites_fields_left_blank_in_edits() {
        let mut store = SelectorStore::new();
        let mut full = SelectorSet::default();
        full.set(SelectorField::ProductPrice, ".price");
        store.replace(full);

        store.patch(&SelectorEdits::default());

        assert_eq!(store.current().unwrap().product_price, "");
    }

    #[test]
    fn summary_lists_every_field_by_wire_key() {
        let mut set = SelectorSet::default();
        set.set(SelectorField::ProductContainer, ".item");
        let summary = set.summary();
        assert!(summary.starts_with("{product_container: \".item\", product_title: \"\""));
        assert!(summary.ends_with("pagination_next: \"\"}"));
    }

    #[test]
    fn field_parse_accepts_short_and_wire_names() {
        assert_eq!(SelectorField::parse("title"), Some(SelectorField::ProductTitle));
        assert_eq!(
            SelectorField::parse("product_container"),
            Some(SelectorField::ProductContainer)
        );
        assert_eq!(
            SelectorField::parse("pagination-next"),
            Some(SelectorField::PaginationNext)
        );
        assert_eq!(SelectorField::parse("bogus"), None);
    }
}
