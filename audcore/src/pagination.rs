use serde::{Deserialize, Serialize};

/// Pagination details returned alongside a page of results; drives the
/// page selector only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PagePaginationInfo {
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total: u64,
    pub total_pages: u32,
}

/// A page of items as returned by the list endpoints.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pagination: PagePaginationInfo,
}

impl PagePaginationInfo {
    pub fn new(page: u32, total_pages: u32) -> Self {
        Self {
            page,
            total_pages,
            .. Default::default()
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// The pages to offer in a page selector, 1-based and inclusive.
    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.total_pages
    }
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, pagination: PagePaginationInfo) -> Self {
        Self { items, pagination }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Paged<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode() -> anyhow::Result<()> {
        let paged: Paged<serde_json::Value> = serde_json::from_str(r#"{
            "items": [{"id": "a"}, {"id": "b"}],
            "pagination": {"page": 2, "page_size": 2, "total": 5, "total_pages": 3}
        }"#)?;
        assert_eq!(paged.len(), 2);
        assert!(paged.pagination.has_previous());
        assert!(paged.pagination.has_next());
        assert_eq!(paged.pagination.pages().collect::<Vec<_>>(), vec![1, 2, 3]);

        // page_size and total are optional
        let info: PagePaginationInfo = serde_json::from_str(r#"{"page": 1, "total_pages": 1}"#)?;
        assert_eq!(info, PagePaginationInfo::new(1, 1));
        assert!(!info.has_previous());
        assert!(!info.has_next());
        Ok(())
    }
}
