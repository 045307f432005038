// src/common/pagination.rs

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 20;

// Parâmetros de paginação dos endpoints de listagem.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_data: i64,
    pub total_page: i64,
    pub page: i64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total_data: i64, pagination: &Pagination, data: Vec<T>) -> Self {
        let limit = pagination.limit();
        Self {
            total_data,
            total_page: (total_data + limit - 1) / limit,
            page: pagination.page(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_offset() {
        let p = Pagination { page: None, limit: None };
        assert_eq!((p.page(), p.limit(), p.offset()), (1, 20, 0));

        let p = Pagination { page: Some(3), limit: Some(10) };
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn total_page_rounds_up() {
        let p = Pagination { page: Some(1), limit: Some(10) };
        let page: Page<i32> = Page::new(21, &p, vec![]);
        assert_eq!(page.total_page, 3);
    }
}
