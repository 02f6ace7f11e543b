/// Which slice of the filtered rows to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: usize,
    pub per_page: usize,
}

impl Paging {
    /// Page numbers are 1-based; 0 is read as the first page.
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    fn start(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// The rows of one page plus the counts the pager needs.
#[derive(Debug)]
pub struct Page<'a, T> {
    pub rows: Vec<&'a T>,
    pub page: usize,
    pub per_page: usize,
    /// Rows left after filtering.
    pub filtered: usize,
    /// Rows in the collection before filtering.
    pub total: usize,
    pub total_pages: usize,
}

impl<'a, T> Page<'a, T> {
    pub(super) fn slice(filtered_rows: Vec<&'a T>, total: usize, paging: Paging) -> Self {
        let filtered = filtered_rows.len();
        let start = paging.start().min(filtered);
        let end = start.saturating_add(paging.per_page).min(filtered);

        let rows = filtered_rows[start..end].to_vec();

        Self {
            rows,
            page: paging.page,
            per_page: paging.per_page,
            filtered,
            total,
            total_pages: filtered.div_ceil(paging.per_page),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 1-based position of the first row shown, or 0 when nothing is shown.
    pub fn first_index(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    /// 1-based position of the last row shown.
    pub fn last_index(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + self.rows.len()
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_reads_as_first() {
        let paging = Paging::new(0, 5);
        assert_eq!(paging.page, 1);
        assert_eq!(paging.start(), 0);
    }

    #[test]
    fn slice_bounds_follow_page_number() {
        let items: Vec<u32> = (0..12).collect();
        let refs: Vec<&u32> = items.iter().collect();

        let page = Page::slice(refs, 12, Paging::new(3, 5));
        assert_eq!(page.rows, vec![&10, &11]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.first_index(), 11);
        assert_eq!(page.last_index(), 12);
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let items = [1, 2, 3];
        let refs: Vec<&i32> = items.iter().collect();

        let page = Page::slice(refs, 3, Paging::new(usize::MAX, 5));
        assert!(page.is_empty());
        assert_eq!(page.last_index(), 0);
    }
}
