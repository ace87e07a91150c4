use serde::Serialize;

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub posts: Vec<T>,
    pub page: i64,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Slices `[(page-1)*size, page*size)`. Pages outside `1..=total_pages` come back empty.
pub fn paginate<T: Clone>(items: &[T], page: i64, page_size: usize) -> Page<T> {
    let empty: &[T] = &[];
    let slice = if page < 1 || page_size == 0 {
        empty
    } else {
        let start = usize::try_from(page - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(page_size);
        if start >= items.len() {
            empty
        } else {
            let end = start.saturating_add(page_size).min(items.len());
            &items[start..end]
        }
    };

    Page {
        posts: slice.to_vec(),
        page,
        page_size,
        total: items.len(),
        total_pages: total_pages(items.len(), page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_holds_the_remainder() {
        let items: Vec<u32> = (0..23).collect();
        let page = paginate(&items, 3, PAGE_SIZE);

        assert_eq!(page.posts, vec![20, 21, 22]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total, 23);
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let items: Vec<u32> = (0..23).collect();

        assert!(paginate(&items, 0, PAGE_SIZE).posts.is_empty());
        assert!(paginate(&items, 4, PAGE_SIZE).posts.is_empty());
        assert!(paginate(&items, -2, PAGE_SIZE).posts.is_empty());
        assert!(paginate(&items, i64::MAX, PAGE_SIZE).posts.is_empty());
    }

    #[test]
    fn empty_list_has_no_pages() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 1, PAGE_SIZE);
        assert_eq!(page.total_pages, 0);
        assert!(page.posts.is_empty());
    }
}
