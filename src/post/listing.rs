use std::collections::HashMap;

use serde::Serialize;

use crate::post::post_model::PostView;

/// Case-insensitive substring match over title, content and author.
pub fn matches_search(post: &PostView, query: &str) -> bool {
    let query = query.to_lowercase();
    post.title.to_lowercase().contains(&query)
        || post.content.to_lowercase().contains(&query)
        || post.author.to_lowercase().contains(&query)
}

pub fn filter_posts(
    posts: Vec<PostView>,
    search: Option<&str>,
    category: Option<&str>,
) -> Vec<PostView> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    let category = category.map(str::trim).filter(|c| !c.is_empty());

    posts
        .into_iter()
        .filter(|p| search.is_none_or(|q| matches_search(p, q)))
        .filter(|p| category.is_none_or(|c| p.category == c))
        .collect()
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Distinct categories, most used first, ties alphabetical.
pub fn category_counts<'a, I>(categories: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for category in categories {
        *counts.entry(category).or_default() += 1;
    }

    let mut result: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::post_model::PostStatus;

    fn view(title: &str, author: &str, category: &str) -> PostView {
        PostView {
            id: title.to_string(),
            title: title.to_string(),
            content: "Body text about rentals".to_string(),
            author: author.to_string(),
            author_email: format!("{}@x.com", author),
            author_image: String::new(),
            date: "1 Jan".to_string(),
            votes: 0,
            comments: 0,
            commenters: Vec::new(),
            category: category.to_string(),
            tags: Vec::new(),
            images: Vec::new(),
            status: PostStatus::Published,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn search_ignores_case_across_fields() {
        let post = view("Flipping Houses", "Jane", "Flips");
        assert!(matches_search(&post, "flipping"));
        assert!(matches_search(&post, "RENTALS"));
        assert!(matches_search(&post, "jan"));
        assert!(!matches_search(&post, "mortgage"));
    }

    #[test]
    fn filters_compose() {
        let posts = vec![
            view("Flipping Houses", "Jane", "Flips"),
            view("First rental", "Bob", "Rentals"),
            view("Flip taxes", "Bob", "Taxes"),
        ];

        let flips = filter_posts(posts.clone(), Some("flip"), None);
        assert_eq!(flips.len(), 2);

        let taxed = filter_posts(posts.clone(), Some("flip"), Some("Taxes"));
        assert_eq!(taxed.len(), 1);
        assert_eq!(taxed[0].title, "Flip taxes");

        assert_eq!(filter_posts(posts, Some("  "), Some("")).len(), 3);
    }

    #[test]
    fn categories_by_popularity() {
        let counts = category_counts(["b", "a", "b", "c", "a", "b"]);
        assert_eq!(
            counts,
            vec![
                CategoryCount { category: "b".into(), count: 3 },
                CategoryCount { category: "a".into(), count: 2 },
                CategoryCount { category: "c".into(), count: 1 },
            ]
        );
    }
}
