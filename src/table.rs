//! Search, category filter, role ordering and pagination over fetched collections.

use crate::models::{Event, Team, User};

/// A record that can be matched by the table search box.
pub trait Searchable {
    /// Fields matched case-insensitively against the query.
    fn search_fields(&self) -> Vec<&str>;

    /// Value compared against the category filter. `None` never matches a set filter.
    fn category(&self) -> Option<&str> {
        None
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.phone.as_str()]
    }

    fn category(&self) -> Option<&str> {
        Some(self.role().key())
    }
}

impl Searchable for Team {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.team_name.as_str(), self.team_code.as_str()]
    }

    fn category(&self) -> Option<&str> {
        Some(self.event_id.id())
    }
}

impl Searchable for Event {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.slug.as_str()]
    }
}

/// One rendered page of a filtered collection.
#[derive(Debug)]
pub struct Page<'a, T> {
    pub rows: Vec<&'a T>,
    /// 1-indexed page actually shown, after clamping.
    pub page: usize,
    pub total_pages: usize,
    /// Size of the filtered collection.
    pub total_matches: usize,
}

/// Query, category and paging state of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    query: String,
    category: Option<String>,
    page: usize,
    page_size: usize,
}

impl TableView {
    pub fn new(page_size: usize) -> Self {
        Self {
            query: String::new(),
            category: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The requested page. May exceed the page count; see [`TableView::page`].
    pub fn requested_page(&self) -> usize {
        self.page
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category.filter(|c| !c.is_empty());
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page = (self.page + 1).min(total_pages.max(1));
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    fn matches<T: Searchable>(&self, item: &T) -> bool {
        if let Some(category) = &self.category {
            if item.category() != Some(category.as_str()) {
                return false;
            }
        }
        if self.query.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        item.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Records matching the query and category, in their original order.
    pub fn filter<'a, T: Searchable>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(*item)).collect()
    }

    pub fn total_pages(&self, filtered_len: usize) -> usize {
        filtered_len.div_ceil(self.page_size).max(1)
    }

    /// Filters `items` and slices out the current page.
    ///
    /// A page past the end is clamped to the last page.
    pub fn page<'a, T: Searchable>(&self, items: &'a [T]) -> Page<'a, T> {
        let filtered = self.filter(items);
        let total_pages = self.total_pages(filtered.len());
        let page = self.page.clamp(1, total_pages);
        let start = ((page - 1) * self.page_size).min(filtered.len());
        let end = (start + self.page_size).min(filtered.len());

        Page {
            rows: filtered[start..end].to_vec(),
            page,
            total_pages,
            total_matches: filtered.len(),
        }
    }
}

/// Stable sort: super-admins first, then admins, then everyone else.
pub fn sort_by_role(users: &mut [User]) {
    users.sort_by_key(|u| u.role().priority());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventRef, Role};

    fn user(name: &str, admin: bool, super_admin: bool) -> User {
        User {
            id: name.to_lowercase(),
            name: name.to_string(),
            email: format!("{}@fest.in", name.to_lowercase()),
            phone: "98765".to_string(),
            is_admin: admin,
            is_super_admin: super_admin,
            ..Default::default()
        }
    }

    fn users(n: usize) -> Vec<User> {
        (0..n).map(|i| user(&format!("User{i}"), false, false)).collect()
    }

    #[test]
    fn empty_query_matches_everything() {
        let all = users(4);
        assert_eq!(TableView::new(10).filter(&all).len(), 4);
    }

    #[test]
    fn search_is_case_insensitive_over_declared_fields() {
        let all = vec![user("Asha", false, false), user("Ravi", true, false)];
        let mut view = TableView::new(10);
        view.set_query("ASHA@");
        let hits = view.filter(&all);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Asha");
    }

    #[test]
    fn filtering_is_idempotent() {
        let all = vec![
            user("Asha", false, false),
            user("Ravi", true, false),
            user("Rashmi", false, false),
        ];
        let mut view = TableView::new(10);
        view.set_query("ra");
        let once: Vec<User> = view.filter(&all).into_iter().cloned().collect();
        let twice: Vec<User> = view.filter(&once).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn pages_are_disjoint_and_complete() {
        let all = users(23);
        let mut view = TableView::new(5);
        let total_pages = view.page(&all).total_pages;
        assert_eq!(total_pages, 5);

        let mut seen = Vec::new();
        for p in 1..=total_pages {
            view.set_page(p);
            seen.extend(view.page(&all).rows.into_iter().cloned());
        }
        assert_eq!(seen, all);
    }

    #[test]
    fn no_match_gives_single_empty_page() {
        let all = users(3);
        let mut view = TableView::new(10);
        view.set_query("zz");
        let page = view.page(&all);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let all = users(12);
        let mut view = TableView::new(5);
        view.set_page(9);
        let page = view.page(&all);
        assert_eq!(page.page, 3);
        assert_eq!(page.rows.len(), 2);
    }

    #[test]
    fn changing_filters_resets_page() {
        let mut view = TableView::new(5);
        view.set_page(4);
        view.set_query("a");
        assert_eq!(view.requested_page(), 1);

        view.set_page(3);
        view.set_category(Some("admin".into()));
        assert_eq!(view.requested_page(), 1);

        view.set_page(2);
        view.set_page_size(20);
        assert_eq!(view.requested_page(), 1);
    }

    #[test]
    fn paging_stays_within_bounds() {
        let mut view = TableView::new(5);
        view.prev_page();
        assert_eq!(view.requested_page(), 1);
        view.next_page(2);
        view.next_page(2);
        assert_eq!(view.requested_page(), 2);
    }

    #[test]
    fn category_filters_teams_by_event() {
        let teams = vec![
            Team {
                team_name: "Alpha".into(),
                event_id: EventRef::Id("e1".into()),
                ..Default::default()
            },
            Team {
                team_name: "Beta".into(),
                event_id: EventRef::Id("e2".into()),
                ..Default::default()
            },
        ];
        let mut view = TableView::new(10);
        view.set_category(Some("e2".into()));
        let hits = view.filter(&teams);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].team_name, "Beta");
    }

    #[test]
    fn category_filters_users_by_role() {
        let all = vec![user("A", true, false), user("B", false, false)];
        let mut view = TableView::new(10);
        view.set_category(Some(Role::Admin.key().to_string()));
        assert_eq!(view.filter(&all)[0].name, "A");
    }

    #[test]
    fn role_sort_is_stable() {
        let mut all = vec![
            user("U1", false, false),
            user("A1", true, false),
            user("S1", true, true),
            user("U2", false, false),
            user("A2", true, false),
            user("S2", false, true),
        ];
        sort_by_role(&mut all);
        let names: Vec<&str> = all.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["S1", "S2", "A1", "A2", "U1", "U2"]);
    }
}
