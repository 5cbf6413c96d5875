//! Local query engine - search, filter and paginate cached collections
//!
//! The backend only offers "get all", so every list view is derived here
//! from the last fetched snapshot. Filtering is case-insensitive substring
//! matching; a blank term matches everything.

use std::num::NonZeroUsize;

use crate::entities::{Employee, Qualification};

/// Number of page links shown by a page picker
pub const PAGE_WINDOW: usize = 5;

/// Lower-case and trim a search term; `None` means "match everything"
pub fn normalize_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Records that can be matched against a normalized search term
pub trait Searchable {
    /// `term` is already trimmed, lower-cased and non-empty
    fn matches_term(&self, term: &str) -> bool;
}

impl Searchable for Employee {
    /// Matches "First Last", "Last First", the city, or any held skill name
    fn matches_term(&self, term: &str) -> bool {
        let first = self.first_name.to_lowercase();
        let last = self.last_name.to_lowercase();
        let full_name = format!("{} {}", first, last);
        let full_name_reversed = format!("{} {}", last, first);
        let city = self.city.as_deref().unwrap_or("").to_lowercase();
        let skills = self
            .skill_set
            .iter()
            .map(|s| s.name().to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        full_name.contains(term)
            || full_name_reversed.contains(term)
            || city.contains(term)
            || skills.contains(term)
    }
}

impl Searchable for Qualification {
    fn matches_term(&self, term: &str) -> bool {
        self.skill.to_lowercase().contains(term)
    }
}

/// Check a single record against a raw search term
pub fn matches_search<T: Searchable>(item: &T, term: &str) -> bool {
    match normalize_term(term) {
        Some(term) => item.matches_term(&term),
        None => true,
    }
}

/// Filter a collection, preserving order; a blank term returns everything
pub fn filter_items<T: Searchable + Clone>(items: &[T], term: &str) -> Vec<T> {
    match normalize_term(term) {
        Some(term) => items
            .iter()
            .filter(|item| item.matches_term(&term))
            .cloned()
            .collect(),
        None => items.to_vec(),
    }
}

pub fn filter_employees(employees: &[Employee], term: &str) -> Vec<Employee> {
    filter_items(employees, term)
}

pub fn filter_qualifications(qualifications: &[Qualification], term: &str) -> Vec<Qualification> {
    filter_items(qualifications, term)
}

/// The half-open slice for a 1-based page; out-of-range pages are empty
pub fn paginate<T>(items: &[T], page: usize, page_size: NonZeroUsize) -> &[T] {
    if page == 0 {
        return &[];
    }
    let size = page_size.get();
    let start = (page - 1).saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

pub fn total_pages(total_items: usize, page_size: NonZeroUsize) -> usize {
    total_items.div_ceil(page_size.get())
}

/// Up to [`PAGE_WINDOW`] consecutive page numbers around `current_page`
///
/// The window is clamped to `1..=total_pages` and shifted left near the end
/// so it stays full whenever there are enough pages.
pub fn page_numbers(current_page: usize, total_pages: usize) -> Vec<usize> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current_page.clamp(1, total_pages);
    let half = PAGE_WINDOW / 2;

    let mut start = current.saturating_sub(half).max(1);
    let end = (start + PAGE_WINDOW - 1).min(total_pages);
    if end - start < PAGE_WINDOW - 1 {
        start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
    }

    (start..=end).collect()
}

/// How many employees hold a qualification
///
/// References carrying an id are matched by id; name-only references by name.
pub fn holder_count(qualification: &Qualification, employees: &[Employee]) -> usize {
    employees
        .iter()
        .filter(|emp| {
            emp.skill_set.iter().any(|s| match (s.id(), qualification.id) {
                (Some(id), Some(qid)) => id == qid,
                (None, _) => s.name() == qualification.skill,
                (Some(_), None) => false,
            })
        })
        .count()
}

/// Wrap every case-insensitive occurrence of `term` in `text` with `mark`
///
/// Matching runs once over the lower-cased text. Each lower-cased byte maps
/// back to the original character it came from, so characters whose lower
/// case has a different length are still wrapped whole.
pub fn highlight_matches(text: &str, term: &str, mark: impl Fn(&str) -> String) -> String {
    let needle = match normalize_term(term) {
        Some(needle) => needle,
        None => return text.to_string(),
    };

    let mut lowered = String::with_capacity(text.len());
    // For every byte of `lowered`: the original character's byte range
    let mut origin: Vec<(usize, usize)> = Vec::with_capacity(text.len());
    for (start, ch) in text.char_indices() {
        let end = start + ch.len_utf8();
        let before = lowered.len();
        lowered.extend(ch.to_lowercase());
        origin.resize(origin.len() + (lowered.len() - before), (start, end));
    }

    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for (at, found) in lowered.match_indices(needle.as_str()) {
        let (start, _) = origin[at];
        let (_, end) = origin[at + found.len() - 1];
        // A match inside a character already wrapped is skipped
        if start < copied {
            continue;
        }
        out.push_str(&text[copied..start]);
        out.push_str(&mark(&text[start..end]));
        copied = end;
    }
    out.push_str(&text[copied..]);
    out
}

/// A filtered, paginated window over one cached collection
///
/// Owns only derived state. Changing the term or the page size resets to
/// page 1; changing the page alone re-slices the existing filter result.
#[derive(Debug, Clone)]
pub struct QueryView<T> {
    search_term: String,
    current_page: usize,
    page_size: NonZeroUsize,
    filtered: Vec<T>,
    filter_passes: u64,
}

impl<T: Searchable + Clone> QueryView<T> {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            search_term: String::new(),
            current_page: 1,
            page_size,
            filtered: Vec::new(),
            filter_passes: 0,
        }
    }

    /// Re-derive the filter result from a fresh snapshot
    ///
    /// The page is kept, but pulled back to the last page if the snapshot
    /// shrank below it.
    pub fn refresh(&mut self, items: &[T]) {
        self.filtered = filter_items(items, &self.search_term);
        self.filter_passes += 1;
        self.current_page = self.current_page.min(self.total_pages().max(1));
    }

    pub fn set_search_term(&mut self, term: impl Into<String>, items: &[T]) {
        self.search_term = term.into();
        self.current_page = 1;
        self.refresh(items);
    }

    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        self.page_size = page_size;
        self.current_page = 1;
    }

    /// Move to a page within `1..=total_pages`; other values are ignored
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub fn filtered(&self) -> &[T] {
        &self.filtered
    }

    pub fn visible_slice(&self) -> &[T] {
        paginate(&self.filtered, self.current_page, self.page_size)
    }

    pub fn total_items(&self) -> usize {
        self.filtered.len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.page_size)
    }

    /// 1-based position of the first visible item, 0 when nothing matches
    pub fn start_item(&self) -> usize {
        if self.filtered.is_empty() {
            0
        } else {
            (self.current_page - 1) * self.page_size.get() + 1
        }
    }

    /// 1-based position of the last visible item
    pub fn end_item(&self) -> usize {
        (self.current_page * self.page_size.get()).min(self.filtered.len())
    }

    pub fn page_numbers(&self) -> Vec<usize> {
        page_numbers(self.current_page, self.total_pages())
    }

    /// How many times the filter has run; re-slicing does not count
    pub fn filter_passes(&self) -> u64 {
        self.filter_passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SkillReference;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn anna() -> Employee {
        let mut emp = Employee::new("Anna", "Bella");
        emp.city = Some("Berlin".into());
        emp
    }

    fn numbered(n: usize) -> Vec<Qualification> {
        (1..=n)
            .map(|i| Qualification::with_id(i as i64, format!("Skill {i}")))
            .collect()
    }

    #[test]
    fn test_employee_search_fields() {
        let employees = vec![anna()];
        assert_eq!(filter_employees(&employees, "bella anna").len(), 1);
        assert_eq!(filter_employees(&employees, "Anna Bella").len(), 1);
        assert_eq!(filter_employees(&employees, "berlin").len(), 1);
        assert!(filter_employees(&employees, "zzz").is_empty());
    }

    #[test]
    fn test_employee_search_by_skill() {
        let mut java_dev = Employee::new("Max", "Koch");
        java_dev.skill_set = vec![SkillReference::by_id(1, "Java"), SkillReference::by_name("SQL")];
        let employees = vec![anna(), java_dev];

        let found = filter_employees(&employees, "  JAVA ");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].last_name, "Koch");
    }

    #[test]
    fn test_blank_term_returns_everything_in_order() {
        let employees = vec![anna(), Employee::new("Max", "Koch"), Employee::new("Lea", "Wolf")];
        assert_eq!(filter_employees(&employees, ""), employees);
        assert_eq!(filter_employees(&employees, "   "), employees);
    }

    #[test]
    fn test_missing_city_does_not_match() {
        let emp = Employee::new("Tim", "Bauer");
        assert!(!matches_search(&emp, "berlin"));
        assert!(matches_search(&emp, ""));
    }

    #[test]
    fn test_qualification_search() {
        let quals = vec![
            Qualification::with_id(1, "Java"),
            Qualification::with_id(2, "JavaScript"),
            Qualification::with_id(3, "Go"),
        ];
        assert_eq!(filter_qualifications(&quals, "java").len(), 2);
        assert_eq!(filter_qualifications(&quals, " GO ").len(), 1);
    }

    #[test]
    fn test_paginate_partial_last_page() {
        let items: Vec<usize> = (1..=23).collect();
        let page = paginate(&items, 3, size(10));
        assert_eq!(page, &[21, 22, 23]);
    }

    #[test]
    fn test_paginate_out_of_range_is_empty() {
        let items: Vec<usize> = (1..=5).collect();
        assert!(paginate(&items, 2, size(5)).is_empty());
        assert!(paginate(&items, 0, size(5)).is_empty());
        assert!(paginate(&items, usize::MAX, size(5)).is_empty());
    }

    #[test]
    fn test_pages_cover_filtered_set_exactly() {
        let items: Vec<usize> = (0..47).collect();
        for page_size in 1..=20 {
            let ps = size(page_size);
            let mut seen = Vec::new();
            for page in 1..=total_pages(items.len(), ps) {
                let slice = paginate(&items, page, ps);
                assert!(slice.len() <= page_size);
                seen.extend_from_slice(slice);
            }
            assert_eq!(seen, items, "page size {page_size}");
        }
    }

    #[test]
    fn test_page_numbers_window() {
        assert_eq!(page_numbers(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_numbers(5, 10), vec![3, 4, 5, 6, 7]);
        assert_eq!(page_numbers(10, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_numbers(9, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_numbers(2, 3), vec![1, 2, 3]);
        assert_eq!(page_numbers(1, 1), vec![1]);
        assert!(page_numbers(1, 0).is_empty());
    }

    #[test]
    fn test_query_view_scenario_d() {
        let items = numbered(23);
        let mut view = QueryView::new(size(10));
        view.refresh(&items);
        assert!(view.go_to_page(3));

        assert_eq!(view.visible_slice().len(), 3);
        assert_eq!(view.start_item(), 21);
        assert_eq!(view.end_item(), 23);
        assert_eq!(view.total_pages(), 3);
    }

    #[test]
    fn test_query_view_term_resets_page() {
        let items = numbered(30);
        let mut view = QueryView::new(size(5));
        view.refresh(&items);
        assert!(view.go_to_page(4));

        view.set_search_term("skill 1", &items);
        assert_eq!(view.current_page(), 1);
        // "skill 1", "skill 10".."skill 19"
        assert_eq!(view.total_items(), 11);
    }

    #[test]
    fn test_query_view_page_size_resets_page_without_refilter() {
        let items = numbered(30);
        let mut view = QueryView::new(size(5));
        view.refresh(&items);
        view.go_to_page(3);
        let passes = view.filter_passes();

        view.set_page_size(size(20));
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.visible_slice().len(), 20);
        assert_eq!(view.filter_passes(), passes);
    }

    #[test]
    fn test_go_to_page_reslices_only() {
        let items = numbered(12);
        let mut view = QueryView::new(size(5));
        view.refresh(&items);
        let passes = view.filter_passes();

        assert!(view.go_to_page(2));
        assert_eq!(view.visible_slice()[0].skill, "Skill 6");
        assert!(!view.go_to_page(4));
        assert!(!view.go_to_page(0));
        assert_eq!(view.current_page(), 2);
        assert_eq!(view.filter_passes(), passes);
    }

    #[test]
    fn test_empty_view_positions() {
        let view: QueryView<Qualification> = QueryView::new(size(10));
        assert_eq!(view.start_item(), 0);
        assert_eq!(view.end_item(), 0);
        assert!(view.page_numbers().is_empty());
    }

    #[test]
    fn test_holder_count() {
        let java = Qualification::with_id(1, "Java");
        let mut a = Employee::new("A", "A");
        a.skill_set = vec![SkillReference::by_id(1, "Java")];
        let mut b = Employee::new("B", "B");
        b.skill_set = vec![SkillReference::by_name("Java")];
        let mut c = Employee::new("C", "C");
        c.skill_set = vec![SkillReference::by_id(2, "Java")];
        assert_eq!(holder_count(&java, &[a, b, c]), 2);
    }

    #[test]
    fn test_highlight_matches() {
        let marked = highlight_matches("Max Mustermann", "ma", |s| format!("<mark>{s}</mark>"));
        assert_eq!(marked, "<mark>Ma</mark>x Muster<mark>ma</mark>nn");
        assert_eq!(highlight_matches("Berlin", "", |s| format!("[{s}]")), "Berlin");
        assert_eq!(highlight_matches("Köln", "öl", |s| format!("[{s}]")), "K[öl]n");
    }

    #[test]
    fn test_highlight_when_lower_case_changes_length() {
        // 'İ' lower-cases to "i\u{307}", one char longer than itself
        let city = "İstanbul";
        let mut emp = Employee::new("Ayse", "Demir");
        emp.city = Some(city.into());
        assert!(matches_search(&emp, "i\u{307}s"));
        assert_eq!(highlight_matches(city, "i\u{307}s", |s| format!("[{s}]")), "[İs]tanbul");
        assert_eq!(highlight_matches(city, "İSTANBUL", |s| format!("[{s}]")), "[İstanbul]");
        // A match covering part of a character's lower case wraps the whole character
        assert_eq!(highlight_matches("İi", "i", |s| format!("[{s}]")), "[İ][i]");
    }

    #[test]
    fn test_refresh_clamps_page_when_snapshot_shrinks() {
        let mut view = QueryView::new(size(10));
        view.refresh(&numbered(23));
        assert!(view.go_to_page(3));

        view.refresh(&numbered(5));
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.visible_slice().len(), 5);
        assert_eq!(view.start_item(), 1);
        assert_eq!(view.end_item(), 5);

        view.refresh(&[]);
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.start_item(), 0);
    }

    #[test]
    fn test_refresh_keeps_page_that_still_exists() {
        let mut view = QueryView::new(size(10));
        view.refresh(&numbered(30));
        assert!(view.go_to_page(2));

        view.refresh(&numbered(25));
        assert_eq!(view.current_page(), 2);
        assert_eq!(view.start_item(), 11);
    }
}
