//! Parsing of the tour-list `ordering` and `search` query parameters.

/// Fields the tour list may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourSortField {
    Title,
    CreatedAt,
    SceneCount,
}

impl TourSortField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "created_at" => Some(Self::CreatedAt),
            "scene_count" => Some(Self::SceneCount),
            _ => None,
        }
    }
}

/// One ordering term, e.g. `-created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourOrdering {
    pub field: TourSortField,
    pub descending: bool,
}

/// Newest tours first.
pub const DEFAULT_TOUR_ORDERING: TourOrdering = TourOrdering {
    field: TourSortField::CreatedAt,
    descending: true,
};

/// Parse a comma-separated `ordering` value.
///
/// Terms outside the allow-list are dropped. When nothing valid remains the
/// default ordering applies.
pub fn parse_ordering(raw: Option<&str>) -> Vec<TourOrdering> {
    let terms: Vec<TourOrdering> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter_map(|term| {
            let (descending, name) = match term.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, term),
            };
            TourSortField::from_name(name).map(|field| TourOrdering { field, descending })
        })
        .collect();

    if terms.is_empty() {
        vec![DEFAULT_TOUR_ORDERING]
    } else {
        terms
    }
}

/// Split a `search` value into `ILIKE` patterns, one per whitespace- or
/// comma-separated term.
///
/// Every term must match the title or the description of a tour. LIKE
/// metacharacters inside a term are escaped so they match literally.
pub fn search_patterns(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(|term| format!("%{}%", escape_like(term)))
        .collect()
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
