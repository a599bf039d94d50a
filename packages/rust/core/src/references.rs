//! Static "further reading" links derived from the keyword.

use url::form_urlencoded;

use topicbrief_shared::ReferenceEntry;

struct ReferenceTemplate {
    /// `{keyword}` is replaced with the keyword as given.
    title: &'static str,
    /// `{query}` is replaced with the form-encoded keyword.
    url: &'static str,
    source: &'static str,
    category: &'static str,
}

const TEMPLATES: &[ReferenceTemplate] = &[
    ReferenceTemplate {
        title: "Academic Research on {keyword}",
        url: "https://scholar.google.com/scholar?q={query}",
        source: "Google Scholar",
        category: "Academic",
    },
    ReferenceTemplate {
        title: "{keyword} - Encyclopedia Britannica",
        url: "https://www.britannica.com/search?query={query}",
        source: "Britannica",
        category: "Encyclopedia",
    },
    ReferenceTemplate {
        title: "Learn about {keyword} - Khan Academy",
        url: "https://www.khanacademy.org/search?search_again=1&page_search_query={query}",
        source: "Khan Academy",
        category: "Educational",
    },
    ReferenceTemplate {
        title: "Online Courses on {keyword}",
        url: "https://www.coursera.org/search?query={query}",
        source: "Coursera",
        category: "Course",
    },
    ReferenceTemplate {
        title: "Research Papers on {keyword}",
        url: "https://www.researchgate.net/search?q={query}",
        source: "ResearchGate",
        category: "Research",
    },
    ReferenceTemplate {
        title: "Educational Videos on {keyword}",
        url: "https://www.youtube.com/results?search_query={query}+education",
        source: "YouTube",
        category: "Video",
    },
];

/// Number of entries [`reference_list`] returns.
pub const REFERENCE_COUNT: usize = TEMPLATES.len();

/// One entry per template, in template order.
pub fn reference_list(keyword: &str) -> Vec<ReferenceEntry> {
    // Spaces become `+`, everything else unsafe is percent-encoded.
    let query: String = form_urlencoded::byte_serialize(keyword.as_bytes()).collect();

    TEMPLATES
        .iter()
        .map(|t| ReferenceEntry {
            title: t.title.replace("{keyword}", keyword),
            url: t.url.replace("{query}", &query),
            source: t.source.to_string(),
            category: t.category.to_string(),
        })
        .collect()
}
