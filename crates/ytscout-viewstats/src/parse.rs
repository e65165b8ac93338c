//! HTML parsing for ViewStats channelytics pages.
//!
//! Works on the fully rendered page. Selectors follow the site's card
//! markup: `card-value-views`, `card-value`, `card-rev` and the
//! long-vs-shorts block.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

use crate::types::{PageOutcome, ScrapedStats};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static VIEWS: LazyLock<Selector> = LazyLock::new(|| selector("p.card-value-views"));
static VIEWS_FALLBACK: LazyLock<Selector> =
    LazyLock::new(|| selector("[class*='card-value'][class*='views']"));
static SUBS: LazyLock<Selector> = LazyLock::new(|| selector("p.card-value"));
static REVENUE: LazyLock<Selector> = LazyLock::new(|| selector("p.card-rev"));
static SPLIT_VALUE: LazyLock<Selector> =
    LazyLock::new(|| selector(".longs-vs-shorts-stats-value"));
static SPLIT_LABEL: LazyLock<Selector> = LazyLock::new(|| selector(".vsvs-text-gray"));

const NOT_TRACKING_PHRASES: [&str; 3] = [
    "aren't tracking this channel",
    "aren\u{2019}t tracking this channel",
    "Track Channel",
];

const ERROR_INDICATORS: [&str; 4] = ["404", "page not found", "not found", "error"];

/// Classify a rendered channel page and extract its figures.
///
/// Checked in order:
/// 1. a "not found" title or the site's "not tracking" notice;
/// 2. the views card, whose presence means the page is a real profile;
/// 3. generic error wording in the visible text (only without a views card,
///    since figures like "1,404" would otherwise trip it).
#[must_use]
pub fn parse_channel_page(html: &str) -> PageOutcome {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(|t| element_text(&t).to_lowercase())
        .unwrap_or_default();
    if title.contains("not found") {
        return PageOutcome::NotTracked {
            reason: "page title reports not found".to_owned(),
        };
    }

    let visible = document
        .select(&BODY)
        .next()
        .map(|body| visible_text(&body))
        .unwrap_or_default();

    if NOT_TRACKING_PHRASES.iter().any(|p| visible.contains(p)) {
        return PageOutcome::NotTracked {
            reason: "channel not tracked by ViewStats".to_owned(),
        };
    }

    let Some(views) = first_text(&document, &VIEWS).or_else(|| first_text(&document, &VIEWS_FALLBACK))
    else {
        let lowered = visible.to_lowercase();
        if let Some(hit) = ERROR_INDICATORS.iter().find(|i| lowered.contains(*i)) {
            return PageOutcome::NotTracked {
                reason: format!("page contains error indicator {hit:?}"),
            };
        }
        return PageOutcome::NoData;
    };

    let mut stats = ScrapedStats {
        views_last_28_days: views,
        subs_last_28_days: first_text(&document, &SUBS).unwrap_or_default(),
        estimated_rev_last_28_days: first_text(&document, &REVENUE).unwrap_or_default(),
        ..ScrapedStats::default()
    };

    for value in document.select(&SPLIT_VALUE) {
        let Some(parent) = value.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        let Some(label) = parent.select(&SPLIT_LABEL).next() else {
            continue;
        };
        let label = element_text(&label);
        if label.contains("Long Views") {
            stats.long_views = element_text(&value);
        } else if label.contains("Short Views") {
            stats.short_views = element_text(&value);
        }
    }

    PageOutcome::Stats(stats)
}

/// Trimmed text of the first non-empty match.
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

/// Text a reader would see: script, style and template contents excluded.
fn visible_text(element: &ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_visible(element, &mut out);
    out
}

fn collect_visible(element: &ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) => {
                if matches!(el.name(), "script" | "style" | "noscript" | "template") {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_visible(&child_el, out);
                }
            }
            _ => {}
        }
    }
}
