use crate::models::RawJobRow;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

// ── Selector strategies ───────────────────────────────────────────────────────

/// One CSS selector set for a particular revision of a listing page layout.
/// Strategies are plain data; `parse_with_strategy` is a pure function over
/// raw markup, so each one is testable in isolation.
pub struct SelectorStrategy {
    pub name: &'static str,
    /// Selector for one job card; remaining selectors are scoped to it.
    pub card: &'static str,
    pub title: &'static str,
    pub company: &'static str,
    pub location: &'static str,
    pub description: &'static str,
    pub link: &'static str,
    /// Requirement/tag chips, when the site exposes them.
    pub tags: Option<&'static str>,
    pub posted: Option<&'static str>,
}

/// Try strategies in order until one yields cards. Zero results from every
/// strategy means the layout drifted — expected, not fatal.
pub fn parse_with_fallback(html: &str, strategies: &[SelectorStrategy], source: &str) -> Vec<RawJobRow> {
    for strategy in strategies {
        let rows = parse_with_strategy(html, strategy);
        if !rows.is_empty() {
            debug!("{}: strategy '{}' matched {} cards", source, strategy.name, rows.len());
            return rows;
        }
        debug!("{}: strategy '{}' found nothing, trying next", source, strategy.name);
    }

    warn!("{}: no selector strategy matched — page layout may have changed", source);
    Vec::new()
}

/// Extract raw job rows from a listing page using one selector set.
pub fn parse_with_strategy(html: &str, strategy: &SelectorStrategy) -> Vec<RawJobRow> {
    let doc = Html::parse_document(html);

    let Ok(card_sel) = Selector::parse(strategy.card) else {
        return Vec::new();
    };

    let mut rows = Vec::new();

    for card in doc.select(&card_sel) {
        let url = select_attr(&card, strategy.link, "href")
            .or_else(|| select_attr(&card, strategy.title, "href"));

        rows.push(RawJobRow {
            title: select_text(&card, strategy.title),
            company: select_text(&card, strategy.company),
            location: select_text(&card, strategy.location),
            description: select_text(&card, strategy.description),
            requirements: strategy
                .tags
                .map(|sel| select_all_text(&card, sel))
                .unwrap_or_default(),
            url,
            posted: strategy.posted.and_then(|sel| select_text(&card, sel)),
        });
    }

    rows
}

// ── Element helpers ───────────────────────────────────────────────────────────

/// First match's text content, whitespace-collapsed. None when the selector
/// misses or the text is empty.
fn select_text(el: &ElementRef, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let target = el.select(&sel).next()?;
    let text = clean_text(&target.text().collect::<Vec<_>>().join(" "));
    if text.is_empty() { None } else { Some(text) }
}

/// Text of every match, one string per element.
fn select_all_text(el: &ElementRef, selector: &str) -> Vec<String> {
    let Ok(sel) = Selector::parse(selector) else {
        return Vec::new();
    };
    el.select(&sel)
        .map(|t| clean_text(&t.text().collect::<Vec<_>>().join(" ")))
        .filter(|t| !t.is_empty())
        .collect()
}

fn select_attr(el: &ElementRef, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    el.select(&sel)
        .find_map(|t| t.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const CARD_HTML: &str = r#"
        <html><body>
          <div class="job-card">
            <h2 class="title"><a href="/jobs/123?utm_source=feed">Store  Manager</a></h2>
            <span class="company">Acme Retail</span>
            <div class="loc">Cape Town</div>
            <p class="snippet">Run the floor. Requires Excel and POS systems.</p>
            <ul><li class="tag">Excel</li><li class="tag">Customer Service</li></ul>
            <span class="age">3 days ago</span>
          </div>
          <div class="job-card">
            <h2 class="title"><a href="/jobs/124">Cashier</a></h2>
            <span class="company">Acme Retail</span>
            <div class="loc">Cape Town</div>
            <p class="snippet">Front-of-house till work.</p>
          </div>
        </body></html>
    "#;

    const STRATEGY: SelectorStrategy = SelectorStrategy {
        name: "test",
        card: "div.job-card",
        title: "h2.title a",
        company: "span.company",
        location: "div.loc",
        description: "p.snippet",
        link: "h2.title a",
        tags: Some("li.tag"),
        posted: Some("span.age"),
    };

    const STALE_STRATEGY: SelectorStrategy = SelectorStrategy {
        name: "stale",
        card: "div.old-layout",
        title: "h1",
        company: "span",
        location: "span",
        description: "p",
        link: "a",
        tags: None,
        posted: None,
    };

    #[test]
    fn test_parse_with_strategy() {
        let rows = parse_with_strategy(CARD_HTML, &STRATEGY);
        assert_eq!(rows.len(), 2);

        // Whitespace collapsed in extracted text
        assert_eq!(rows[0].title.as_deref(), Some("Store Manager"));
        assert_eq!(rows[0].company.as_deref(), Some("Acme Retail"));
        assert_eq!(rows[0].url.as_deref(), Some("/jobs/123?utm_source=feed"));
        assert_eq!(rows[0].requirements, vec!["Excel", "Customer Service"]);
        assert_eq!(rows[0].posted.as_deref(), Some("3 days ago"));

        assert_eq!(rows[1].title.as_deref(), Some("Cashier"));
        assert!(rows[1].requirements.is_empty());
    }

    #[test]
    fn test_fallback_tries_next_strategy() {
        let strategies = [STALE_STRATEGY, STRATEGY];
        let rows = parse_with_fallback(CARD_HTML, &strategies, "test-source");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_no_strategy_matches_is_empty_not_error() {
        let rows = parse_with_fallback("<html><body></body></html>", &[STRATEGY], "test-source");
        assert!(rows.is_empty());
    }
}
