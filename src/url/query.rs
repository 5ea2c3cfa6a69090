use url::Url;

/// Reads a query parameter from a URL string
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Returns `url` with `name` set to `value`, replacing any existing occurrence
pub fn with_query_param(url: &Url, name: &str, value: &str) -> Url {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut updated = url.clone();
    {
        let mut pairs = updated.query_pairs_mut();
        pairs.clear();
        for (key, val) in &retained {
            pairs.append_pair(key, val);
        }
        pairs.append_pair(name, value);
    }
    updated
}

/// Re-appends `name` from `previous` onto `next` when `next` dropped it
///
/// Pagination links on some templates omit the page-size parameter, which
/// would silently switch the site back to its default page size mid-crawl.
/// Returns `next` untouched when it already carries the parameter, when
/// `previous` never had it, or when `next` does not parse.
pub fn carry_param(previous: &str, next: &str, name: &str) -> String {
    let Some(value) = query_param(previous, name) else {
        return next.to_string();
    };

    match Url::parse(next) {
        Ok(parsed) => {
            if parsed.query_pairs().any(|(key, _)| key == name) {
                next.to_string()
            } else {
                let mut updated = parsed;
                updated.query_pairs_mut().append_pair(name, &value);
                updated.to_string()
            }
        }
        Err(_) => next.to_string(),
    }
}
