//! `Link` header pagination.

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
///
/// Returns `None` when the header has no next relation, which ends
/// pagination.
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut segments = part.trim().split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|param| {
            param
                .trim()
                .strip_prefix("rel=")
                .map(|rel| rel.trim_matches('"').split_whitespace().any(|r| r == "next"))
                .unwrap_or(false)
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    })
}
