//! Parse HTTP response header lines.

/// Value of the last header line named `name` (case-insensitive).
///
/// Later lines win: when curl reports several header blocks (interim
/// responses), the final response comes last.
pub fn find_header<'a>(lines: &'a [String], name: &str) -> Option<&'a str> {
    lines.iter().rev().find_map(|line| {
        let (n, v) = line.trim().split_once(':')?;
        n.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}

/// Parse a resumable-upload `Range: bytes=0-N` header into `N`.
///
/// Only the `0-N` form is meaningful for a resumable session: the server
/// always reports the contiguous prefix it has persisted.
pub fn parse_range_end(value: &str) -> Option<u64> {
    let value = value.trim();
    let ranges = value
        .strip_prefix("bytes=")
        .or_else(|| value.strip_prefix("bytes "))?;
    let (start, end) = ranges.trim().split_once('-')?;
    if start.trim() != "0" {
        return None;
    }
    end.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn find_header_takes_last_block() {
        let l = lines(&[
            "HTTP/1.1 100 Continue",
            "X-Test: first",
            "",
            "HTTP/1.1 200 OK",
            "x-test: second",
        ]);
        assert_eq!(find_header(&l, "X-Test"), Some("second"));
        assert_eq!(find_header(&l, "Location"), None);
    }

    #[test]
    fn find_header_keeps_colons_in_value() {
        let l = lines(&["Location: https://example.com:8443/upload?id=1"]);
        assert_eq!(
            find_header(&l, "location"),
            Some("https://example.com:8443/upload?id=1")
        );
    }

    #[test]
    fn range_end_parses_committed_prefix() {
        assert_eq!(parse_range_end("bytes=0-262143"), Some(262_143));
        assert_eq!(parse_range_end(" bytes=0-0 "), Some(0));
    }

    #[test]
    fn range_end_rejects_garbage() {
        assert_eq!(parse_range_end("bytes=10-20"), None);
        assert_eq!(parse_range_end("items=0-5"), None);
        assert_eq!(parse_range_end("bytes=0-"), None);
    }
}
