/// Parses a plaintext host list.
///
/// One entry per line; blank lines and `#` comments are skipped, the last
/// whitespace-separated token is the hostname (so hosts-file lines like
/// `0.0.0.0 ads.example.com` work), and tokens without a `.` are dropped.
pub fn parse_host_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().last())
        .filter(|host| host.contains('.'))
        .map(|host| host.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_last_token_and_skips_comments() {
        let text = "\
# anudeepND adservers
0.0.0.0 ads.example.com
  # indented comment

tracker.example.net
0.0.0.0 localhost
127.0.0.1\tPixel.Example.ORG
";
        assert_eq!(
            parse_host_list(text),
            vec![
                "ads.example.com".to_string(),
                "tracker.example.net".to_string(),
                "pixel.example.org".to_string(),
            ]
        );
    }

    #[test]
    fn handles_crlf() {
        assert_eq!(
            parse_host_list("0.0.0.0 a.example\r\n0.0.0.0 b.example\r\n"),
            vec!["a.example".to_string(), "b.example".to_string()]
        );
    }
}
