//! Line parser for hosts-format and Adblock-Plus-style lists.
//!
//! Supported line shapes:
//! ```text
//! 0.0.0.0 ads.example.com        # hosts format, second column is the domain
//! tracker.example.net            # plain domain list
//! ||metrics.example.org^         # ABP domain rule
//! ! ABP comment / [Adblock Plus] # skipped
//! ```

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

/// Address every blocked domain is bound to.
pub const BIND_ADDRESS: &str = "127.0.0.1";

/// System aliases shipped in many public hosts lists. Never blocked.
pub const RESERVED_NAMES: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "local",
    "broadcasthost",
    "ip6-localhost",
    "ip6-loopback",
    "ip6-localnet",
    "ip6-mcastprefix",
    "ip6-allnodes",
    "ip6-allrouters",
    "ip6-allhosts",
];

/// One hosts-file entry: a domain bound to the loopback address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineContent {
    address: &'static str,
    domain: String,
}

impl LineContent {
    fn new(domain: String) -> Self {
        Self {
            address: BIND_ADDRESS,
            domain,
        }
    }

    pub fn address(&self) -> &str {
        self.address
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl fmt::Display for LineContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.domain)
    }
}

/// Domains extracted from one or more lists, keyed by domain name.
pub type DomainSet = HashMap<String, LineContent>;

/// Check whether a domain is one of the reserved system aliases.
pub fn is_reserved(domain: &str) -> bool {
    RESERVED_NAMES.contains(&domain)
}

/// Parse a single raw line into a hosts entry.
///
/// Returns `None` for blank lines, comments, ABP headers, reserved names,
/// bare IP addresses, and anything that does not yield a domain.
pub fn parse_line(raw: &str) -> Option<LineContent> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with(['#', '!', '[']) {
        return None;
    }

    let line = match line.split_once('#') {
        Some((before, _)) => before.trim_end(),
        None => line,
    };
    let line = line.to_lowercase();

    let domain = match line
        .strip_prefix("||")
        .and_then(|rest| rest.strip_suffix('^'))
    {
        Some(abp) => abp.trim(),
        None => {
            let mut tokens = line.split_whitespace();
            let first = tokens.next()?;
            tokens.next().unwrap_or(first)
        }
    };

    if domain.is_empty()
        || domain.contains(char::is_whitespace)
        || is_reserved(domain)
        || domain.parse::<IpAddr>().is_ok()
    {
        return None;
    }

    Some(LineContent::new(domain.to_string()))
}

/// Parse a whole list into a domain set.
///
/// Later duplicates overwrite earlier ones, which is harmless because every
/// entry for a given domain is identical.
pub fn parse_content(content: &str) -> DomainSet {
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    content
        .lines()
        .filter_map(parse_line)
        .map(|entry| (entry.domain.clone(), entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(line: &str) -> Option<String> {
        parse_line(line).map(|c| c.domain().to_string())
    }

    #[test]
    fn test_parse_hosts_format() {
        assert_eq!(domain("0.0.0.0 ads.example.com"), Some("ads.example.com".into()));
        assert_eq!(domain("127.0.0.1\tads.example.com"), Some("ads.example.com".into()));
    }

    #[test]
    fn test_parse_hosts_format_with_comment() {
        assert_eq!(
            domain("0.0.0.0 ads.example.com # comment"),
            Some("ads.example.com".into())
        );
        assert_eq!(
            domain("0.0.0.0 ads.example.com#comment"),
            Some("ads.example.com".into())
        );
    }

    #[test]
    fn test_parse_abp_rule() {
        assert_eq!(domain("||ads.example.com^"), Some("ads.example.com".into()));
        assert_eq!(domain("  ||Ads.Example.COM^  "), Some("ads.example.com".into()));
    }

    #[test]
    fn test_parse_abp_rule_with_comment() {
        assert_eq!(
            domain("||ads.example.com^ # tracking"),
            Some("ads.example.com".into())
        );
    }

    #[test]
    fn test_parse_plain_domain() {
        assert_eq!(domain("tracker.example.net"), Some("tracker.example.net".into()));
        assert_eq!(domain("TRACKER.Example.NET"), Some("tracker.example.net".into()));
    }

    #[test]
    fn test_parse_takes_second_token() {
        assert_eq!(
            domain("0.0.0.0 first.example.com second.example.com"),
            Some("first.example.com".into())
        );
    }

    #[test]
    fn test_skip_comments_and_headers() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("# hosts comment"), None);
        assert_eq!(parse_line("! ABP comment"), None);
        assert_eq!(parse_line("[Adblock Plus 2.0]"), None);
        assert_eq!(parse_line("   # indented comment"), None);
    }

    #[test]
    fn test_skip_reserved_names() {
        for name in RESERVED_NAMES {
            assert_eq!(parse_line(name), None, "{} should be skipped", name);
            assert_eq!(
                parse_line(&format!("127.0.0.1 {}", name)),
                None,
                "{} should be skipped",
                name
            );
        }
        assert_eq!(parse_line("::1 ip6-localhost ip6-loopback"), None);
        assert_eq!(parse_line("255.255.255.255 broadcasthost"), None);
        assert_eq!(parse_line("127.0.0.1 LocalHost"), None);
    }

    #[test]
    fn test_skip_empty_abp_rule() {
        assert_eq!(parse_line("||^"), None);
    }

    #[test]
    fn test_skip_bare_addresses() {
        assert_eq!(parse_line("0.0.0.0"), None);
        assert_eq!(parse_line("0.0.0.0 0.0.0.0"), None);
        assert_eq!(parse_line("::1"), None);
        assert_eq!(parse_line("||10.0.0.1^"), None);
        assert!(parse_line("0.0.0.0 1.2.3.4.example.com").is_some());
    }

    #[test]
    fn test_bind_address_is_loopback() {
        let entry = parse_line("0.0.0.0 ads.example.com").unwrap();
        assert_eq!(entry.address(), "127.0.0.1");
        assert_eq!(entry.to_string(), "127.0.0.1 ads.example.com");
    }

    #[test]
    fn test_parse_content_dedup() {
        let content = "\
# StevenBlack-style header
127.0.0.1 localhost
0.0.0.0 ads.example.com
0.0.0.0 ADS.example.com
||ads.example.com^
ads.example.com
tracker.example.net
";
        let set = parse_content(content);
        assert_eq!(set.len(), 2);
        assert!(set.contains_key("ads.example.com"));
        assert!(set.contains_key("tracker.example.net"));
    }

    #[test]
    fn test_parse_content_crlf() {
        let set = parse_content("0.0.0.0 ads.example.com\r\n||tracker.example.net^\r\n");
        assert_eq!(set.len(), 2);
        assert!(set.contains_key("tracker.example.net"));
    }

    #[test]
    fn test_parse_content_strips_bom() {
        let set = parse_content("\u{FEFF}# Title: example list\n0.0.0.0 ads.example.com\n");
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["ads.example.com"]);

        let set = parse_content("\u{FEFF}tracker.example.net\n");
        assert!(set.contains_key("tracker.example.net"));
    }

    #[test]
    fn test_parse_content_empty() {
        assert!(parse_content("").is_empty());
        assert!(parse_content("! only\n# comments\n[Adblock]\n").is_empty());
    }
}
