//! Word lists and small extractors shared by the classifier rules.
//!
//! Matching is token-based wherever a word could also appear inside a
//! hyphenated server name (`dev` vs `chennai-dev-env-09`).

use std::sync::LazyLock;

use regex::Regex;

/// Operating systems the "running X" phrasing recognises.
pub const KNOWN_OS: &[&str] = &[
    "ubuntu",
    "debian",
    "centos",
    "rhel",
    "redhat",
    "fedora",
    "windows",
    "linux",
    "postgresql",
    "postgres",
    "redis",
];

static STATUS_IS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:status|state)\s*(?:is|=|:)\s*([a-z][a-z_-]*)").unwrap()
});

static WITH_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bwith (?:status|state)\s+([a-z][a-z_-]*)").unwrap());

static ENVIRONMENT_IS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:environment|env)\s*(?:is|=|:)\s*([a-z][a-z_-]*)").unwrap()
});

static IN_ENVIRONMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bin (?:the )?([a-z][a-z_-]*) (?:environment|env)\b").unwrap()
});

/// Whitespace tokens with surrounding punctuation trimmed.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-'))
        .filter(|w| !w.is_empty())
}

pub fn has_token(text: &str, words: &[&str]) -> bool {
    tokens(text).any(|t| words.contains(&t))
}

/// Check if the text contains any of the given phrases.
pub fn matches_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

/// Status named by a status word or an explicit "status is X" phrase.
///
/// `running` means up only when the caller allows it; in attribute searches
/// it introduces an operating system instead.
pub fn status_of(text: &str, allow_running: bool) -> Option<String> {
    for token in tokens(text) {
        let status = match token {
            "down" | "offline" | "unreachable" => "down",
            "up" | "online" => "up",
            "running" if allow_running => "up",
            "maintenance" => "maintenance",
            _ => continue,
        };
        return Some(status.into());
    }
    capture(&STATUS_IS, text).or_else(|| capture(&WITH_STATUS, text))
}

/// Environment named by an environment word or an explicit phrase.
pub fn environment_of(text: &str) -> Option<String> {
    for token in tokens(text) {
        let env = match token {
            "production" | "prod" => "production",
            "staging" | "stage" => "staging",
            "development" | "dev" => "development",
            _ => continue,
        };
        return Some(env.into());
    }
    capture(&ENVIRONMENT_IS, text).or_else(|| capture(&IN_ENVIRONMENT, text))
}

/// True if the question asks for server names rather than full details.
pub fn wants_names_only(text: &str) -> bool {
    let names = text.contains("name");
    if (has_token(text, &["only", "just"]) && names)
        || matches_any(text, &["list names", "names of", "name of the servers"])
    {
        return true;
    }
    (text.starts_with("which ") || text.starts_with("what ")) && text.contains("server")
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_trim_punctuation() {
        let t: Vec<&str> = tokens("what's up (chennai-web-01.)").collect();
        assert_eq!(t, vec!["what's", "up", "chennai-web-01"]);
    }

    #[test]
    fn status_words() {
        assert_eq!(status_of("which servers are offline", true).as_deref(), Some("down"));
        assert_eq!(status_of("servers in maintenance", true).as_deref(), Some("maintenance"));
        assert_eq!(status_of("servers running", true).as_deref(), Some("up"));
        assert_eq!(status_of("servers running ubuntu", false), None);
        assert_eq!(status_of("servers where status is rebooting", true).as_deref(), Some("rebooting"));
        assert_eq!(status_of("how many servers do we have", true), None);
    }

    #[test]
    fn environment_words_ignore_hyphenated_names() {
        assert_eq!(environment_of("show me prod servers").as_deref(), Some("production"));
        assert_eq!(environment_of("servers named chennai-dev-env-09"), None);
        assert_eq!(environment_of("servers in the qa environment").as_deref(), Some("qa"));
        assert_eq!(environment_of("environment is dr").as_deref(), Some("dr"));
    }

    #[test]
    fn names_only_detection() {
        assert!(wants_names_only("which servers are down"));
        assert!(wants_names_only("just the names of production servers"));
        assert!(wants_names_only("give me only the server names"));
        assert!(!wants_names_only("show me production servers"));
        assert!(!wants_names_only("list users"));
    }
}
