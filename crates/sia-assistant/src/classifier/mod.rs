//! Intent classification for inventory questions.
//!
//! Converts free text ("how many servers are down?") into a
//! `Classification`: one intent, its parameters and a confidence. The rule
//! table is built once at startup and read concurrently afterwards.
//! Classification is a pure function of the input text.

pub mod rules;
pub mod vocab;

use sia_protocol::{Classification, Intent, Parameters, params};

pub use rules::{Rule, Trigger};

/// Ordered-rule intent classifier.
pub struct IntentClassifier {
    rules: Vec<Rule>,
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self::with_rules(rules::default_rules())
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify a question. Never fails: anything no rule can resolve is
    /// `Intent::Unknown` with confidence 0.0.
    pub fn classify(&self, text: &str) -> Classification {
        let text = normalize(text);
        if text.is_empty() {
            return Classification::unknown();
        }

        let Some(rule) = self.rules.iter().find(|r| r.trigger.fires(&text)) else {
            return Classification::unknown();
        };

        if rule.intent == Intent::Unknown {
            return deferred(rule.name);
        }

        let Some(mut found) = (rule.extract)(&text) else {
            tracing::debug!(rule = rule.name, "parameters unresolved, treating as unknown");
            return deferred(rule.name);
        };

        if is_listing(rule.intent) && vocab::wants_names_only(&text) {
            found.insert(params::VIEW, params::VIEW_NAMES);
        }

        Classification {
            intent: rule.intent,
            params: found,
            confidence: 1.0,
            rule: Some(rule.name.to_string()),
        }
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn deferred(rule: &str) -> Classification {
    Classification {
        intent: Intent::Unknown,
        params: Parameters::new(),
        confidence: 0.0,
        rule: Some(rule.to_string()),
    }
}

fn is_listing(intent: Intent) -> bool {
    matches!(
        intent,
        Intent::ListByStatus | Intent::ListByEnvironment | Intent::SearchByAttribute
    )
}

/// Lowercase, turn sentence punctuation into spaces and collapse whitespace.
/// Commas between digits ("1,024") are kept as part of the number.
pub fn normalize(text: &str) -> String {
    let lower: Vec<char> = text.to_lowercase().chars().collect();
    let spaced: String = lower
        .iter()
        .enumerate()
        .map(|(i, &c)| match c {
            ',' if digit_at(&lower, i.wrapping_sub(1)) && digit_at(&lower, i + 1) => ',',
            '?' | '!' | ',' | ';' | '"' | '(' | ')' => ' ',
            other => other,
        })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn digit_at(chars: &[char], i: usize) -> bool {
    chars.get(i).is_some_and(char::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Classification {
        IntentClassifier::new().classify(text)
    }

    fn param<'a>(c: &'a Classification, key: &str) -> Option<&'a str> {
        c.params.get(key)
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize("  How MANY servers?!  "), "how many servers");
        assert_eq!(normalize("down, up; maintenance"), "down up maintenance");
        assert_eq!(normalize("chennai-web-01."), "chennai-web-01.");
        assert_eq!(normalize("more than 1,024 GB"), "more than 1,024 gb");
        assert_eq!(normalize("web, 8, db"), "web 8 db");
    }

    // ── Scenarios ───────────────────────────────────────────────

    #[test]
    fn count_all_servers() {
        let c = classify("How many servers do we have?");
        assert_eq!(c.intent, Intent::CountServers);
        assert!(c.params.is_empty());
        assert_eq!(c.confidence, 1.0);
        assert_eq!(c.rule.as_deref(), Some("count"));
    }

    #[test]
    fn which_servers_are_down() {
        let c = classify("Which servers are down?");
        assert_eq!(c.intent, Intent::ListByStatus);
        assert_eq!(param(&c, params::STATUS), Some("down"));
        assert!(c.params.names_only());
    }

    #[test]
    fn production_servers() {
        let c = classify("Show me production servers");
        assert_eq!(c.intent, Intent::ListByEnvironment);
        assert_eq!(param(&c, params::ENVIRONMENT), Some("production"));
        assert!(!c.params.names_only());
    }

    #[test]
    fn server_detail_by_name() {
        let c = classify("What's the status of chennai-web-01?");
        assert_eq!(c.intent, Intent::ServerDetail);
        assert_eq!(param(&c, params::NAME), Some("chennai-web-01"));
    }

    #[test]
    fn ram_threshold() {
        let c = classify("Show me servers with more than 8GB RAM");
        assert_eq!(c.intent, Intent::SearchByAttribute);
        assert_eq!(c.params, Parameters::new().with(params::RAM_GT, "8"));
    }

    #[test]
    fn gibberish_is_unknown() {
        let c = classify("asdkjashdkj random text");
        assert_eq!(c.intent, Intent::Unknown);
        assert_eq!(c.confidence, 0.0);
        assert!(c.rule.is_none());
    }

    #[test]
    fn empty_is_unknown() {
        assert_eq!(classify("   ?  ").intent, Intent::Unknown);
    }

    // ── Rules ───────────────────────────────────────────────────

    #[test]
    fn count_with_status_and_environment() {
        let c = classify("How many production servers are down?");
        assert_eq!(c.intent, Intent::CountServers);
        assert_eq!(param(&c, params::STATUS), Some("down"));
        assert_eq!(param(&c, params::ENVIRONMENT), Some("production"));
    }

    #[test]
    fn status_synonyms() {
        assert_eq!(param(&classify("list offline servers"), params::STATUS), Some("down"));
        assert_eq!(param(&classify("servers that are online"), params::STATUS), Some("up"));
        assert_eq!(
            param(&classify("anything under maintenance?"), params::STATUS),
            Some("maintenance")
        );
    }

    #[test]
    fn unrecognised_status_value_is_kept() {
        let c = classify("servers where status is rebooting");
        assert_eq!(c.intent, Intent::ListByStatus);
        assert_eq!(param(&c, params::STATUS), Some("rebooting"));
    }

    #[test]
    fn threshold_variants() {
        let c = classify("which servers have at least 4 cores");
        assert_eq!(param(&c, params::CPU_GTE), Some("4"));

        let c = classify("servers with disk under 1 TB");
        assert_eq!(param(&c, params::DISK_LT), Some("1024"));

        let c = classify("production servers with ram below 16gb that are up");
        assert_eq!(param(&c, params::RAM_LT), Some("16"));
        assert_eq!(param(&c, params::STATUS), Some("up"));
        assert_eq!(param(&c, params::ENVIRONMENT), Some("production"));
    }

    #[test]
    fn unresolvable_threshold_degrades_to_unknown() {
        // No resource named.
        let c = classify("servers with more than 8gb");
        assert_eq!(c.intent, Intent::Unknown);
        assert_eq!(c.rule.as_deref(), Some("resource_threshold"));

        // No number.
        assert_eq!(classify("servers with more than lots of ram").intent, Intent::Unknown);

        // Gigabytes of CPU make no sense.
        assert_eq!(classify("more than 8gb of cpu").intent, Intent::Unknown);

        // Fractions are not truncated to their integer part.
        let c = classify("Show me servers with more than 8.5GB RAM");
        assert_eq!(c.intent, Intent::Unknown);
        assert_eq!(c.confidence, 0.0);
        assert_eq!(c.rule.as_deref(), Some("resource_threshold"));

        // Malformed digit grouping.
        assert_eq!(classify("more than 1,02 gb of ram").intent, Intent::Unknown);
    }

    #[test]
    fn grouped_thousands_are_read_whole() {
        let c = classify("Show me servers with more than 1,024 GB of disk");
        assert_eq!(c.intent, Intent::SearchByAttribute);
        assert_eq!(c.params, Parameters::new().with(params::DISK_GT, "1024"));
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn os_version_tokens_are_not_host_names() {
        let c = classify("which servers are running ubuntu-22");
        assert_eq!(c.intent, Intent::SearchByAttribute);
        assert_eq!(param(&c, params::OS), Some("ubuntu"));
        assert_eq!(param(&c, params::NAME), None);

        // A host name later in the text still wins.
        let c = classify("is ubuntu-22 installed on chennai-web-01");
        assert_eq!(c.intent, Intent::ServerDetail);
        assert_eq!(param(&c, params::NAME), Some("chennai-web-01"));
    }

    #[test]
    fn under_maintenance_is_not_a_threshold() {
        let c = classify("how many servers under maintenance have more than 8gb ram");
        assert_eq!(c.intent, Intent::SearchByAttribute);
        assert_eq!(param(&c, params::RAM_GT), Some("8"));
        assert_eq!(param(&c, params::STATUS), Some("maintenance"));
    }

    #[test]
    fn attribute_search() {
        let c = classify("servers owned by Raja");
        assert_eq!(c.intent, Intent::SearchByAttribute);
        assert_eq!(param(&c, params::OWNER), Some("raja"));

        let c = classify("production servers running postgresql");
        assert_eq!(param(&c, params::OS), Some("postgresql"));
        assert_eq!(param(&c, params::ENVIRONMENT), Some("production"));
        assert_eq!(param(&c, params::STATUS), None, "running introduces the os");

        let c = classify("servers named cache");
        assert_eq!(param(&c, params::NAME_FRAGMENT), Some("cache"));

        let c = classify("servers located in chennai");
        assert_eq!(param(&c, params::LOCATION), Some("chennai"));
    }

    #[test]
    fn users() {
        let c = classify("list all users");
        assert_eq!(c.intent, Intent::ListUsers);
        assert!(c.params.is_empty());

        let c = classify("who are the admins?");
        assert_eq!(param(&c, params::ROLE), Some("admin"));

        let c = classify("users in the development team");
        assert_eq!(param(&c, params::DEPARTMENT), Some("development"));
    }

    #[test]
    fn list_everything() {
        let c = classify("list all servers");
        assert_eq!(c.intent, Intent::ListByStatus);
        assert!(c.params.is_empty());
    }

    #[test]
    fn role_words() {
        let c = classify("show me the database servers");
        assert_eq!(c.intent, Intent::SearchByAttribute);
        assert_eq!(param(&c, params::NAME_FRAGMENT), Some("database"));
    }

    #[test]
    fn conversational_questions_defer() {
        for q in [
            "Can you explain the current infrastructure?",
            "Give me a health assessment of our fleet",
            "What do you recommend for the database servers?",
        ] {
            let c = classify(q);
            assert_eq!(c.intent, Intent::Unknown, "{q}");
            assert_eq!(c.confidence, 0.0);
            assert_eq!(c.rule.as_deref(), Some("conversational"));
        }
    }

    #[test]
    fn healthy_is_not_conversational() {
        assert_ne!(classify("which servers are healthy and up").intent, Intent::Unknown);
    }

    #[test]
    fn server_name_wins_over_other_words() {
        let c = classify("is chennai-db-02 down in production?");
        assert_eq!(c.intent, Intent::ServerDetail);
        assert_eq!(param(&c, params::NAME), Some("chennai-db-02"));
    }

    #[test]
    fn names_only_view() {
        let c = classify("just the names of production servers");
        assert!(c.params.names_only());
        let c = classify("How many servers are down?");
        assert!(!c.params.contains(params::VIEW), "counts have no view");
    }

    #[test]
    fn classification_is_deterministic_and_case_insensitive() {
        let classifier = IntentClassifier::new();
        let a = classifier.classify("WHICH SERVERS ARE DOWN?");
        let b = classifier.classify("which servers are down?");
        assert_eq!(a, b);
        assert_eq!(classifier.classify("which servers are down?"), b);
    }

    #[test]
    fn confidence_is_binary() {
        for q in ["how many servers", "what is the meaning of life", "list users"] {
            let c = classify(q);
            assert!(c.confidence == 0.0 || c.confidence == 1.0);
        }
    }

    #[test]
    fn custom_rule_table() {
        let classifier = IntentClassifier::with_rules(vec![Rule {
            name: "everything",
            intent: Intent::CountServers,
            trigger: Trigger::Words(&["servers"]),
            extract: |_| Some(Parameters::new()),
        }]);
        assert_eq!(classifier.rules().len(), 1);
        assert_eq!(classifier.classify("servers").intent, Intent::CountServers);
        assert_eq!(classifier.classify("users").intent, Intent::Unknown);
    }
}
