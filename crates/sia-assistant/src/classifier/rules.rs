//! The ordered rule table.
//!
//! Each rule pairs a trigger pattern with a parameter extractor. Rules are
//! tried top to bottom and the first trigger that matches decides the intent.
//! If its extractor cannot resolve the parameters the question is
//! classified as unknown instead of guessing.

use std::sync::LazyLock;

use regex::Regex;
use sia_protocol::{Intent, Parameters, params};

use super::vocab::{self, KNOWN_OS, has_token};

/// What makes a rule fire.
pub enum Trigger {
    /// Any word occurs as a whole token.
    Words(&'static [&'static str]),
    Pattern(&'static LazyLock<Regex>),
    Test(fn(&str) -> bool),
    AnyOf(Vec<Trigger>),
}

impl Trigger {
    pub fn fires(&self, text: &str) -> bool {
        match self {
            Self::Words(words) => has_token(text, words),
            Self::Pattern(re) => re.is_match(text),
            Self::Test(test) => test(text),
            Self::AnyOf(triggers) => triggers.iter().any(|t| t.fires(text)),
        }
    }
}

/// Parameter extractor. `None` means the question matched but its
/// parameters could not be resolved.
pub type Extractor = fn(&str) -> Option<Parameters>;

pub struct Rule {
    pub name: &'static str,
    pub intent: Intent,
    pub trigger: Trigger,
    pub extract: Extractor,
}

// ── Patterns ────────────────────────────────────────────────────

static SERVER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([a-z][a-z0-9]*(?:-[a-z0-9]+)*-\d+)\b").unwrap());

static CONVERSATIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:explain|tell me about|describe|what do you think|analy[sz]e|recommend|suggest|advice|advise|opinion|insights?|interpret|in simple terms|health|assessment|evaluate|evaluation|rundown|breakdown|situation)\b",
    )
    .unwrap()
});

const COMPARATOR: &str = r"more than|greater than|higher than|larger than|bigger than|over|above|at least|less than|fewer than|lower than|smaller than|under|below|at most";
const RESOURCE: &str = r"ram|memory|mem|disk|storage|space|cpus?|cores?|vcpus?";

static THRESHOLD_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:{COMPARATOR})\b.*\b(?:{RESOURCE}|\d+\s*(?:gb|tb))\b|\b(?:{RESOURCE})\b.*\b(?:{COMPARATOR})\b"
    ))
    .unwrap()
});

static THRESHOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?P<cmp>{COMPARATOR})\s+(?P<num>\d+(?:[.,]\d+)*)\s*(?P<unit>gb|tb|g|t)?\b(?:\s+(?:of\s+)?(?P<res>{RESOURCE})\b)?"
    ))
    .unwrap()
});

static ATTRIBUTE_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:owned by|belonging to|managed by|owner is|named|called|matching|containing|located in|(?:with|on|using) os|os is|running (?:{}))\b",
        KNOWN_OS.join("|")
    ))
    .unwrap()
});

static OWNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:owned by|belonging to|managed by|owner is)\s+([a-z][a-z.'-]*)").unwrap()
});

static NAME_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:named|called|matching|containing)\s+['"]?([a-z0-9][a-z0-9._-]*)"#).unwrap()
});

static RUNNING_OS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\brunning ({})\b", KNOWN_OS.join("|"))).unwrap()
});

static OS_IS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:(?:with|on|using) os|os (?:is|=))\s*([a-z][a-z0-9.]*)").unwrap()
});

static LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\blocated in\s+(?:the\s+)?([a-z][a-z0-9-]*)").unwrap());

static USERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:users?|admins?|administrators?|people|owners|operators|read-only|readonly)\b")
        .unwrap()
});

static DEPARTMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:in|from|of)\s+(?:the\s+)?([a-z][a-z0-9&-]*)\s+(?:department|dept|team)\b")
        .unwrap()
});

static COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:how many|count|total|number of|summary|overview|statistics|stats)\b").unwrap()
});

static STATUS_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:status|state)\s*(?:is|=|:)\s*[a-z]|\bwith (?:status|state) [a-z]").unwrap()
});

static ENVIRONMENT_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:environment|env)\s*(?:is|=|:)\s*[a-z]|\bin (?:the )?[a-z][a-z_-]* (?:environment|env)\b")
        .unwrap()
});

static ALL_SERVERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:all|every|list|list all|show all|show me all)\s+(?:the\s+|of\s+the\s+|our\s+)?(?:servers?|machines|hosts|vms)\b|\b(?:what|which) servers (?:do we have|exist|are there)\b",
    )
    .unwrap()
});

const ROLE_WORDS: &[&str] = &[
    "web",
    "db",
    "database",
    "api",
    "cache",
    "monitoring",
    "backup",
];

// ── Table ───────────────────────────────────────────────────────

/// The default rule table, highest priority first.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "server_name",
            intent: Intent::ServerDetail,
            trigger: Trigger::Test(|text| host_name(text).is_some()),
            extract: extract_server_name,
        },
        // Open-ended questions go to the completion service.
        Rule {
            name: "conversational",
            intent: Intent::Unknown,
            trigger: Trigger::Pattern(&CONVERSATIONAL),
            extract: |_| Some(Parameters::new()),
        },
        Rule {
            name: "resource_threshold",
            intent: Intent::SearchByAttribute,
            trigger: Trigger::Pattern(&THRESHOLD_TRIGGER),
            extract: extract_threshold,
        },
        Rule {
            name: "attribute_search",
            intent: Intent::SearchByAttribute,
            trigger: Trigger::Pattern(&ATTRIBUTE_TRIGGER),
            extract: extract_attributes,
        },
        Rule {
            name: "list_users",
            intent: Intent::ListUsers,
            trigger: Trigger::Pattern(&USERS),
            extract: extract_users,
        },
        Rule {
            name: "count",
            intent: Intent::CountServers,
            trigger: Trigger::Pattern(&COUNT),
            extract: extract_count,
        },
        Rule {
            name: "status",
            intent: Intent::ListByStatus,
            trigger: Trigger::AnyOf(vec![
                Trigger::Words(&[
                    "down",
                    "offline",
                    "unreachable",
                    "up",
                    "online",
                    "running",
                    "maintenance",
                ]),
                Trigger::Pattern(&STATUS_PHRASE),
            ]),
            extract: |text| {
                vocab::status_of(text, true).map(|s| Parameters::new().with(params::STATUS, s))
            },
        },
        Rule {
            name: "environment",
            intent: Intent::ListByEnvironment,
            trigger: Trigger::AnyOf(vec![
                Trigger::Words(&["production", "prod", "staging", "stage", "development", "dev"]),
                Trigger::Pattern(&ENVIRONMENT_PHRASE),
            ]),
            extract: |text| {
                vocab::environment_of(text).map(|e| Parameters::new().with(params::ENVIRONMENT, e))
            },
        },
        Rule {
            name: "all_servers",
            intent: Intent::ListByStatus,
            trigger: Trigger::Pattern(&ALL_SERVERS),
            extract: |_| Some(Parameters::new()),
        },
        Rule {
            name: "role_search",
            intent: Intent::SearchByAttribute,
            trigger: Trigger::Words(ROLE_WORDS),
            extract: |text| {
                vocab::tokens(text)
                    .find(|t| ROLE_WORDS.contains(t))
                    .map(|role| Parameters::new().with(params::NAME_FRAGMENT, role))
            },
        },
    ]
}

// ── Extractors ──────────────────────────────────────────────────

/// The first host-like token that is not an OS with a version ("ubuntu-22").
fn host_name(text: &str) -> Option<&str> {
    SERVER_NAME
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|name| {
            !name
                .split('-')
                .next()
                .is_some_and(|head| KNOWN_OS.contains(&head))
        })
}

fn extract_server_name(text: &str) -> Option<Parameters> {
    let name = host_name(text)?;
    Some(Parameters::new().with(params::NAME, name))
}

/// Comparator, number and resource from phrases like "more than 8gb ram"
/// or "at least 4 cores". Terabytes are converted to gigabytes.
fn extract_threshold(text: &str) -> Option<Parameters> {
    let caps = THRESHOLD.captures(text)?;
    let comparison = match caps.name("cmp")?.as_str() {
        "at least" => "gte",
        "at most" => "lte",
        "less than" | "fewer than" | "lower than" | "smaller than" | "under" | "below" => "lt",
        _ => "gt",
    };
    let mut value = whole_number(caps.name("num")?.as_str())?;
    let unit = caps.name("unit").map(|m| m.as_str());

    let resource = match caps.name("res") {
        Some(word) => resource_of(word.as_str())?,
        None => sole_resource(text)?,
    };

    match (resource, unit) {
        ("cpu", Some(_)) => return None,
        (_, Some("tb" | "t")) => value = value.checked_mul(1024)?,
        _ => {}
    }

    let mut found = Parameters::new().with(&format!("{resource}_{comparison}"), value.to_string());
    co_extract(text, &mut found, true);
    Some(found)
}

/// "8" or "1,024". Fractions and malformed digit groups are rejected
/// rather than truncated.
fn whole_number(raw: &str) -> Option<u32> {
    if raw.contains('.') {
        return None;
    }
    let mut groups = raw.split(',');
    let lead = groups.next()?;
    let mut digits = lead.to_string();
    for group in groups {
        if group.len() != 3 || lead.len() > 3 {
            return None;
        }
        digits.push_str(group);
    }
    digits.parse().ok()
}

fn resource_of(word: &str) -> Option<&'static str> {
    match word {
        "ram" | "memory" | "mem" => Some("ram"),
        "disk" | "storage" | "space" => Some("disk"),
        w if w.starts_with("cpu") || w.starts_with("core") || w.starts_with("vcpu") => Some("cpu"),
        _ => None,
    }
}

/// The single resource named anywhere in the text. Ambiguous or absent
/// resources resolve to nothing.
fn sole_resource(text: &str) -> Option<&'static str> {
    let mut found = vocab::tokens(text).filter_map(resource_of);
    let first = found.next()?;
    found.all(|r| r == first).then_some(first)
}

fn extract_attributes(text: &str) -> Option<Parameters> {
    let mut found = Parameters::new();
    if let Some(owner) = capture(&OWNER, text) {
        found.insert(params::OWNER, owner.trim_end_matches("'s"));
    }
    if let Some(fragment) = capture(&NAME_FRAGMENT, text) {
        found.insert(params::NAME_FRAGMENT, fragment);
    }
    if let Some(os) = capture(&RUNNING_OS, text).or_else(|| capture(&OS_IS, text)) {
        found.insert(params::OS, os);
    }
    if let Some(location) = capture(&LOCATION, text) {
        found.insert(params::LOCATION, location);
    }
    if found.is_empty() {
        return None;
    }
    co_extract(text, &mut found, false);
    Some(found)
}

fn extract_users(text: &str) -> Option<Parameters> {
    let mut found = Parameters::new();
    if has_token(text, &["admin", "admins", "administrator", "administrators"]) {
        found.insert(params::ROLE, "admin");
    } else if has_token(text, &["read-only", "readonly"]) {
        found.insert(params::ROLE, "readonly");
    }
    if let Some(department) = capture(&DEPARTMENT, text) {
        found.insert(params::DEPARTMENT, department);
    }
    Some(found)
}

fn extract_count(text: &str) -> Option<Parameters> {
    let mut found = Parameters::new();
    co_extract(text, &mut found, true);
    Some(found)
}

/// Add status and environment filters mentioned alongside the main subject.
fn co_extract(text: &str, found: &mut Parameters, allow_running: bool) {
    if let Some(status) = vocab::status_of(text, allow_running) {
        found.insert(params::STATUS, status);
    }
    if let Some(env) = vocab::environment_of(text) {
        found.insert(params::ENVIRONMENT, env);
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
