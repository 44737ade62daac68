//! Intent + parameters → inventory predicate.
//!
//! Every server intent is restricted to server records and `ListUsers` to
//! user records. An empty parameter set produces a list-all predicate only
//! for intents where listing everything is meaningful.

use sia_inventory::{Comparison, Constraint, Predicate, Resource, TextField};
use sia_protocol::{Intent, Parameters, RecordKind, params};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("intent {0} cannot be answered from the inventory with these parameters")]
    UnsupportedIntent(Intent),

    #[error("invalid value for {key}: {value}")]
    InvalidParameter { key: String, value: String },
}

/// Builds predicates from classified questions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterBuilder;

impl FilterBuilder {
    pub fn build(intent: Intent, p: &Parameters) -> Result<Predicate, FilterError> {
        let servers = Predicate::all().and(Constraint::Kind {
            kind: RecordKind::Server,
        });

        match intent {
            Intent::CountServers | Intent::ListByStatus | Intent::ListByEnvironment => {
                Ok(with_status_and_environment(servers, p))
            }
            Intent::ServerDetail => {
                let name = p
                    .get(params::NAME)
                    .ok_or(FilterError::UnsupportedIntent(intent))?;
                Ok(servers.and(Constraint::NameEquals {
                    value: name.to_string(),
                }))
            }
            Intent::SearchByAttribute => {
                let mut predicate = with_status_and_environment(servers, p);
                let mut keyed = false;

                for (key, fields) in [
                    (
                        params::NAME_FRAGMENT,
                        &[TextField::Name, TextField::IpAddress, TextField::Notes][..],
                    ),
                    (params::OS, &[TextField::Os][..]),
                    (params::LOCATION, &[TextField::Location][..]),
                    (params::OWNER, &[TextField::Owner][..]),
                ] {
                    if let Some(needle) = p.get(key) {
                        predicate = predicate.and(Constraint::Contains {
                            fields: fields.to_vec(),
                            needle: needle.to_string(),
                        });
                        keyed = true;
                    }
                }

                for key in params::THRESHOLDS {
                    if let Some(raw) = p.get(key) {
                        predicate = predicate.and(threshold(key, raw)?);
                        keyed = true;
                    }
                }

                if !keyed {
                    return Err(FilterError::UnsupportedIntent(intent));
                }
                Ok(predicate)
            }
            Intent::ListUsers => {
                let mut predicate = Predicate::all().and(Constraint::Kind {
                    kind: RecordKind::User,
                });
                if let Some(role) = p.get(params::ROLE) {
                    predicate = predicate.and(Constraint::Role {
                        value: role.to_string(),
                    });
                }
                if let Some(department) = p.get(params::DEPARTMENT) {
                    predicate = predicate.and(Constraint::Contains {
                        fields: vec![TextField::Department],
                        needle: department.to_string(),
                    });
                }
                Ok(predicate)
            }
            Intent::Unknown => Err(FilterError::UnsupportedIntent(intent)),
        }
    }
}

fn with_status_and_environment(mut predicate: Predicate, p: &Parameters) -> Predicate {
    if let Some(status) = p.get(params::STATUS) {
        predicate = predicate.and(Constraint::Status {
            value: status.to_string(),
        });
    }
    if let Some(env) = p.get(params::ENVIRONMENT) {
        predicate = predicate.and(Constraint::Environment {
            value: env.to_string(),
        });
    }
    predicate
}

/// Parse a `<resource>_<cmp>` key and its integer value.
fn threshold(key: &str, raw: &str) -> Result<Constraint, FilterError> {
    let invalid = || FilterError::InvalidParameter {
        key: key.to_string(),
        value: raw.to_string(),
    };

    let (resource, comparison) = key.split_once('_').ok_or_else(invalid)?;
    let resource = match resource {
        "ram" => Resource::Ram,
        "cpu" => Resource::Cpu,
        "disk" => Resource::Disk,
        _ => return Err(invalid()),
    };
    let comparison = match comparison {
        "gt" => Comparison::Gt,
        "gte" => Comparison::Gte,
        "lt" => Comparison::Lt,
        "lte" => Comparison::Lte,
        _ => return Err(invalid()),
    };
    let value = raw.trim().parse::<u32>().map_err(|_| invalid())?;

    Ok(Constraint::Threshold {
        resource,
        comparison,
        value,
    })
}
