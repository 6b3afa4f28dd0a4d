//! Robots.txt compliance layer.
//!
//! A small hand-rolled line-oriented state machine: track the active
//! user-agent group, accumulate `Disallow`/`Allow`/`Crawl-delay` directives,
//! then expose `can_fetch`/`crawl_delay`.

use std::time::Duration;

/// One user-agent group's accumulated directives.
#[derive(Debug, Clone, Default)]
struct Group {
    agents: Vec<String>,
    disallow: Vec<String>,
    allow: Vec<String>,
    crawl_delay: Option<Duration>,
}

/// A parsed `robots.txt` policy.
///
/// `can_fetch` applies the longest-matching-prefix rule across `Disallow`
/// and `Allow` directives in the group matching the caller's user agent (or
/// the wildcard `*` group if no specific match exists).
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    groups: Vec<Group>,
}

impl RobotsPolicy {
    /// Parse `robots.txt` body text into a policy.
    ///
    /// Unparseable or malformed lines are skipped rather than erroring: per
    /// a parse failure should default-allow, not raise.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut current = Group::default();
        let mut in_group = false;

        for raw_line in body.lines() {
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if in_group && current.has_directives() {
                        groups.push(std::mem::take(&mut current));
                    }
                    current.agents.push(value.to_ascii_lowercase());
                    in_group = true;
                },
                "disallow" => {
                    if !value.is_empty() {
                        current.disallow.push(value.to_string());
                    } else {
                        // Empty Disallow means "allow everything" for this group.
                        current.allow.push(String::new());
                    }
                },
                "allow" => {
                    if !value.is_empty() {
                        current.allow.push(value.to_string());
                    }
                },
                "crawl-delay" => {
                    if let Ok(secs) = value.parse::<f64>() {
                        current.crawl_delay = Some(Duration::from_secs_f64(secs.max(0.0)));
                    }
                },
                _ => {},
            }
        }
        if current.has_directives() || !current.agents.is_empty() {
            groups.push(current);
        }
        Self { groups }
    }

    /// Whether `user_agent` may fetch `path` under this policy.
    ///
    /// No matching group → default-allow. Within the matching group, the
    /// longest matching `Disallow`/`Allow` prefix wins; ties favor `Allow`.
    #[must_use]
    pub fn can_fetch(&self, user_agent: &str, path: &str) -> bool {
        let Some(group) = self.matching_group(user_agent) else {
            return true;
        };

        let mut best_len = -1i64;
        let mut best_allow = true;

        for rule in &group.disallow {
            if path.starts_with(rule.as_str()) && rule.len() as i64 > best_len {
                best_len = rule.len() as i64;
                best_allow = false;
            }
        }
        for rule in &group.allow {
            if path.starts_with(rule.as_str()) && rule.len() as i64 >= best_len {
                best_len = rule.len() as i64;
                best_allow = true;
            }
        }
        best_allow
    }

    /// The `Crawl-delay` declared for `user_agent`'s matching group, if any.
    #[must_use]
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        self.matching_group(user_agent).and_then(|g| g.crawl_delay)
    }

    fn matching_group(&self, user_agent: &str) -> Option<&Group> {
        let ua_lower = user_agent.to_ascii_lowercase();
        self.groups
            .iter()
            .find(|g| g.agents.iter().any(|a| a != "*" && ua_lower.contains(a.as_str())))
            .or_else(|| self.groups.iter().find(|g| g.agents.iter().any(|a| a == "*")))
    }
}

impl Group {
    fn has_directives(&self) -> bool {
        !self.disallow.is_empty() || !self.allow.is_empty() || self.crawl_delay.is_some()
    }
}

fn strip_comment(line: &str) -> &str {
    line.find('#').map_or(line, |idx| &line[..idx])
}
