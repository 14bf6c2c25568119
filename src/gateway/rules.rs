//! Listener rule evaluation for the public entry point.
//!
//! Rules are evaluated in priority order (lowest number first); the first
//! rule with a matching path pattern wins, and the default target catches
//! everything else. Patterns support `*` (any sequence, including empty)
//! and `?` (any single character).

use crate::topology::ListenerPlan;

struct CompiledRule {
    priority: u32,
    patterns: Vec<String>,
    target: String,
}

/// Immutable rule set compiled from a listener plan.
///
/// Created once at deployment time and never mutated afterwards; a redeploy
/// replaces the whole set.
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    default_target: String,
}

impl RuleSet {
    pub fn from_listener(plan: &ListenerPlan) -> Self {
        let mut rules: Vec<CompiledRule> = plan
            .rules
            .iter()
            .map(|rule| CompiledRule {
                priority: rule.priority,
                patterns: rule.path_patterns.clone(),
                target: rule.target.clone(),
            })
            .collect();
        rules.sort_by_key(|rule| rule.priority);

        Self {
            rules,
            default_target: plan.default_target.clone(),
        }
    }

    /// Returns the target group name for a request path.
    pub fn resolve(&self, path: &str) -> &str {
        for rule in &self.rules {
            if rule.patterns.iter().any(|p| pattern_matches(p, path)) {
                return &rule.target;
            }
        }
        &self.default_target
    }

    pub fn default_target(&self) -> &str {
        &self.default_target
    }
}

/// Matches a path against a pattern with `*` and `?` wildcards.
pub fn pattern_matches(pattern: &str, path: &str) -> bool {
    let pattern = pattern.as_bytes();
    let path = path.as_bytes();

    // Two-pointer scan with backtracking to the most recent `*`.
    let mut pi = 0;
    let mut si = 0;
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while si < path.len() {
        if pi < pattern.len() && (pattern[pi] == b'?' || pattern[pi] == path[si]) {
            pi += 1;
            si += 1;
        } else if pi < pattern.len() && pattern[pi] == b'*' {
            star = Some(pi);
            mark = si;
            pi += 1;
        } else if let Some(star_pos) = star {
            pi = star_pos + 1;
            mark += 1;
            si = mark;
        } else {
            return false;
        }
    }

    while pi < pattern.len() && pattern[pi] == b'*' {
        pi += 1;
    }
    pi == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::ListenerRulePlan;

    fn api_listener() -> ListenerPlan {
        ListenerPlan {
            port: 8080,
            rules: vec![ListenerRulePlan {
                priority: 10,
                path_patterns: vec!["/api*".to_string(), "/api/*".to_string()],
                target: "backend".to_string(),
            }],
            default_target: "frontend".to_string(),
        }
    }

    #[test]
    fn test_api_paths_resolve_to_backend() {
        let rules = RuleSet::from_listener(&api_listener());

        assert_eq!(rules.resolve("/api"), "backend");
        assert_eq!(rules.resolve("/api/"), "backend");
        assert_eq!(rules.resolve("/api/health"), "backend");
        assert_eq!(rules.resolve("/api/orders/42"), "backend");
        // "/api*" matches any continuation of the prefix
        assert_eq!(rules.resolve("/apikeys"), "backend");
    }

    #[test]
    fn test_other_paths_resolve_to_frontend() {
        let rules = RuleSet::from_listener(&api_listener());

        assert_eq!(rules.resolve("/"), "frontend");
        assert_eq!(rules.resolve("/about"), "frontend");
        assert_eq!(rules.resolve("/ap"), "frontend");
        assert_eq!(rules.resolve("/health"), "frontend");
    }

    #[test]
    fn test_lower_priority_number_wins() {
        let mut plan = api_listener();
        plan.rules.push(ListenerRulePlan {
            priority: 5,
            path_patterns: vec!["/api/admin*".to_string()],
            target: "admin".to_string(),
        });

        let rules = RuleSet::from_listener(&plan);
        assert_eq!(rules.resolve("/api/admin/users"), "admin");
        assert_eq!(rules.resolve("/api/orders"), "backend");
        assert_eq!(rules.default_target(), "frontend");
    }

    #[test]
    fn test_pattern_wildcards() {
        assert!(pattern_matches("/api*", "/api"));
        assert!(pattern_matches("/api*", "/apikeys"));
        assert!(pattern_matches("/api/*", "/api/"));
        assert!(pattern_matches("/api/*", "/api/health"));
        assert!(!pattern_matches("/api/*", "/api"));
        assert!(!pattern_matches("/api*", "/ap"));

        assert!(pattern_matches("/item?", "/item1"));
        assert!(!pattern_matches("/item?", "/item"));
        assert!(pattern_matches("/*/edit", "/products/edit"));
        assert!(!pattern_matches("/*/edit", "/products/42/view"));
        assert!(pattern_matches("*", "/anything/at/all"));
    }
}
