//! Static classification of request paths into public and protected.
//!
//! Patterns follow the Ant style used for URL allow-lists: `/api/auth/**`
//! matches `/api/auth` and everything below it on a segment boundary, while a
//! pattern without the `/**` suffix matches one path exactly.

use lazy_static::lazy_static;

/// Paths reachable without authentication when no override is configured.
pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &[
    "/api/auth/**",
    "/swagger-ui.html",
    "/swagger-ui/**",
    "/v3/api-docs/**",
    "/swagger-resources/**",
    "/webjars/**",
    "/health",
];

lazy_static! {
    static ref DEFAULT_TABLE: RouteTable = RouteTable::new(DEFAULT_PUBLIC_ROUTES.iter().copied());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    Exact(String),
    /// Base path without trailing slash; empty for `/**`.
    Prefix(String),
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();
        match pattern.strip_suffix("/**") {
            Some(base) => RoutePattern::Prefix(base.trim_end_matches('/').to_string()),
            None => RoutePattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(exact) => path == exact,
            RoutePattern::Prefix(base) => match path.strip_prefix(base.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

/// Read-only allow-list consulted once per request.
#[derive(Debug, Clone)]
pub struct RouteTable {
    public: Vec<RoutePattern>,
}

impl RouteTable {
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            public: patterns
                .into_iter()
                .filter(|p| !p.trim().is_empty())
                .map(RoutePattern::parse)
                .collect(),
        }
    }

    pub fn classify(&self, path: &str) -> Access {
        if self.public.iter().any(|p| p.matches(path)) {
            Access::Public
        } else {
            Access::Protected
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.classify(path) == Access::Public
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}
