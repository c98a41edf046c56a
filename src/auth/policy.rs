/// Access level a route requires. There is deliberately nothing finer than
/// authenticated/unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
}

/// Route-to-policy table, evaluated centrally by the policy middleware.
/// Entries match the request path exactly; anything not listed requires
/// authentication.
const RULES: &[(&str, Access)] = &[
    ("/api/auth/login", Access::Public),
    ("/api/health", Access::Public),
];

pub fn access_for(path: &str) -> Access {
    RULES
        .iter()
        .find(|(pattern, _)| *pattern == path)
        .map_or(Access::Authenticated, |(_, access)| *access)
}
