// Role-based access control for the admin pages.

use tracing::debug;

use crate::session::Session;

/// Access level of super administrators.
pub const SUPER: &str = "super";
/// Access level of tournament administrators.
pub const ADMIN: &str = "admin";
/// Access level of team administrators.
pub const TEAM: &str = "team";

/// Path of the login page; unauthenticated users are sent here.
pub const LOGIN_PATH: &str = "/login";
/// Path of the home page; users lacking the required role are sent here.
pub const HOME_PATH: &str = "/";

/// A page and the roles allowed to open it. An empty role list means public.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub required_roles: &'static [&'static str],
}

impl Route {
    pub fn is_public(&self) -> bool {
        self.required_roles.is_empty()
    }

    /// Match a concrete path against this route's pattern. Segments starting
    /// with `:` match any non-empty segment.
    pub fn matches(&self, path: &str) -> bool {
        let pattern: Vec<&str> = self.path.split('/').filter(|s| !s.is_empty()).collect();
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        pattern.len() == actual.len()
            && pattern
                .iter()
                .zip(&actual)
                .all(|(p, a)| p.starts_with(':') || p == a)
    }
}

/// Every page of the application.
pub const ROUTES: &[Route] = &[
    Route { path: "/", required_roles: &[] },
    Route { path: "/games", required_roles: &[] },
    Route { path: "/contact", required_roles: &[] },
    Route { path: "/login", required_roles: &[] },
    Route { path: "/team/:team", required_roles: &[] },
    Route { path: "/super-admin", required_roles: &[SUPER] },
    Route { path: "/admin/accounts", required_roles: &[SUPER, ADMIN] },
    Route { path: "/admin", required_roles: &[ADMIN] },
    Route { path: "/admin/teams", required_roles: &[ADMIN, SUPER] },
    Route { path: "/admin/games", required_roles: &[ADMIN, SUPER] },
    Route { path: "/admin/sponsors", required_roles: &[ADMIN, SUPER] },
    Route { path: "/team-admin", required_roles: &[TEAM] },
];

/// Find the route a path belongs to.
pub fn find_route(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.matches(path))
}

/// True when `user_role` is one of `required_roles`, ignoring case.
pub fn authorize(user_role: &str, required_roles: &[&str]) -> bool {
    let role = user_role.to_lowercase();
    required_roles.iter().any(|r| r.to_lowercase() == role)
}

/// Outcome of a navigation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(&'static str),
}

/// Decide whether the session may open `path`.
pub fn guard(session: &Session, path: &str) -> Navigation {
    let Some(route) = find_route(path) else {
        return Navigation::Proceed;
    };
    if route.is_public() {
        return Navigation::Proceed;
    }

    let decision = match session.user() {
        None => Navigation::Redirect(LOGIN_PATH),
        Some(user) if authorize(user.effective_role(), route.required_roles) => {
            Navigation::Proceed
        }
        Some(_) => Navigation::Redirect(HOME_PATH),
    };

    debug!(
        path,
        logged_in = session.is_logged_in(),
        role = session.user().map(|u| u.effective_role()).unwrap_or(""),
        allowed = ?route.required_roles,
        ?decision,
        "route guard"
    );
    decision
}
