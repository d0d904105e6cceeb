// src/application/routes.rs
//
// Client-side routes: `/`, `/auth`, `/video/<id>`, `/profile`.
// Anything else is NotFound.

use reqwest::Url;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Catalog { search: Option<String> },
    Auth,
    Video { id: Uuid },
    Profile,
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let Ok(url) = Url::parse("http://localhost/").and_then(|base| base.join(path.trim()))
        else {
            return Route::NotFound;
        };

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [] => {
                let search = url
                    .query_pairs()
                    .find(|(key, _)| key == "search")
                    .map(|(_, value)| value.into_owned())
                    .filter(|value| !value.trim().is_empty());
                Route::Catalog { search }
            }
            ["auth"] => Route::Auth,
            ["profile"] => Route::Profile,
            ["video", id] => match Uuid::parse_str(id) {
                Ok(id) => Route::Video { id },
                Err(_) => Route::NotFound,
            },
            _ => Route::NotFound,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Route::Catalog { search: None } => "/".to_string(),
            Route::Catalog { search: Some(term) } => {
                match Url::parse_with_params("http://localhost/", &[("search", term)]) {
                    Ok(url) => format!("/?{}", url.query().unwrap_or_default()),
                    Err(_) => "/".to_string(),
                }
            }
            Route::Auth => "/auth".to_string(),
            Route::Video { id } => format!("/video/{}", id),
            Route::Profile => "/profile".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Pages that redirect to `/auth` when nobody is signed in
    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_routes() {
        assert_eq!(Route::parse("/"), Route::Catalog { search: None });
        assert_eq!(Route::parse(""), Route::Catalog { search: None });
        assert_eq!(
            Route::parse("/?search=big%20buck"),
            Route::Catalog {
                search: Some("big buck".to_string())
            }
        );
        assert_eq!(Route::parse("/?search="), Route::Catalog { search: None });
    }

    #[test]
    fn test_video_route() {
        let id = Uuid::new_v4();
        assert_eq!(Route::parse(&format!("/video/{}", id)), Route::Video { id });
        assert_eq!(Route::parse("/video/not-a-uuid"), Route::NotFound);
        assert_eq!(Route::parse("/video"), Route::NotFound);
    }

    #[test]
    fn test_other_routes() {
        assert_eq!(Route::parse("/auth"), Route::Auth);
        assert_eq!(Route::parse("/profile/"), Route::Profile);
        assert_eq!(Route::parse("/admin"), Route::NotFound);
    }

    #[test]
    fn test_render_parses_back() {
        let id = Uuid::new_v4();
        let routes = [
            Route::Catalog { search: None },
            Route::Catalog {
                search: Some("rust & tokio".to_string()),
            },
            Route::Auth,
            Route::Video { id },
            Route::Profile,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.render()), route);
        }
    }

    #[test]
    fn test_only_profile_requires_session() {
        assert!(Route::Profile.requires_session());
        assert!(!Route::Auth.requires_session());
        assert!(!Route::Catalog { search: None }.requires_session());
    }
}
