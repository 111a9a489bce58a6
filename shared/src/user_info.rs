use serde::{Serialize, Deserialize};

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_NAME_HEADER: &str = "X-User-Name";

/// Identity of the caller as asserted by the upstream identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub display_name: Option<String>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: None }
    }

    pub fn with_name(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: Some(display_name.into()) }
    }
}

// Backend-specific Rocket implementation
#[cfg(feature = "backend")]
mod backend_impl {
    use super::*;
    use rocket::http::Status;
    use rocket::request::{FromRequest, Outcome};
    use rocket::Request;

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for AuthUser {
        type Error = ();

        async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
            let headers = req.headers();
            let id = headers.get_one(USER_ID_HEADER)
                .map(str::trim)
                .filter(|id| !id.is_empty());

            match id {
                Some(id) => Outcome::Success(AuthUser {
                    id: id.to_string(),
                    display_name: headers.get_one(USER_NAME_HEADER).map(str::to_string),
                }),
                None => Outcome::Error((Status::Unauthorized, ())),
            }
        }
    }
}
