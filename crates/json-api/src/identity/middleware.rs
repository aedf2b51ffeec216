//! Identity middleware.

use salvo::prelude::*;
use storefront::customers::UserUuid;
use uuid::Uuid;

use crate::extensions::*;

use super::{USER_ROLE_HEADER, USER_UUID_HEADER};

/// Require `x-user-uuid` and make it available to handlers.
#[salvo::handler]
pub(crate) async fn require_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(user_uuid) = extract_user(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid x-user-uuid header"));
        ctrl.skip_rest();

        return;
    };

    depot.insert_user_uuid(user_uuid);

    ctrl.call_next(req, depot, res).await;
}

/// Require `x-user-role: admin`.
#[salvo::handler]
pub(crate) async fn require_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let is_admin = req
        .headers()
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|role| role.trim().eq_ignore_ascii_case("admin"));

    if !is_admin {
        res.render(StatusError::forbidden().brief("Admin role required"));
        ctrl.skip_rest();

        return;
    }

    ctrl.call_next(req, depot, res).await;
}

fn extract_user(req: &Request) -> Option<UserUuid> {
    let value = req.headers().get(USER_UUID_HEADER)?.to_str().ok()?;

    Uuid::parse_str(value.trim()).ok().map(UserUuid::from_uuid)
}
