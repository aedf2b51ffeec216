//! Route labels for spans and metrics.

use storefront::orders::OrderNumber;
use uuid::Uuid;

/// `path` with ids replaced by placeholders, so labels stay low-cardinality.
pub(super) fn route_for_path(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut route = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            route.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            route.push_str("{uuid}");
        } else if OrderNumber::parse(segment).is_ok() {
            route.push_str("{order}");
        } else {
            route.push_str(segment);
        }
    }

    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_and_order_numbers_become_placeholders() {
        assert_eq!(route_for_path("/"), "/");
        assert_eq!(route_for_path("/cart"), "/cart");
        assert_eq!(
            route_for_path("/cart/items/0190a1b2-c3d4-7e5f-8a6b-7c8d9e0f1a2b"),
            "/cart/items/{uuid}"
        );
        assert_eq!(
            route_for_path(
                "/orders/ORD-20260101-ABCDEF/items/0190a1b2-c3d4-7e5f-8a6b-7c8d9e0f1a2b/cancel"
            ),
            "/orders/{order}/items/{uuid}/cancel"
        );
    }
}
