//! Fixed service catalog offered in the `ChooseFlow` step.

use serde::Serialize;

/// One entry of the service catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceOption {
    pub key: &'static str,
    pub label: &'static str,
    pub price: &'static str,
}

pub const SERVICES: &[ServiceOption] = &[
    ServiceOption {
        key: "web",
        label: "Web Development",
        price: "₹10,000+",
    },
    ServiceOption {
        key: "branding",
        label: "Branding",
        price: "₹5,000+",
    },
    ServiceOption {
        key: "marketing",
        label: "Marketing",
        price: "₹7,500+",
    },
    ServiceOption {
        key: "consulting",
        label: "Consulting",
        price: "₹8,000+",
    },
];

/// Button labels for the two non-catalog flows.
pub const SUPPORT_LABEL: &str = "Support";
pub const ORDER_LABEL: &str = "Order Issue";

/// Look up a catalog entry by key.
pub fn find(key: &str) -> Option<&'static ServiceOption> {
    SERVICES.iter().find(|s| s.key == key)
}

/// Price list message, one "label: price" line per service.
pub fn price_list() -> String {
    SERVICES
        .iter()
        .map(|s| format!("{}: {}", s.label, s.price))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(find("web").unwrap().label, "Web Development");
        assert!(find("seo").is_none());
    }

    #[test]
    fn price_list_lists_every_service() {
        let list = price_list();
        assert_eq!(list.lines().count(), SERVICES.len());
        assert!(list.starts_with("Web Development: ₹10,000+"));
        assert!(list.contains("Consulting: ₹8,000+"));
    }
}
