use serde::{Deserialize, Serialize};

/// P&L bucket of a financial event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Refund,
    AmazonFee,
    OtherFee,
    Payout,
    Unclassified,
}

/// Markers per category, checked in order; the first match wins.
const CATEGORY_MARKERS: &[(EventCategory, &[&str])] = &[
    (EventCategory::Refund, &["REFUND", "CHARGEBACK", "GUARANTEE"]),
    (
        EventCategory::AmazonFee,
        &[
            "SERVICEFEE",
            "VALUEADDEDSERVICECHARGE",
            "LOANSERVICING",
            "CAPACITYRESERVATIONBILLING",
            "DEBTRECOVERY",
            "RETROCHARGE",
        ],
    ),
    (
        EventCategory::OtherFee,
        &["PRODUCTADS", "ADVERTIS", "COUPON", "AFFORDABILITY", "SELLERDEAL"],
    ),
    (EventCategory::Payout, &["DISBURSEMENT", "PAYOUT"]),
];

/// Classifies an event by case-insensitive substring match on its type.
pub fn classify_event(event_type: &str) -> EventCategory {
    let upper = event_type.to_ascii_uppercase();
    CATEGORY_MARKERS
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| upper.contains(m)))
        .map(|(category, _)| *category)
        .unwrap_or(EventCategory::Unclassified)
}

impl EventCategory {
    pub fn is_refund(self) -> bool {
        self == EventCategory::Refund
    }
}
