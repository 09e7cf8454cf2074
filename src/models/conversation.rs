use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A buyer/seller thread anchored to a single listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub listing_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Whether `principal_id` is one of the two parties.
    pub fn has_participant(&self, principal_id: Uuid) -> bool {
        self.buyer_id == principal_id || self.seller_id == principal_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_check_covers_both_sides() {
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            buyer_id: buyer,
            seller_id: seller,
            listing_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        assert!(conversation.has_participant(buyer));
        assert!(conversation.has_participant(seller));
        assert!(!conversation.has_participant(Uuid::new_v4()));
    }
}
