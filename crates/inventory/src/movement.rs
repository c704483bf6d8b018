use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{DomainError, DomainResult, ItemId, MovementId};

const MAX_NOTES_CHARS: usize = 500;
const DEFAULT_AGENT: &str = "System";

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Restock,
    Sale,
    Adjustment,
}

impl MovementKind {
    /// Label written to history sheets and CSV exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Restock => "restock",
            MovementKind::Sale => "sale",
            MovementKind::Adjustment => "adjustment",
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Movement draft, tagged by transaction type so each kind can only carry
/// the quantity that makes sense for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MovementEntry {
    /// Add inventory. Quantity must be positive.
    Restock { quantity: i64 },
    /// Remove inventory through a sale. Sold quantity must be positive;
    /// selling past the remaining stock is allowed and drives it negative.
    Sale {
        #[serde(rename = "soldQuantity")]
        sold_quantity: i64,
    },
    /// Manual correction, positive or negative. Never zero.
    Adjustment { quantity: i64 },
}

impl MovementEntry {
    pub fn kind(&self) -> MovementKind {
        match self {
            MovementEntry::Restock { .. } => MovementKind::Restock,
            MovementEntry::Sale { .. } => MovementKind::Sale,
            MovementEntry::Adjustment { .. } => MovementKind::Adjustment,
        }
    }

    /// Canonical `(quantity, sold_quantity)` pair stored on the ledger:
    /// sales keep their count in the sold column and zero the other,
    /// restocks and adjustments do the opposite.
    pub fn quantities(&self) -> (i64, i64) {
        match *self {
            MovementEntry::Restock { quantity } => (quantity, 0),
            MovementEntry::Sale { sold_quantity } => (0, sold_quantity),
            MovementEntry::Adjustment { quantity } => (quantity, 0),
        }
    }

    fn validate(&self) -> DomainResult<()> {
        match *self {
            MovementEntry::Restock { quantity } if quantity <= 0 => Err(
                DomainError::validation("restock quantity must be positive"),
            ),
            MovementEntry::Sale { sold_quantity } if sold_quantity <= 0 => {
                Err(DomainError::validation("sold quantity must be positive"))
            }
            MovementEntry::Adjustment { quantity: 0 } => Err(DomainError::validation(
                "adjustment quantity cannot be zero",
            )),
            _ => Ok(()),
        }
    }
}

/// Draft for recording a movement against an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub item_id: ItemId,
    pub entry: MovementEntry,
    /// Defaults to the current time.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Defaults to `"System"` when blank.
    pub agent: Option<String>,
    pub notes: Option<String>,
}

impl NewMovement {
    pub fn new(item_id: ItemId, entry: MovementEntry) -> Self {
        Self {
            item_id,
            entry,
            occurred_at: None,
            agent: None,
            notes: None,
        }
    }
}

/// One immutable ledger entry. Movements are only ever created or deleted
/// together with their item; there is no edit path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    id: MovementId,
    item_id: ItemId,
    #[serde(rename = "type")]
    kind: MovementKind,
    quantity: i64,
    sold_quantity: i64,
    #[serde(rename = "date")]
    occurred_at: DateTime<Utc>,
    agent: String,
    notes: String,
}

impl StockMovement {
    /// Validate a draft and build the canonical ledger entry.
    pub fn record(draft: NewMovement, now: DateTime<Utc>) -> DomainResult<Self> {
        draft.entry.validate()?;

        let notes = draft.notes.unwrap_or_default().trim().to_string();
        if notes.chars().count() > MAX_NOTES_CHARS {
            return Err(DomainError::validation(format!(
                "notes cannot exceed {MAX_NOTES_CHARS} characters"
            )));
        }

        let agent = match draft.agent {
            Some(agent) if !agent.trim().is_empty() => agent.trim().to_string(),
            _ => DEFAULT_AGENT.to_string(),
        };

        let (quantity, sold_quantity) = draft.entry.quantities();

        Ok(Self {
            id: MovementId::new(),
            item_id: draft.item_id,
            kind: draft.entry.kind(),
            quantity,
            sold_quantity,
            occurred_at: draft.occurred_at.unwrap_or(now),
            agent,
            notes,
        })
    }

    pub fn id(&self) -> MovementId {
        self.id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn kind(&self) -> MovementKind {
        self.kind
    }

    /// Units added to total stock (zero for sales).
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Units sold (zero for restocks and adjustments).
    pub fn sold_quantity(&self) -> i64 {
        self.sold_quantity
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}
