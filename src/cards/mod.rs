//! Card system: identifiers, definitions, and virtual cards.
//!
//! ## Key Types
//!
//! - `RealCardId` / `VirtualCardId` / `CardId`: physical and composite card ids
//! - `CardDefinition`: static printed card data
//! - `CardView`: the card as rules currently see it
//! - `VirtualCards`: room-scoped composite table with recursive resolution

pub mod definition;
pub mod id;
pub mod virtual_card;

pub use definition::{CardDefinition, CardType, CardView, EquipType, Suit, TargetMode};
pub use id::{CardId, RealCardId, VirtualCardId};
pub use virtual_card::{VirtualCard, VirtualCards};
