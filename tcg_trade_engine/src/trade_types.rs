use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use tcg_common::{CardId, PlayerId, TradeId, UNKNOWN_SOURCE};
use thiserror::Error;

//--------------------------------------      TradeSide      ---------------------------------------------------------
/// Names one half of a trade. Side `One` is the player who made the first offer, and the card they put up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    One,
    Two,
}

impl TradeSide {
    pub fn other(&self) -> Self {
        match self {
            TradeSide::One => TradeSide::Two,
            TradeSide::Two => TradeSide::One,
        }
    }
}

impl Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::One => write!(f, "one"),
            TradeSide::Two => write!(f, "two"),
        }
    }
}

//--------------------------------------     TradeStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    /// One player has offered a card. The counter-card is not known yet.
    Offered,
    /// Both cards are known. Waiting for both to show up in escrow.
    Matched,
    /// Both cards were received, transfers have been issued and the trade is archived.
    Finalized,
}

impl Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeStatus::Offered => write!(f, "Offered"),
            TradeStatus::Matched => write!(f, "Matched"),
            TradeStatus::Finalized => write!(f, "Finalized"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid trade status: {0}")]
pub struct ConversionError(String);

impl FromStr for TradeStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Offered" => Ok(Self::Offered),
            "Matched" => Ok(Self::Matched),
            "Finalized" => Ok(Self::Finalized),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------    ClaimedSource    ---------------------------------------------------------
/// Who said they were handing a card over. Never verified; only reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimedSource {
    Player(PlayerId),
    Unknown,
}

impl Display for ClaimedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimedSource::Player(p) => write!(f, "{p}"),
            ClaimedSource::Unknown => write!(f, "{UNKNOWN_SOURCE}"),
        }
    }
}

impl From<Option<PlayerId>> for ClaimedSource {
    fn from(value: Option<PlayerId>) -> Self {
        value.map(ClaimedSource::Player).unwrap_or(ClaimedSource::Unknown)
    }
}

//--------------------------------------      TradeOffer     ---------------------------------------------------------
/// A one-sided proposal from `player_one` to trade `card_one` to `player_two`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    pub id: TradeId,
    pub player_one: PlayerId,
    pub card_one: CardId,
    pub player_two: PlayerId,
    pub player_one_confirmed: bool,
    pub player_two_confirmed: bool,
    pub card_one_received: bool,
    pub card_two_received: bool,
    pub created_at: DateTime<Utc>,
}

impl TradeOffer {
    pub fn new(id: TradeId, from: PlayerId, card: CardId, to: PlayerId) -> Self {
        Self {
            id,
            player_one: from,
            card_one: card,
            player_two: to,
            player_one_confirmed: false,
            player_two_confirmed: false,
            card_one_received: false,
            card_two_received: false,
            created_at: Utc::now(),
        }
    }

    /// True if this offer was made by `from` to `to`.
    pub fn is_between(&self, from: &PlayerId, to: &PlayerId) -> bool {
        &self.player_one == from && &self.player_two == to
    }

    /// Promote the offer to a two-sided trade now that the counter-card is known. The offer's id carries over.
    pub fn into_trade(self, card_two: CardId) -> Trade {
        Trade {
            id: self.id,
            player_one: self.player_one,
            card_one: self.card_one,
            player_two: self.player_two,
            card_two,
            player_one_confirmed: self.player_one_confirmed,
            player_two_confirmed: self.player_two_confirmed,
            card_one_received: self.card_one_received,
            card_two_received: self.card_two_received,
            created_at: self.created_at,
            matched_at: Utc::now(),
        }
    }
}

//--------------------------------------        Trade        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub player_one: PlayerId,
    pub card_one: CardId,
    pub player_two: PlayerId,
    pub card_two: CardId,
    /// Advisory. Confirmation does not gate finalization.
    pub player_one_confirmed: bool,
    /// Advisory. Confirmation does not gate finalization.
    pub player_two_confirmed: bool,
    pub card_one_received: bool,
    pub card_two_received: bool,
    pub created_at: DateTime<Utc>,
    pub matched_at: DateTime<Utc>,
}

impl Trade {
    pub fn player(&self, side: TradeSide) -> &PlayerId {
        match side {
            TradeSide::One => &self.player_one,
            TradeSide::Two => &self.player_two,
        }
    }

    pub fn card(&self, side: TradeSide) -> &CardId {
        match side {
            TradeSide::One => &self.card_one,
            TradeSide::Two => &self.card_two,
        }
    }

    /// The side `player` is on. Side one wins when a player is somehow on both sides.
    pub fn side_of_player(&self, player: &PlayerId) -> Option<TradeSide> {
        if &self.player_one == player {
            Some(TradeSide::One)
        } else if &self.player_two == player {
            Some(TradeSide::Two)
        } else {
            None
        }
    }

    pub fn side_of_card(&self, card: &CardId) -> Option<TradeSide> {
        if &self.card_one == card {
            Some(TradeSide::One)
        } else if &self.card_two == card {
            Some(TradeSide::Two)
        } else {
            None
        }
    }

    pub fn is_received(&self, side: TradeSide) -> bool {
        match side {
            TradeSide::One => self.card_one_received,
            TradeSide::Two => self.card_two_received,
        }
    }

    pub fn mark_received(&mut self, side: TradeSide) {
        match side {
            TradeSide::One => self.card_one_received = true,
            TradeSide::Two => self.card_two_received = true,
        }
    }

    pub fn is_confirmed(&self, side: TradeSide) -> bool {
        match side {
            TradeSide::One => self.player_one_confirmed,
            TradeSide::Two => self.player_two_confirmed,
        }
    }

    pub fn mark_confirmed(&mut self, side: TradeSide) {
        match side {
            TradeSide::One => self.player_one_confirmed = true,
            TradeSide::Two => self.player_two_confirmed = true,
        }
    }

    pub fn both_received(&self) -> bool {
        self.card_one_received && self.card_two_received
    }

    /// The card `recipient` walks away with: each player receives the card the other side put up.
    pub fn card_for(&self, recipient: TradeSide) -> &CardId {
        self.card(recipient.other())
    }
}

//--------------------------------------  CardCustodyRecord  ---------------------------------------------------------
/// Created the first time a custody snapshot reports a card the ledger has not seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCustodyRecord {
    pub card_id: CardId,
    pub claimed_source: ClaimedSource,
    pub time_registered: DateTime<Utc>,
    pub trade_id: Option<TradeId>,
}

//-------------------------------------- TradeHistoryRecord  ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeHistoryRecord {
    pub trade: Trade,
    pub finalized_at: DateTime<Utc>,
}

impl TradeHistoryRecord {
    pub fn new(trade: Trade) -> Self {
        Self { trade, finalized_at: Utc::now() }
    }

    pub fn id(&self) -> TradeId {
        self.trade.id
    }
}
