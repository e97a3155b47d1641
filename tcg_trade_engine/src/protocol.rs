//! Wire format for the game websocket.
//!
//! Inbound, the engine cares about two frame types:
//!
//! * `CUSTOM=<player>~<callback_id>:<plugin>:<command>:<payload>` carries player commands. The trade commands are
//!   `offer` (payload `<target_player>;<card_id>`) and `confirm` (payload `<trade_id>`).
//! * `REFRESH_TCG=<card_id>~<meta>~<meta>~<card_id>~...` lists every card currently in escrow as repeating triples.
//!   Only the first field of each triple is used.
//!
//! Outbound, player messages are rendered as `CUSTOM=<player>~<plugin>:<command>:<payload>` and transfer instructions
//! as `GIVE_TCG_CARD=<recipient>~<card_id>`.
use chrono::{DateTime, Utc};
use log::*;
use tcg_common::IdParseError;
use thiserror::Error;

use crate::{
    errors::TradeEngineError,
    outbound::{Effect, GameInstruction, PlayerMessage},
    trade_types::{CardId, PlayerId, TradeId},
};

pub const CUSTOM_FRAME: &str = "CUSTOM";
pub const CUSTODY_FRAME: &str = "REFRESH_TCG";
pub const GIVE_CARD_FRAME: &str = "GIVE_TCG_CARD";
pub const PLAYER_OFFLINE: &str = "PLAYER_OFFLINE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Custom message has no '~' after the player name: {0}")]
    MissingPlayer(String),
    #[error("Offer payload '{0}' is not of the form <target_player>;<card_id>")]
    MalformedOffer(String),
    #[error("Invalid trade id in confirm command. {0}")]
    InvalidTradeId(#[from] IdParseError),
}

//--------------------------------------      GameFrame      ---------------------------------------------------------
/// One raw websocket frame: `<TYPE>=<payload>`. Frames without a `=` have an empty payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameFrame<'a> {
    pub kind: &'a str,
    pub payload: &'a str,
}

impl<'a> GameFrame<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line.split_once('=') {
            Some((kind, payload)) => Self { kind, payload },
            None => Self { kind: line, payload: "" },
        }
    }
}

//--------------------------------------    CustomMessage    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomBody {
    /// The addressed player is not online.
    PlayerOffline,
    Command { callback_id: String, plugin: String, command: String, payload: String },
    /// Anything that is not `callback:plugin:command:payload` shaped.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomMessage {
    pub player: PlayerId,
    pub body: CustomBody,
}

impl CustomMessage {
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let (player, data) = raw.split_once('~').ok_or_else(|| ProtocolError::MissingPlayer(raw.to_string()))?;
        let player = PlayerId::from(player);
        if data == PLAYER_OFFLINE {
            return Ok(Self { player, body: CustomBody::PlayerOffline });
        }
        let fields = data.splitn(4, ':').collect::<Vec<_>>();
        let body = match fields.as_slice() {
            [callback_id, plugin, command, payload] => CustomBody::Command {
                callback_id: callback_id.to_string(),
                plugin: plugin.to_string(),
                command: command.to_string(),
                payload: payload.to_string(),
            },
            _ => CustomBody::Raw(data.to_string()),
        };
        Ok(Self { player, body })
    }
}

//--------------------------------------    TradeCommand     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeCommand {
    Offer { target: PlayerId, card: CardId },
    Confirm { trade_id: TradeId },
}

impl TradeCommand {
    pub fn parse(command: &str, payload: &str) -> Result<Self, TradeEngineError> {
        match command {
            "offer" => {
                let (target, card) = payload
                    .split_once(';')
                    .filter(|(t, c)| !t.is_empty() && !c.is_empty())
                    .ok_or_else(|| ProtocolError::MalformedOffer(payload.to_string()))?;
                Ok(Self::Offer { target: target.into(), card: card.into() })
            },
            "confirm" => {
                let trade_id = payload.parse::<TradeId>().map_err(ProtocolError::from)?;
                Ok(Self::Confirm { trade_id })
            },
            other => Err(TradeEngineError::UnknownCommand(other.to_string())),
        }
    }
}

//--------------------------------------     TradeEvent      ---------------------------------------------------------
/// Everything the engine reacts to, already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeEvent {
    Offer { from: PlayerId, target: PlayerId, card: CardId },
    Confirm { player: PlayerId, trade_id: TradeId },
    CustodySnapshot { cards: Vec<CardId>, observed_at: DateTime<Utc> },
}

impl TradeEvent {
    pub fn from_command(player: PlayerId, command: TradeCommand) -> Self {
        match command {
            TradeCommand::Offer { target, card } => Self::Offer { from: player, target, card },
            TradeCommand::Confirm { trade_id } => Self::Confirm { player, trade_id },
        }
    }

    /// Decode a websocket frame. Frames that are not for the trade engine yield `Ok(None)`.
    ///
    /// When `plugin` is given, custom commands addressed to any other plugin are ignored.
    pub fn from_frame(line: &str, plugin: Option<&str>) -> Result<Option<Self>, TradeEngineError> {
        let frame = GameFrame::parse(line);
        match frame.kind {
            CUSTOM_FRAME => {
                let msg = CustomMessage::parse(frame.payload)?;
                let CustomBody::Command { plugin: target_plugin, command, payload, .. } = msg.body else {
                    trace!("📡️ Custom message from {} is not a command", msg.player);
                    return Ok(None);
                };
                if plugin.is_some_and(|p| p != target_plugin) {
                    trace!("📡️ Ignoring '{command}' for plugin {target_plugin}");
                    return Ok(None);
                }
                let command = TradeCommand::parse(&command, &payload)?;
                Ok(Some(Self::from_command(msg.player, command)))
            },
            CUSTODY_FRAME => {
                let cards = parse_custody_listing(frame.payload);
                Ok(Some(Self::CustodySnapshot { cards, observed_at: Utc::now() }))
            },
            other => {
                trace!("📡️ Ignoring {other} frame");
                Ok(None)
            },
        }
    }
}

/// Pull the card ids out of a custody listing: the first field of every `~`-separated triple. A listing with fewer
/// than three fields holds no cards.
pub fn parse_custody_listing(payload: &str) -> Vec<CardId> {
    let fields = payload.split('~').collect::<Vec<_>>();
    if fields.len() < 3 {
        return Vec::new();
    }
    fields.into_iter().step_by(3).map(CardId::from).collect()
}

//--------------------------------------      Rendering      ---------------------------------------------------------
impl PlayerMessage {
    pub fn to_frame(&self) -> String {
        format!("{CUSTOM_FRAME}={}~{}:{}:{}", self.player, self.plugin, self.command, self.payload)
    }
}

impl GameInstruction {
    pub fn to_frame(&self) -> String {
        match self {
            GameInstruction::GiveCard { recipient, card } => format!("{GIVE_CARD_FRAME}={recipient}~{card}"),
        }
    }
}

impl Effect {
    /// The websocket frame for effects that go over the wire. Lifecycle notifications have none.
    pub fn to_frame(&self) -> Option<String> {
        match self {
            Effect::Player(msg) => Some(msg.to_frame()),
            Effect::Game(instruction) => Some(instruction.to_frame()),
            Effect::TradeProposed(_) | Effect::TradeCompleted(_) => None,
        }
    }
}
