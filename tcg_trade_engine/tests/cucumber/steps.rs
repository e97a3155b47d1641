use chrono::Utc;
use cucumber::{gherkin::Step, then, when};
use tcg_trade_engine::{
    outbound::{GameInstruction, Outbox},
    protocol::TradeEvent,
    trade_types::{CardId, ClaimedSource, TradeId, TradeSide, TradeStatus},
    TradeEngineError,
};

use crate::cucumber::TradeWorld;

fn apply(world: &mut TradeWorld, event: TradeEvent) {
    let system = world.system_mut();
    match system.api.process_event(event) {
        Ok(outbox) => {
            system.last_outbox = outbox;
            system.last_error = None;
        },
        Err(e) => {
            system.last_outbox = Outbox::default();
            system.last_error = Some(e);
        },
    }
}

fn card_list(cards: &str) -> Vec<CardId> {
    cards.split_whitespace().map(CardId::from).collect()
}

#[when(expr = "'{word}' offers card {word} to '{word}'")]
async fn offer_card(world: &mut TradeWorld, from: String, card: String, target: String) {
    apply(world, TradeEvent::Offer { from: from.into(), target: target.into(), card: card.into() });
}

#[when(expr = "'{word}' confirms trade {int}")]
async fn confirm_trade(world: &mut TradeWorld, player: String, trade_id: u64) {
    apply(world, TradeEvent::Confirm { player: player.into(), trade_id: trade_id.into() });
}

#[when(expr = "the escrow account holds {string}")]
async fn custody_snapshot(world: &mut TradeWorld, cards: String) {
    apply(world, TradeEvent::CustodySnapshot { cards: card_list(&cards), observed_at: Utc::now() });
}

#[when("the escrow account is empty")]
async fn empty_snapshot(world: &mut TradeWorld) {
    apply(world, TradeEvent::CustodySnapshot { cards: vec![], observed_at: Utc::now() });
}

#[when(expr = "the game sends the frame {string}")]
async fn game_frame(world: &mut TradeWorld, line: String) {
    let config = world.api().config().clone();
    let plugin = config.strict_plugin.then_some(config.plugin_name.as_str());
    match TradeEvent::from_frame(&line, plugin) {
        Ok(Some(event)) => apply(world, event),
        Ok(None) => {
            let system = world.system_mut();
            system.last_outbox = Outbox::default();
            system.last_error = None;
        },
        Err(e) => {
            let system = world.system_mut();
            system.last_outbox = Outbox::default();
            system.last_error = Some(e);
        },
    }
}

#[then(expr = "trade {int} is {word}")]
async fn check_status(world: &mut TradeWorld, trade_id: u64, status: String) {
    let expected = status.parse::<TradeStatus>().expect("Not a valid trade status");
    assert_eq!(world.api().status_of(TradeId::new(trade_id)), Some(expected), "Trade {trade_id} status");
}

#[then(expr = "trade {int} does not exist")]
async fn check_no_trade(world: &mut TradeWorld, trade_id: u64) {
    assert_eq!(world.api().status_of(TradeId::new(trade_id)), None);
}

#[then(expr = "there are {int} open offers")]
async fn check_offer_count(world: &mut TradeWorld, count: usize) {
    assert_eq!(world.api().open_offers().count(), count);
}

#[then(expr = "there are {int} active trades")]
async fn check_trade_count(world: &mut TradeWorld, count: usize) {
    assert_eq!(world.api().active_trades().count(), count);
}

#[then(expr = "there are {int} completed trades")]
async fn check_history_count(world: &mut TradeWorld, count: usize) {
    assert_eq!(world.api().history().count(), count);
}

#[then(expr = "trade {int} swaps {word} from '{word}' for {word} from '{word}'")]
async fn check_trade_terms(
    world: &mut TradeWorld,
    trade_id: u64,
    card_one: String,
    player_one: String,
    card_two: String,
    player_two: String,
) {
    let trade = world.api().trade(TradeId::new(trade_id)).expect("Trade is not active");
    assert_eq!(trade.card_one.as_str(), card_one);
    assert_eq!(trade.player_one.as_str(), player_one);
    assert_eq!(trade.card_two.as_str(), card_two);
    assert_eq!(trade.player_two.as_str(), player_two);
}

#[then(expr = "trade {int} has received card {word}")]
async fn check_received(world: &mut TradeWorld, trade_id: u64, card: String) {
    let trade = world.api().trade(TradeId::new(trade_id)).expect("Trade is not active");
    let side = trade.side_of_card(&card.as_str().into()).expect("Card is not part of the trade");
    assert!(trade.is_received(side), "Card {card} has not been received");
}

#[then(expr = "trade {int} has not received card {word}")]
async fn check_not_received(world: &mut TradeWorld, trade_id: u64, card: String) {
    let trade = world.api().trade(TradeId::new(trade_id)).expect("Trade is not active");
    let side = trade.side_of_card(&card.as_str().into()).expect("Card is not part of the trade");
    assert!(!trade.is_received(side), "Card {card} has already been received");
}

#[then(expr = "trade {int} is confirmed by '{word}'")]
async fn check_confirmed(world: &mut TradeWorld, trade_id: u64, player: String) {
    let trade = world.api().trade(TradeId::new(trade_id)).expect("Trade is not active");
    let side = trade.side_of_player(&player.as_str().into()).expect("Player is not part of the trade");
    assert!(trade.is_confirmed(side));
}

#[then(expr = "trade {int} has no confirmations")]
async fn check_unconfirmed(world: &mut TradeWorld, trade_id: u64) {
    let trade = world.api().trade(TradeId::new(trade_id)).expect("Trade is not active");
    assert!(!trade.is_confirmed(TradeSide::One) && !trade.is_confirmed(TradeSide::Two));
}

#[then(expr = "card {word} is in custody from '{word}'")]
async fn check_custody(world: &mut TradeWorld, card: String, player: String) {
    let record = world.api().ledger().record_for(&card.as_str().into()).expect("Card is not in custody");
    assert_eq!(record.claimed_source, ClaimedSource::Player(player.into()));
}

#[then(expr = "card {word} is in custody from an unknown source")]
async fn check_custody_unknown(world: &mut TradeWorld, card: String) {
    let record = world.api().ledger().record_for(&card.as_str().into()).expect("Card is not in custody");
    assert_eq!(record.claimed_source, ClaimedSource::Unknown);
    assert_eq!(record.claimed_source.to_string(), "unknown_source");
}

#[then(expr = "card {word} is not in custody")]
async fn check_not_in_custody(world: &mut TradeWorld, card: String) {
    assert!(!world.api().ledger().is_registered(&card.as_str().into()));
}

#[then(expr = "the game is told to give card {word} to '{word}'")]
async fn check_give_card(world: &mut TradeWorld, card: String, recipient: String) {
    let expected = GameInstruction::GiveCard { recipient: recipient.into(), card: card.into() };
    let outbox = &world.system().last_outbox;
    assert!(outbox.game_instructions().any(|i| *i == expected), "Missing {expected:?} in {outbox:?}");
}

#[then("the last frames sent were:")]
async fn check_frames(world: &mut TradeWorld, step: &Step) {
    let expected = step
        .docstring
        .as_ref()
        .expect("Expected frames as a doc string")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect::<Vec<_>>();
    assert_eq!(world.last_frames(), expected);
}

#[then("nothing was sent")]
async fn check_nothing_sent(world: &mut TradeWorld) {
    assert!(world.system().last_outbox.is_empty(), "Unexpected effects: {:?}", world.system().last_outbox);
}

#[then("the last event was accepted")]
async fn check_accepted(world: &mut TradeWorld) {
    assert_eq!(world.system().last_error, None);
}

#[then(expr = "the last event was rejected because {string}")]
async fn check_rejected(world: &mut TradeWorld, reason: String) {
    let err = world.system().last_error.as_ref().expect("The last event was accepted");
    let matches = match reason.as_str() {
        "the card is committed" => matches!(err, TradeEngineError::CardAlreadyCommitted { .. }),
        "the trade is unknown" => matches!(err, TradeEngineError::UnknownTrade(_)),
        "the player is not a party" => matches!(err, TradeEngineError::UnauthorizedConfirm { .. }),
        "the command is malformed" => matches!(err, TradeEngineError::ProtocolParse(_)),
        "the command is unknown" => matches!(err, TradeEngineError::UnknownCommand(_)),
        other => panic!("Unknown rejection reason: {other}"),
    };
    assert!(matches, "Unexpected error: {err}");
}
