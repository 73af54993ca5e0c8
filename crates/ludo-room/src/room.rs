//! Room actor: an isolated Tokio task that owns one game session.
//!
//! The actor is the only writer of its [`GameState`]. Two things can
//! change it: commands arriving on the bounded channel behind
//! [`RoomHandle`], and the room's single [`TurnTimer`] alarm (a human turn
//! deadline, or a bot's think/move delay). Both are served from one
//! `select!` loop, so steps never interleave.
//!
//! A bot turn spans two alarms (roll, then move after a pause). While it
//! is under way `turn_in_progress` is set and external roll/move intents
//! are rejected with `Busy` instead of being queued.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use ludo_bot::BotAction;
use ludo_engine::turn;
use ludo_engine::{
    Color, Dice, GameState, MoveOutcome, PawnId, Phase, Player, PlayerId, RandomSource, RollOutcome,
    RoomId, RuleError, SeededSource, ThreadSource, execute_move, valid_moves,
};
use ludo_protocol::{
    ClientIntent, Codec, ConnectionId, ErrorCode, KickReason, Recipient, ServerEvent, SkipReason,
    decode_intent,
};
use ludo_timer::{TimerConfig, TurnTimer};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::error::Rejection;
use crate::{AfkPolicy, RoomConfig, RoomError};

/// Channel sender for delivering events to one connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Start delivering events to a connection.
    Attach {
        connection: ConnectionId,
        sender: EventSender,
    },

    /// A validated intent from a connection.
    Intent {
        connection: ConnectionId,
        intent: ClientIntent,
    },

    /// The connection went away.
    Detach { connection: ConnectionId },

    Snapshot {
        reply: oneshot::Sender<GameState>,
    },

    Shutdown,
}

/// What the room's alarm is armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlarmKind {
    TurnTimeout(Color),
    BotRoll(Color),
    BotMove(Color),
}

// ---------------------------------------------------------------------------
// RoomHandle
// ---------------------------------------------------------------------------

/// Handle to a running room actor.
///
/// Cheap to clone: it is an `mpsc::Sender` plus the room id.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Registers a connection. It immediately receives the current
    /// snapshot and every broadcast after that.
    pub async fn attach(&self, connection: ConnectionId, sender: EventSender) -> Result<(), RoomError> {
        self.send(RoomCommand::Attach { connection, sender }).await
    }

    pub async fn detach(&self, connection: ConnectionId) -> Result<(), RoomError> {
        self.send(RoomCommand::Detach { connection }).await
    }

    /// Validates `intent` and queues it. Invalid intents never reach the
    /// actor.
    pub async fn send_intent(&self, connection: ConnectionId, intent: ClientIntent) -> Result<(), RoomError> {
        intent.validate()?;
        self.send(RoomCommand::Intent { connection, intent }).await
    }

    /// Decodes, validates and queues a raw payload from a transport.
    ///
    /// # Errors
    /// [`RoomError::Protocol`] for malformed payloads. The room state is
    /// untouched.
    pub async fn submit_raw<C: Codec>(
        &self,
        codec: &C,
        connection: ConnectionId,
        data: &[u8],
    ) -> Result<(), RoomError> {
        let intent = decode_intent(codec, data)?;
        self.send(RoomCommand::Intent { connection, intent }).await
    }

    /// The current snapshot. Also a barrier: every command sent before it
    /// has been processed when it returns.
    pub async fn snapshot(&self) -> Result<GameState, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

// ---------------------------------------------------------------------------
// RoomActor
// ---------------------------------------------------------------------------

struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    state: GameState,
    dice: Dice<Box<dyn RandomSource>>,
    /// Separate stream for the random bot strategies, so bot choices never
    /// shift the dice sequence.
    bot_rng: Box<dyn RandomSource>,
    receiver: mpsc::Receiver<RoomCommand>,
    connections: HashMap<ConnectionId, EventSender>,
    /// Connection → seat binding. Observers have no entry.
    seats: HashMap<ConnectionId, PlayerId>,
    host: Option<PlayerId>,
    /// Consecutive turn timeouts per human.
    timeouts: HashMap<PlayerId, u32>,
    /// Humans whose seat a bot took over; they may reclaim it.
    taken_over: HashSet<PlayerId>,
    timer: TurnTimer<AlarmKind>,
    turn_in_progress: bool,
    finished: bool,
    /// Zero point of the room clock used for debounce and deadlines.
    epoch: Instant,
}

impl RoomActor {
    /// Runs the actor loop until shutdown or until every handle is gone.
    async fn run(mut self) {
        info!(room_id = %self.room_id, "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                alarm = self.timer.expired() => self.handle_alarm(alarm.kind),
            }
        }

        self.timer.cancel();
        info!(room_id = %self.room_id, "room actor stopped");
    }

    /// Returns `false` when the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Attach { connection, sender } => {
                debug!(room_id = %self.room_id, %connection, "connection attached");
                self.connections.insert(connection, sender);
                self.dispatch(
                    Recipient::Connection(connection),
                    ServerEvent::State {
                        state: self.state.clone(),
                    },
                );
            }
            RoomCommand::Intent { connection, intent } => self.handle_intent(connection, intent),
            RoomCommand::Detach { connection } => self.handle_detach(connection),
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.state.clone());
            }
            RoomCommand::Shutdown => {
                info!(room_id = %self.room_id, "room shutting down");
                return false;
            }
        }
        true
    }

    // -- Intents ------------------------------------------------------------

    fn handle_intent(&mut self, connection: ConnectionId, intent: ClientIntent) {
        let kind = intent.kind();
        trace!(room_id = %self.room_id, %connection, kind, "intent received");

        let result = match intent {
            ClientIntent::Join {
                name,
                create,
                player_id,
                player_count,
                bot_count,
            } => self.handle_join(connection, &name, create, player_id, player_count, bot_count),
            ClientIntent::Roll => self.handle_roll(connection),
            ClientIntent::Move { pawn_id } => self.handle_move(connection, pawn_id),
            ClientIntent::Start => self.handle_start(connection),
            ClientIntent::AddBot => self.handle_add_bot(connection),
        };

        if let Err(rejection) = result {
            debug!(
                room_id = %self.room_id,
                %connection,
                kind,
                code = ?rejection.code,
                reason = %rejection.message,
                "intent rejected"
            );
            self.dispatch(
                Recipient::Connection(connection),
                ServerEvent::error(rejection.code, rejection.message),
            );
        }
    }

    fn handle_join(
        &mut self,
        connection: ConnectionId,
        name: &str,
        create: bool,
        player_id: Option<PlayerId>,
        player_count: Option<u8>,
        bot_count: Option<u8>,
    ) -> Result<(), Rejection> {
        if !self.connections.contains_key(&connection) {
            return Err(Rejection::new(ErrorCode::NotJoined, "connection is not attached"));
        }
        if let Some(seated) = self.seats.get(&connection) {
            return Err(RuleError::AlreadyJoined(*seated).into());
        }
        if let Some(id) = player_id.filter(|id| self.state.player(*id).is_some()) {
            return self.reconnect(connection, id);
        }

        let creating = self.state.players.is_empty() && self.host.is_none();
        if creating && !create {
            return Err(Rejection::new(
                ErrorCode::RoomNotFound,
                format!("room {} has not been created", self.room_id),
            ));
        }
        if creating {
            self.state.max_players = player_count.unwrap_or(self.config.max_players);
        }

        let id = player_id.unwrap_or_else(PlayerId::random);
        let (next, color) = turn::add_player(&self.state, id, name.trim(), false)?;
        self.state = next;
        self.seats.insert(connection, id);
        if self.host.is_none() {
            self.host = Some(id);
        }
        info!(room_id = %self.room_id, player_id = %id, %color, "player joined");

        let mut joined = vec![id];
        if creating {
            for _ in 0..bot_count.unwrap_or(0) {
                match self.seat_bot() {
                    Ok(bot) => joined.push(bot),
                    Err(err) => {
                        debug!(room_id = %self.room_id, %err, "no seat left for requested bot");
                        break;
                    }
                }
            }
            info!(
                room_id = %self.room_id,
                host = %id,
                max_players = self.state.max_players,
                bots = joined.len() - 1,
                "room created"
            );
        }

        self.dispatch(Recipient::Connection(connection), self.room_info(id, color));
        for player_id in joined {
            self.announce_player(player_id);
        }
        self.broadcast_state();
        Ok(())
    }

    /// Rebinds a known player to a new connection.
    ///
    /// Only a seat nobody speaks for can be claimed: its owner disconnected,
    /// or a bot took it over. Player ids are public, so a live seat stays
    /// with its connection.
    fn reconnect(&mut self, connection: ConnectionId, id: PlayerId) -> Result<(), Rejection> {
        let vacant = self.taken_over.contains(&id)
            || self.state.player(id).is_some_and(|p| !p.active);
        if !vacant {
            return Err(RuleError::AlreadyJoined(id).into());
        }
        self.seats.retain(|_, seated| *seated != id);

        let mut next = turn::rejoin(&self.state, id)?;
        let reclaimed = self.taken_over.remove(&id);
        if reclaimed {
            next = turn::reclaim_seat(&next, id)?;
            info!(room_id = %self.room_id, player_id = %id, "seat reclaimed from bot");
        }
        self.state = next;
        self.seats.insert(connection, id);
        self.timeouts.remove(&id);

        let color = self
            .state
            .player(id)
            .map(|p| p.color)
            .ok_or(RuleError::UnknownPlayer(id))?;
        info!(room_id = %self.room_id, player_id = %id, %connection, "player reconnected");

        self.dispatch(Recipient::Connection(connection), self.room_info(id, color));
        self.broadcast_state();

        let on_turn = self.state.current_player().is_some_and(|p| p.id == id);
        if on_turn && (reclaimed || !self.turn_in_progress) {
            // A bot step pending for this seat is dropped; the human finishes
            // the turn.
            self.turn_in_progress = false;
            self.schedule_turn();
        }
        Ok(())
    }

    fn handle_start(&mut self, connection: ConnectionId) -> Result<(), Rejection> {
        let player_id = self.seated(connection)?;
        self.ensure_host(player_id)?;
        self.state = turn::start_game(&self.state, self.config.min_players)?;
        info!(
            room_id = %self.room_id,
            players = self.state.players.len(),
            "game started"
        );
        self.broadcast_state();
        self.schedule_turn();
        Ok(())
    }

    fn handle_add_bot(&mut self, connection: ConnectionId) -> Result<(), Rejection> {
        let player_id = self.seated(connection)?;
        self.ensure_host(player_id)?;
        let bot = self.seat_bot()?;
        self.announce_player(bot);
        self.broadcast_state();
        Ok(())
    }

    fn handle_roll(&mut self, connection: ConnectionId) -> Result<(), Rejection> {
        let player_id = self.seated(connection)?;
        self.ensure_idle()?;
        let now = self.now_ms();
        let outcome = self.dice.handle_roll_request(&self.state, player_id, now)?;
        self.timeouts.remove(&player_id);
        self.apply_roll(outcome);
        self.schedule_turn();
        Ok(())
    }

    fn handle_move(&mut self, connection: ConnectionId, pawn_id: PawnId) -> Result<(), Rejection> {
        let player_id = self.seated(connection)?;
        self.ensure_idle()?;
        if !self.state.phase.is_playing() {
            return Err(RuleError::WrongPhase {
                phase: self.state.phase,
                dice: self.state.dice_value,
            }
            .into());
        }
        if self.state.current_player().map(|p| p.id) != Some(player_id) {
            return Err(RuleError::NotYourTurn(player_id).into());
        }
        let moves = valid_moves(&self.state);
        let outcome = execute_move(&self.state, pawn_id, &moves)?;
        self.timeouts.remove(&player_id);
        self.apply_move(outcome);
        self.schedule_turn();
        Ok(())
    }

    fn handle_detach(&mut self, connection: ConnectionId) {
        self.connections.remove(&connection);
        let Some(player_id) = self.seats.remove(&connection) else {
            debug!(room_id = %self.room_id, %connection, "observer detached");
            return;
        };

        match self.state.phase {
            Phase::Waiting => {
                if let Ok(next) = turn::remove_player(&self.state, player_id) {
                    self.state = next;
                }
                if self.host == Some(player_id) {
                    self.host = self.first_human();
                }
                info!(room_id = %self.room_id, %player_id, "player left before start");
                self.broadcast_state();
            }
            Phase::Finished => {
                if let Ok(next) = turn::set_active(&self.state, player_id, false) {
                    self.state = next;
                    self.broadcast_state();
                }
            }
            Phase::Rolling | Phase::Moving => {
                let Ok(next) = turn::set_active(&self.state, player_id, false) else {
                    return;
                };
                self.state = next;
                info!(room_id = %self.room_id, %player_id, "player disconnected");

                let on_turn = self
                    .state
                    .current_player()
                    .filter(|p| p.id == player_id && !p.is_bot)
                    .map(|p| p.color);
                match on_turn {
                    Some(color) if !self.turn_in_progress => {
                        self.skip(color, SkipReason::Disconnected);
                        self.schedule_turn();
                    }
                    _ => self.broadcast_state(),
                }
            }
        }
    }

    // -- Alarms -------------------------------------------------------------

    fn handle_alarm(&mut self, kind: AlarmKind) {
        trace!(room_id = %self.room_id, ?kind, "alarm fired");
        match kind {
            AlarmKind::TurnTimeout(color) => self.on_turn_timeout(color),
            AlarmKind::BotRoll(color) => self.on_bot_roll(color),
            AlarmKind::BotMove(color) => self.on_bot_move(color),
        }
    }

    fn on_turn_timeout(&mut self, color: Color) {
        if self.turn_in_progress || self.state.current_turn != Some(color) {
            debug!(room_id = %self.room_id, %color, "stale turn alarm ignored");
            return;
        }
        let Some(player) = self.state.player_by_color(color).cloned() else {
            self.schedule_turn();
            return;
        };

        let strikes = {
            let count = self.timeouts.entry(player.id).or_insert(0);
            *count += 1;
            *count
        };
        warn!(
            room_id = %self.room_id,
            player_id = %player.id,
            %color,
            strikes,
            threshold = self.config.afk_threshold,
            "turn timed out"
        );

        if strikes < self.config.afk_threshold {
            self.skip(color, SkipReason::Timeout);
        } else {
            self.timeouts.remove(&player.id);
            match self.config.afk_policy {
                AfkPolicy::Remove => self.remove_inactive(&player),
                AfkPolicy::BotTakeover => self.take_over(&player),
            }
        }
        self.schedule_turn();
    }

    fn on_bot_roll(&mut self, color: Color) {
        if self.turn_in_progress
            || self.state.current_turn != Some(color)
            || self.state.phase != Phase::Rolling
        {
            debug!(room_id = %self.room_id, %color, "stale bot roll alarm ignored");
            return;
        }
        let Some(bot) = self
            .state
            .player_by_color(color)
            .filter(|p| p.is_bot)
            .map(|p| p.id)
        else {
            // The seat went back to a human.
            self.schedule_turn();
            return;
        };

        self.turn_in_progress = true;
        let decision = self
            .config
            .bot_strategy
            .decide(&self.state, color, &mut *self.bot_rng);
        match decision {
            Ok(BotAction::Roll) => {}
            Ok(other) => return self.recover(color, format!("bot chose {other:?} while rolling")),
            Err(err) => return self.recover(color, err.to_string()),
        }

        let now = self.now_ms();
        match self.dice.handle_roll_request(&self.state, bot, now) {
            Ok(outcome) => {
                if self.apply_roll(outcome) {
                    self.timer
                        .arm(self.config.bot_move_delay, AlarmKind::BotMove(color));
                    return;
                }
                self.turn_in_progress = false;
                self.schedule_turn();
            }
            Err(RuleError::RollTooSoon { wait_ms }) => {
                self.turn_in_progress = false;
                self.timer
                    .arm(Duration::from_millis(wait_ms), AlarmKind::BotRoll(color));
            }
            Err(err) => self.recover(color, err.to_string()),
        }
    }

    fn on_bot_move(&mut self, color: Color) {
        let bot_seat = self.state.player_by_color(color).is_some_and(|p| p.is_bot);
        if !bot_seat || self.state.current_turn != Some(color) || self.state.phase != Phase::Moving {
            debug!(room_id = %self.room_id, %color, "stale bot move alarm ignored");
            self.turn_in_progress = false;
            self.schedule_turn();
            return;
        }

        let decision = self
            .config
            .bot_strategy
            .decide(&self.state, color, &mut *self.bot_rng);
        match decision {
            Ok(BotAction::Move(pawn_id)) => {
                let moves = valid_moves(&self.state);
                match execute_move(&self.state, pawn_id, &moves) {
                    Ok(outcome) => self.apply_move(outcome),
                    Err(err) => return self.recover(color, err.to_string()),
                }
            }
            Ok(BotAction::Skip) => self.skip(color, SkipReason::NoValidMoves),
            Ok(BotAction::Roll) => {
                return self.recover(color, "bot chose to roll with dice pending".into());
            }
            Err(err) => return self.recover(color, err.to_string()),
        }

        self.turn_in_progress = false;
        self.schedule_turn();
    }

    // -- Turn steps ---------------------------------------------------------

    /// Installs a roll and broadcasts it. Returns `true` when a move is now
    /// pending; otherwise the turn has already been skipped.
    fn apply_roll(&mut self, outcome: RollOutcome) -> bool {
        let RollOutcome {
            state,
            color,
            value,
            weighted,
            forfeited,
        } = outcome;
        self.state = state;

        let movable: Vec<PawnId> = if forfeited {
            Vec::new()
        } else {
            valid_moves(&self.state).iter().map(|m| m.pawn_id).collect()
        };
        let pending = !movable.is_empty();
        self.broadcast(ServerEvent::DiceRolled {
            color,
            value,
            weighted,
            movable,
        });

        if forfeited {
            self.announce_skip(color, SkipReason::ThreeSixes);
        } else if !pending {
            self.state = turn::skip_turn(&self.state);
            self.announce_skip(color, SkipReason::NoValidMoves);
        }
        self.broadcast_state();
        pending
    }

    fn apply_move(&mut self, outcome: MoveOutcome) {
        let MoveOutcome {
            state,
            color,
            mv,
            captured,
            extra_turn,
            newly_ranked,
        } = outcome;
        self.state = state;

        self.broadcast(ServerEvent::MoveExecuted {
            color,
            pawn_id: mv.pawn_id,
            from: mv.from,
            to: mv.to,
            captured,
            extra_turn,
        });
        for player_id in newly_ranked {
            let rank = self.state.player(player_id).and_then(|p| p.rank);
            info!(room_id = %self.room_id, %player_id, ?rank, "player ranked");
        }
        self.broadcast_state();
    }

    /// Ends the current turn without a move and broadcasts the result.
    fn skip(&mut self, color: Color, reason: SkipReason) {
        self.state = turn::skip_turn(&self.state);
        self.announce_skip(color, reason);
        self.broadcast_state();
    }

    /// Forces progress after a failed step.
    fn recover(&mut self, color: Color, reason: String) {
        warn!(room_id = %self.room_id, %color, %reason, "turn step failed, forcing skip");
        if self.state.current_turn == Some(color) && self.state.phase.is_playing() {
            self.skip(color, SkipReason::Recovered);
        }
        self.turn_in_progress = false;
        self.schedule_turn();
    }

    fn remove_inactive(&mut self, player: &Player) {
        match turn::remove_player(&self.state, player.id) {
            Ok(next) => self.state = next,
            Err(err) => {
                warn!(room_id = %self.room_id, player_id = %player.id, %err, "could not remove player");
                return;
            }
        }
        self.seats.retain(|_, seated| *seated != player.id);
        if self.host == Some(player.id) {
            self.host = self.first_human();
        }
        info!(room_id = %self.room_id, player_id = %player.id, color = %player.color, "player removed for inactivity");
        self.broadcast(ServerEvent::PlayerKicked {
            player_id: player.id,
            color: player.color,
            reason: KickReason::Inactive,
            replaced_by_bot: false,
        });
        self.broadcast_state();
    }

    fn take_over(&mut self, player: &Player) {
        match turn::convert_to_bot(&self.state, player.id) {
            Ok(next) => self.state = next,
            Err(err) => {
                warn!(room_id = %self.room_id, player_id = %player.id, %err, "could not hand seat to bot");
                return;
            }
        }
        // The connection stays attached as an observer.
        self.seats.retain(|_, seated| *seated != player.id);
        self.taken_over.insert(player.id);
        info!(room_id = %self.room_id, player_id = %player.id, color = %player.color, "bot took over inactive seat");
        self.broadcast(ServerEvent::PlayerKicked {
            player_id: player.id,
            color: player.color,
            reason: KickReason::Inactive,
            replaced_by_bot: true,
        });
        self.broadcast_state();
    }

    /// Arms the alarm for whoever holds the turn now, or stops everything
    /// once the game is over.
    fn schedule_turn(&mut self) {
        if self.state.is_finished() {
            self.finish();
            return;
        }
        if !self.state.phase.is_playing() {
            self.timer.cancel();
            return;
        }
        let Some((color, is_bot)) = self.state.current_player().map(|p| (p.color, p.is_bot)) else {
            self.timer.cancel();
            return;
        };

        if is_bot {
            let (delay, kind) = match self.state.phase {
                Phase::Moving => (self.config.bot_move_delay, AlarmKind::BotMove(color)),
                _ => (self.config.bot_think_delay, AlarmKind::BotRoll(color)),
            };
            self.timer.arm(delay, kind);
        } else {
            let timeout = self.config.turn_timeout;
            self.timer.arm(timeout, AlarmKind::TurnTimeout(color));
            let deadline_ms = self.now_ms() + timeout.as_millis() as u64;
            self.broadcast(ServerEvent::TurnTimerStarted { color, deadline_ms });
        }
    }

    fn finish(&mut self) {
        self.timer.cancel();
        self.turn_in_progress = false;
        if self.finished {
            return;
        }
        self.finished = true;
        info!(
            room_id = %self.room_id,
            winner = ?self.state.winner,
            "game finished"
        );
    }

    // -- Helpers ------------------------------------------------------------

    fn seat_bot(&mut self) -> Result<PlayerId, RuleError> {
        if self.state.phase != Phase::Waiting {
            return Err(RuleError::GameInProgress);
        }
        let number = self.state.players.iter().filter(|p| p.is_bot).count() + 1;
        let id = PlayerId::random();
        let (next, color) = turn::add_player(&self.state, id, &format!("Bot {number}"), true)?;
        self.state = next;
        info!(room_id = %self.room_id, player_id = %id, %color, "bot seated");
        Ok(id)
    }

    fn seated(&self, connection: ConnectionId) -> Result<PlayerId, Rejection> {
        self.seats
            .get(&connection)
            .copied()
            .ok_or_else(|| Rejection::new(ErrorCode::NotJoined, "join the room first"))
    }

    fn ensure_host(&self, player_id: PlayerId) -> Result<(), Rejection> {
        if self.host == Some(player_id) {
            Ok(())
        } else {
            Err(Rejection::new(ErrorCode::NotHost, "only the host can do that"))
        }
    }

    fn ensure_idle(&self) -> Result<(), Rejection> {
        if self.turn_in_progress {
            Err(Rejection::new(ErrorCode::Busy, "a turn step is in progress"))
        } else {
            Ok(())
        }
    }

    fn first_human(&self) -> Option<PlayerId> {
        self.state.players.iter().find(|p| !p.is_bot).map(|p| p.id)
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn room_info(&self, player_id: PlayerId, color: Color) -> ServerEvent {
        ServerEvent::RoomInfo {
            room_id: self.room_id.clone(),
            player_id,
            color,
            host: self.host == Some(player_id),
            max_players: self.state.max_players,
        }
    }

    fn announce_player(&self, player_id: PlayerId) {
        if let Some(player) = self.state.player(player_id) {
            self.broadcast(ServerEvent::PlayerJoined {
                player_id,
                name: player.name.clone(),
                color: player.color,
                is_bot: player.is_bot,
            });
        }
    }

    fn announce_skip(&self, color: Color, reason: SkipReason) {
        debug!(room_id = %self.room_id, %color, %reason, next = ?self.state.current_turn, "turn skipped");
        self.broadcast(ServerEvent::TurnSkipped {
            color,
            reason,
            next: self.state.current_turn,
        });
    }

    fn broadcast_state(&self) {
        self.broadcast(ServerEvent::State {
            state: self.state.clone(),
        });
    }

    fn broadcast(&self, event: ServerEvent) {
        self.dispatch(Recipient::All, event);
    }

    /// Delivers an event. Closed receivers are skipped silently; their
    /// detach is on its way.
    fn dispatch(&self, recipient: Recipient, event: ServerEvent) {
        trace!(room_id = %self.room_id, kind = event.kind(), ?recipient, "dispatch");
        match recipient {
            Recipient::All => {
                for sender in self.connections.values() {
                    let _ = sender.send(event.clone());
                }
            }
            Recipient::Connection(connection) => {
                if let Some(sender) = self.connections.get(&connection) {
                    let _ = sender.send(event);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

/// Spawns a room actor with dice from `config.dice_seed`, or from the
/// thread generator when no seed is set.
pub fn spawn_room(room_id: RoomId, config: RoomConfig) -> RoomHandle {
    let (dice, bots): (Box<dyn RandomSource>, Box<dyn RandomSource>) = match config.dice_seed {
        Some(seed) => (
            Box::new(SeededSource::new(seed)),
            Box::new(SeededSource::new(seed.rotate_left(32))),
        ),
        None => (Box::new(ThreadSource), Box::new(ThreadSource)),
    };
    spawn_room_with_sources(room_id, config, dice, bots)
}

/// Spawns a room actor with explicit random sources for the dice and the
/// bots. Tests use this to script every roll.
pub fn spawn_room_with_sources(
    room_id: RoomId,
    config: RoomConfig,
    dice: Box<dyn RandomSource>,
    bot_rng: Box<dyn RandomSource>,
) -> RoomHandle {
    let config = config.validated();
    let (tx, rx) = mpsc::channel(config.channel_size);
    let debounce_ms = config.roll_debounce.as_millis() as u64;

    let actor = RoomActor {
        room_id: room_id.clone(),
        state: GameState::new(room_id.clone(), config.max_players),
        dice: Dice::new(dice, debounce_ms),
        bot_rng,
        receiver: rx,
        connections: HashMap::new(),
        seats: HashMap::new(),
        host: None,
        timeouts: HashMap::new(),
        taken_over: HashSet::new(),
        timer: TurnTimer::new(TimerConfig::default()),
        turn_in_progress: false,
        finished: false,
        epoch: Instant::now(),
        config,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
