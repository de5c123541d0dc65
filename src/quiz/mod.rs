//! Map-click quiz state machine
//!
//! A [`Quiz`] draws questions at random from its pool, judges guesses,
//! flashes and then pins the answer once the attempt budget is spent, and
//! finishes after `max_questions` questions or when the pool runs dry.
//! Everything visible goes out through a [`Presenter`]; everything delayed
//! goes through a [`Scheduler`] and comes back as an [`Alarm`].

use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use tracing::{debug, info, warn};

use crate::{
    Alarm,
    config::QuizOptions,
    data::QuizItem,
    effects::{Celebration, Effect, Ripple},
    presenter::Presenter,
    retest,
    scheduler::{Scheduler, TaskHandle},
    score::ScoreTracker,
    timer::{Timer, format_elapsed},
};

use layer::{EntityAdapter, EntityId, VisualState};

pub mod layer;
pub mod line;
pub mod point;
pub mod polygon;

/// Phases of a quiz
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizState {
    /// A question is asked and guesses are judged
    #[default]
    AwaitingAnswer,
    /// The answer is highlighted and only a click on it moves on
    ForcedReveal,
    /// No more questions; input is ignored
    Finished,
}

/// Sound the host should play
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// A guess was right
    Correct,
    /// A guess was wrong
    Incorrect,
}

impl Cue {
    /// Pitch of the sine tone in hertz
    pub fn frequency(self) -> f64 {
        match self {
            Self::Correct => 800.,
            Self::Incorrect => 400.,
        }
    }

    /// Length of the tone
    pub fn duration(self) -> Duration {
        Duration::from_millis(300)
    }
}

/// How a tooltip should be decorated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipTone {
    /// Details of a correct answer
    Info,
    /// Name of a wrongly clicked entity
    Wrong,
}

/// Outcome of a quiz run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Rounded share of correct guesses among all guesses
    pub percentage: u32,
    /// Correct guesses
    pub correct: u32,
    /// All guesses
    pub attempts: u32,
    /// Questions asked
    pub questions: usize,
}

/// Updates about the running quiz
#[serde_as]
#[derive(Debug, Serialize, Clone, PartialEq)]
pub enum UpdateMessage {
    /// A question is (re)asked
    Question {
        /// One-based ordinal of the question
        index: usize,
        /// Number of questions in this run
        total: usize,
        /// What has to be found
        name: String,
        /// Whether the answer is highlighted and has to be clicked
        locate: bool,
        /// Instruction shown with a highlighted answer
        hint: Option<String>,
    },
    /// The score changed
    Score {
        /// Rounded share of correct guesses
        percentage: u32,
    },
    /// Elapsed time as `m:ss`
    Timer(String),
    /// A sound to play
    Cue(Cue),
    /// A transient tooltip on an entity
    Tooltip {
        /// The entity the tooltip is attached to
        entity: EntityId,
        /// Tooltip text, one line per row
        text: String,
        /// Decoration
        tone: TooltipTone,
        /// How long the tooltip stays open
        #[serde_as(as = "DurationMilliSeconds<u64>")]
        duration: Duration,
    },
    /// The quiz is over
    Finished(QuizResult),
}

impl UpdateMessage {
    /// Prompt line for a question update
    ///
    /// `"3/10 Click on: Everest"`, or with a highlighted answer
    /// `"3/10 Locate: Everest (Click the highlighted marker to continue)"`.
    pub fn prompt(&self) -> Option<String> {
        let Self::Question {
            index,
            total,
            name,
            locate,
            hint,
        } = self
        else {
            return None;
        };
        Some(match (locate, hint) {
            (true, Some(hint)) => format!("{index}/{total} Locate: {name} ({hint})"),
            (true, None) => format!("{index}/{total} Locate: {name}"),
            (false, _) => format!("{index}/{total} Click on: {name}"),
        })
    }
}

/// Snapshot of a quiz for a host that reattaches
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncMessage {
    /// Current phase
    pub state: QuizState,
    /// One-based ordinal of the current question, 0 before the first
    pub index: usize,
    /// Number of questions in this run
    pub total: usize,
    /// What has to be found, if a question is open
    pub name: Option<String>,
    /// Wrong guesses left before the answer is revealed
    pub attempts_left: u32,
    /// Rounded share of correct guesses
    pub percentage: u32,
    /// Elapsed time as `m:ss`
    pub elapsed: String,
}

/// Mutable state of one quiz run
#[derive(Debug, Clone)]
pub struct QuizSession {
    remaining: Vec<QuizItem>,
    current: Option<QuizItem>,
    question_index: usize,
    total_questions: usize,
    attempts_left: u32,
    highlighted: Option<EntityId>,
    revealing: Option<EntityId>,
    touched: Vec<EntityId>,
    pending: Vec<TaskHandle>,
    score: ScoreTracker,
}

impl QuizSession {
    fn new(remaining: Vec<QuizItem>, attempts_left: u32) -> Self {
        Self {
            remaining,
            current: None,
            question_index: 0,
            total_questions: 0,
            attempts_left,
            highlighted: None,
            revealing: None,
            touched: Vec::new(),
            pending: Vec::new(),
            score: ScoreTracker::new(),
        }
    }

    /// Items not asked yet
    pub fn remaining(&self) -> &[QuizItem] {
        &self.remaining
    }

    /// The item currently asked for
    pub fn current(&self) -> Option<&QuizItem> {
        self.current.as_ref()
    }

    /// One-based ordinal of the current question, 0 before the first
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    /// Number of questions in this run, fixed at the first draw
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    /// Wrong guesses left before the answer is revealed
    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    /// The entity that has to be clicked during a forced reveal
    pub fn highlighted(&self) -> Option<EntityId> {
        self.highlighted
    }

    /// The entity flashing before a forced reveal
    pub fn revealing(&self) -> Option<EntityId> {
        self.revealing
    }

    /// Correct guesses and attempts so far
    pub fn score(&self) -> &ScoreTracker {
        &self.score
    }
}

fn named_pool(items: impl IntoIterator<Item = QuizItem>) -> Vec<QuizItem> {
    let (pool, unnamed): (Vec<_>, Vec<_>) = items
        .into_iter()
        .partition(|item| !item.name.trim().is_empty());
    if !unnamed.is_empty() {
        warn!(count = unnamed.len(), "items without a name left out of the pool");
    }
    pool
}

fn announce<P: Presenter>(presenter: &P, message: impl Into<crate::UpdateMessage>) {
    presenter.send_message(&message.into());
}

/// A quiz played on the entities of an [`EntityAdapter`]
#[derive(Debug)]
pub struct Quiz<A> {
    options: QuizOptions,
    adapter: A,
    session: QuizSession,
    state: QuizState,
    started: bool,
    timer: Timer,
    timer_task: Option<TaskHandle>,
    rng: fastrand::Rng,
    wrong_answers: BTreeSet<String>,
}

impl<A: EntityAdapter> Quiz<A> {
    /// Creates a quiz asking for `items` on the entities of `adapter`
    ///
    /// Items with a blank name are left out of the pool.
    pub fn new(options: QuizOptions, adapter: A, items: impl IntoIterator<Item = QuizItem>) -> Self {
        Self {
            session: QuizSession::new(named_pool(items), options.max_attempts),
            options,
            adapter,
            state: QuizState::default(),
            started: false,
            timer: Timer::new(),
            timer_task: None,
            rng: fastrand::Rng::new(),
            wrong_answers: BTreeSet::new(),
        }
    }

    /// Uses `rng` for drawing questions and effect particles
    #[must_use]
    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    /// Restricts the pool to items whose normalized name is in `names`
    ///
    /// The question cap shrinks to the size of `names`. An empty set leaves
    /// the quiz unchanged.
    #[must_use]
    pub fn with_focus(mut self, names: &BTreeSet<String>) -> Self {
        self.restrict_pool(names);
        self
    }

    /// Number of questions this run asks at most
    ///
    /// Without a configured cap every item of the pool is asked.
    pub fn question_cap(&self) -> usize {
        self.options
            .max_questions
            .unwrap_or(self.session.remaining.len() + self.session.question_index)
    }

    fn restrict_pool(&mut self, names: &BTreeSet<String>) {
        if names.is_empty() {
            return;
        }
        self.session
            .remaining
            .retain(|item| names.contains(&retest::normalize_name(&item.name)));
        self.options.max_questions = Some(self.question_cap().min(names.len()));
        debug!(
            pool = self.session.remaining.len(),
            max_questions = self.question_cap(),
            "pool restricted to focus names"
        );
    }

    /// Starts over with a new pool on the same rendered entities
    ///
    /// Pending alarms are cancelled and styles restored; the new run waits
    /// for [`Quiz::start`]. `focus` restricts the pool like
    /// [`Quiz::with_focus`].
    pub fn reset<S: Scheduler>(
        &mut self,
        options: QuizOptions,
        items: impl IntoIterator<Item = QuizItem>,
        focus: &BTreeSet<String>,
        scheduler: &mut S,
    ) {
        self.abort(scheduler);
        self.session = QuizSession::new(named_pool(items), options.max_attempts);
        self.options = options;
        self.state = QuizState::default();
        self.started = false;
        self.timer = Timer::new();
        self.wrong_answers.clear();
        self.restrict_pool(focus);
    }

    /// The options in effect
    pub fn options(&self) -> &QuizOptions {
        &self.options
    }

    /// The rendered entities
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// The rendered entities, mutably
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// The current run
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Current phase
    pub fn state(&self) -> QuizState {
        self.state
    }

    /// Whether the quiz is over
    pub fn is_finished(&self) -> bool {
        self.state == QuizState::Finished
    }

    /// Names of questions answered wrong at least once
    pub fn wrong_answers(&self) -> &BTreeSet<String> {
        &self.wrong_answers
    }

    /// Score of the run so far
    pub fn result(&self) -> QuizResult {
        let score = self.session.score.stats();
        QuizResult {
            percentage: score.percentage,
            correct: score.correct,
            attempts: score.total,
            questions: self.session.question_index,
        }
    }

    /// Snapshot for a reattaching host
    pub fn sync(&self) -> SyncMessage {
        SyncMessage {
            state: self.state,
            index: self.session.question_index,
            total: self.session.total_questions,
            name: self.session.current.as_ref().map(|item| item.name.clone()),
            attempts_left: self.session.attempts_left,
            percentage: self.session.score.percentage(),
            elapsed: format_elapsed(self.timer.elapsed()),
        }
    }

    fn change_state(&mut self, before: QuizState, after: QuizState) -> bool {
        if self.state == before {
            self.state = after;

            true
        } else {
            false
        }
    }

    /// Starts the timer and asks the first question
    ///
    /// Starting twice has no effect.
    pub fn start<S: Scheduler, P: Presenter>(&mut self, scheduler: &mut S, presenter: &P) {
        if self.started {
            return;
        }
        self.started = true;

        info!(
            pool = self.session.remaining.len(),
            max_questions = self.question_cap(),
            "quiz started"
        );
        self.timer
            .start(|elapsed: &str| tracing::trace!(elapsed, "timer tick"));
        self.timer_task = Some(scheduler.schedule(Alarm::TimerTick, self.options.timer_interval));
        announce(
            presenter,
            UpdateMessage::Score {
                percentage: self.session.score.percentage(),
            },
        );
        self.select_next_question(scheduler, presenter);
    }

    /// Ends the current question and asks the next one, or finishes
    pub fn select_next_question<S: Scheduler, P: Presenter>(
        &mut self,
        scheduler: &mut S,
        presenter: &P,
    ) {
        if self.is_finished() {
            return;
        }
        self.clear_question(scheduler);
        self.state = QuizState::AwaitingAnswer;

        let cap = self.question_cap();
        let session = &mut self.session;
        if session.question_index >= cap || session.remaining.is_empty() {
            self.finish(scheduler, presenter);
            return;
        }
        if session.total_questions == 0 {
            session.total_questions = cap.min(session.remaining.len() + session.question_index);
        }

        let item = session
            .remaining
            .swap_remove(self.rng.usize(..session.remaining.len()));
        session.question_index += 1;
        debug!(question = session.question_index, name = %item.name, "question drawn");

        let message = UpdateMessage::Question {
            index: session.question_index,
            total: session.total_questions,
            name: item.name.clone(),
            locate: false,
            hint: None,
        };
        session.current = Some(item);
        announce(presenter, message);
    }

    /// Judges a click on `entity`
    pub fn click<S: Scheduler, P: Presenter>(
        &mut self,
        entity: EntityId,
        scheduler: &mut S,
        presenter: &P,
    ) {
        let Some(name) = self.adapter.extract_name(entity).map(str::to_string) else {
            debug!(%entity, "click on unknown entity");
            return;
        };
        self.judge(Some(entity), &name, scheduler, presenter);
    }

    /// Judges a guess given by name
    pub fn submit_guess<S: Scheduler, P: Presenter>(
        &mut self,
        name: &str,
        scheduler: &mut S,
        presenter: &P,
    ) {
        let entity = self.adapter.find_entity_by_name(name);
        self.judge(entity, name, scheduler, presenter);
    }

    /// Styles `entity` as hovered
    pub fn pointer_enter(&mut self, entity: EntityId) {
        if !self.hover_locked(entity) {
            self.adapter.apply_visual_state(entity, VisualState::Hover);
        }
    }

    /// Restores `entity` after a hover
    pub fn pointer_leave(&mut self, entity: EntityId) {
        if !self.hover_locked(entity) {
            self.adapter
                .apply_visual_state(entity, VisualState::Default);
        }
    }

    fn hover_locked(&self, entity: EntityId) -> bool {
        self.is_finished()
            || self.session.highlighted == Some(entity)
            || self.session.revealing == Some(entity)
    }

    /// Handles a due alarm
    ///
    /// Alarms of an earlier question and alarms arriving after the quiz
    /// finished are ignored.
    pub fn receive_alarm<S: Scheduler, P: Presenter>(
        &mut self,
        alarm: Alarm,
        scheduler: &mut S,
        presenter: &P,
    ) {
        if self.is_finished() {
            return;
        }
        if alarm
            .question()
            .is_some_and(|question| question != self.session.question_index)
        {
            debug!(?alarm, "stale alarm ignored");
            return;
        }

        match alarm {
            Alarm::Advance { .. } => self.select_next_question(scheduler, presenter),
            Alarm::RestoreStyle { entity, .. } => {
                if self.session.highlighted != Some(entity) && self.session.revealing != Some(entity)
                {
                    self.adapter
                        .apply_visual_state(entity, VisualState::Default);
                }
            }
            Alarm::RevealFlash { question, lit } => {
                if let Some(entity) = self.session.revealing {
                    let state = if lit {
                        VisualState::Flash
                    } else {
                        VisualState::Default
                    };
                    self.adapter.apply_visual_state(entity, state);
                    self.schedule(
                        scheduler,
                        Alarm::RevealFlash {
                            question,
                            lit: !lit,
                        },
                        self.options.flash_interval,
                    );
                }
            }
            Alarm::EnterForcedReveal { .. } => self.enter_forced_reveal(presenter),
            Alarm::TimerTick => {
                if let Some(elapsed) = self.timer.tick() {
                    announce(presenter, UpdateMessage::Timer(elapsed));
                }
                self.timer_task =
                    Some(scheduler.schedule(Alarm::TimerTick, self.options.timer_interval));
            }
        }
    }

    fn judge<S: Scheduler, P: Presenter>(
        &mut self,
        entity: Option<EntityId>,
        name: &str,
        scheduler: &mut S,
        presenter: &P,
    ) {
        if self.is_finished() {
            return;
        }
        let Some(current) = self.session.current.as_ref().map(|item| item.name.clone()) else {
            return;
        };
        if current == name {
            self.answer_correct(entity, scheduler, presenter);
            return;
        }

        self.wrong_answers.insert(retest::normalize_name(&current));
        announce(presenter, UpdateMessage::Cue(Cue::Incorrect));

        match self.state {
            QuizState::ForcedReveal => {
                if let Some(entity) = entity {
                    self.mark_wrong(
                        entity,
                        name.to_string(),
                        self.options.forced_wrong_feedback,
                        scheduler,
                        presenter,
                    );
                }
            }
            QuizState::AwaitingAnswer => {
                self.session.score.record_incorrect();
                self.session.attempts_left = self.session.attempts_left.saturating_sub(1);
                announce(
                    presenter,
                    UpdateMessage::Score {
                        percentage: self.session.score.percentage(),
                    },
                );
                if let Some(entity) = entity {
                    self.mark_wrong(
                        entity,
                        format!("Incorrect: {name}"),
                        self.options.wrong_feedback,
                        scheduler,
                        presenter,
                    );
                }
                if self.session.attempts_left == 0 && self.session.revealing.is_none() {
                    self.begin_reveal(scheduler, presenter);
                }
            }
            QuizState::Finished => {}
        }
    }

    fn answer_correct<S: Scheduler, P: Presenter>(
        &mut self,
        entity: Option<EntityId>,
        scheduler: &mut S,
        presenter: &P,
    ) {
        let question = self.session.question_index;
        self.session.score.record_correct();
        for handle in self.session.pending.drain(..) {
            scheduler.cancel(handle);
        }
        self.session.revealing = None;

        announce(presenter, UpdateMessage::Cue(Cue::Correct));
        announce(
            presenter,
            UpdateMessage::Score {
                percentage: self.session.score.percentage(),
            },
        );

        if let Some(entity) = entity {
            self.restyle(entity, VisualState::Correct);
            if let Some(text) = self.adapter.describe(entity) {
                announce(
                    presenter,
                    UpdateMessage::Tooltip {
                        entity,
                        text,
                        tone: TooltipTone::Info,
                        duration: self.options.success_hold,
                    },
                );
            }
            if let Some(origin) = self.adapter.feedback_anchor(entity) {
                announce(
                    presenter,
                    Effect::from(Celebration::new(origin, &mut self.rng)),
                );
            }
        }

        debug!(question, "answered correctly");
        self.schedule(
            scheduler,
            Alarm::Advance { question },
            self.options.success_hold,
        );
    }

    fn mark_wrong<S: Scheduler, P: Presenter>(
        &mut self,
        entity: EntityId,
        text: String,
        hold: Duration,
        scheduler: &mut S,
        presenter: &P,
    ) {
        self.restyle(entity, VisualState::Wrong);
        announce(
            presenter,
            UpdateMessage::Tooltip {
                entity,
                text,
                tone: TooltipTone::Wrong,
                duration: self.options.tooltip,
            },
        );
        self.schedule(
            scheduler,
            Alarm::RestoreStyle {
                question: self.session.question_index,
                entity,
            },
            hold,
        );
    }

    fn begin_reveal<S: Scheduler, P: Presenter>(&mut self, scheduler: &mut S, presenter: &P) {
        let question = self.session.question_index;
        let Some(name) = self.session.current.as_ref().map(|item| item.name.clone()) else {
            return;
        };

        match self.adapter.find_entity_by_name(&name) {
            Some(entity) => {
                debug!(question, %name, "attempts exhausted, revealing answer");
                self.session.revealing = Some(entity);
                self.touch(entity);
                self.schedule(
                    scheduler,
                    Alarm::RevealFlash {
                        question,
                        lit: true,
                    },
                    self.options.flash_interval,
                );
                self.schedule(
                    scheduler,
                    Alarm::EnterForcedReveal { question },
                    self.options.reveal_delay,
                );
            }
            None => {
                warn!(question, %name, "answer has no rendered entity, skipping question");
                self.select_next_question(scheduler, presenter);
            }
        }
    }

    fn enter_forced_reveal<P: Presenter>(&mut self, presenter: &P) {
        let Some(entity) = self.session.revealing.take() else {
            return;
        };
        if !self.change_state(QuizState::AwaitingAnswer, QuizState::ForcedReveal) {
            return;
        }

        self.session.highlighted = Some(entity);
        self.restyle(entity, VisualState::Target);
        if let Some(origin) = self.adapter.feedback_anchor(entity) {
            announce(
                presenter,
                Effect::from(Ripple::new(origin, self.adapter.ripple_color())),
            );
        }
        if let Some(current) = &self.session.current {
            announce(
                presenter,
                UpdateMessage::Question {
                    index: self.session.question_index,
                    total: self.session.total_questions,
                    name: current.name.clone(),
                    locate: true,
                    hint: Some(self.adapter.locate_hint().to_string()),
                },
            );
        }
    }

    fn finish<S: Scheduler, P: Presenter>(&mut self, scheduler: &mut S, presenter: &P) {
        self.state = QuizState::Finished;
        self.session.current = None;
        self.timer.stop();
        if let Some(handle) = self.timer_task.take() {
            scheduler.cancel(handle);
        }

        let result = self.result();
        info!(
            percentage = result.percentage,
            correct = result.correct,
            attempts = result.attempts,
            questions = result.questions,
            "quiz finished"
        );
        announce(presenter, UpdateMessage::Finished(result));
    }

    /// Cancels every scheduled task and restores all styled entities
    ///
    /// The quiz ends up finished without announcing a result.
    pub fn abort<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.clear_question(scheduler);
        self.state = QuizState::Finished;
        self.session.current = None;
        self.timer.stop();
        if let Some(handle) = self.timer_task.take() {
            scheduler.cancel(handle);
        }
        debug!(question = self.session.question_index, "quiz aborted");
    }

    /// Gives the rendered entities back
    pub fn into_adapter(self) -> A {
        self.adapter
    }

    fn clear_question<S: Scheduler>(&mut self, scheduler: &mut S) {
        for handle in self.session.pending.drain(..) {
            scheduler.cancel(handle);
        }
        for entity in self.session.touched.drain(..) {
            self.adapter
                .apply_visual_state(entity, VisualState::Default);
        }
        self.session.highlighted = None;
        self.session.revealing = None;
        self.session.attempts_left = self.options.max_attempts;
    }

    fn schedule<S: Scheduler>(&mut self, scheduler: &mut S, alarm: Alarm, delay: Duration) {
        let handle = scheduler.schedule(alarm, delay);
        self.session.pending.push(handle);
    }

    fn touch(&mut self, entity: EntityId) {
        if !self.session.touched.contains(&entity) {
            self.session.touched.push(entity);
        }
    }

    fn restyle(&mut self, entity: EntityId, state: VisualState) {
        self.adapter.apply_visual_state(entity, state);
        self.touch(entity);
    }
}
