//! Playing a registry quiz on a page
//!
//! A [`Game`] ties one [`Quiz`] to the registry entry it was loaded from,
//! the progress store and the retest list of the page. Hosts feed it
//! [`IncomingMessage`]s and due [`Alarm`]s; it records a completed run once
//! and saves an incomplete one when the page goes away.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{
    Alarm, SyncMessage,
    config::{QuizOptions, Shape},
    data::{Position, QuizItem, csv, geojson},
    error::{Error, Result},
    presenter::Presenter,
    progress::{KeyValueStore, ProgressStore},
    quiz::{
        Quiz, QuizState,
        layer::{EntityAdapter, EntityId, Layer, VisualState},
        line::LineSheet,
        point::MarkerSheet,
        polygon::PolygonSheet,
    },
    registry::{DataSource, QuizEntry, Registry},
    retest::RetestStore,
    scheduler::Scheduler,
};

/// Rendered entities of any quiz shape
#[derive(Debug)]
pub enum Board {
    /// Markers of a point quiz
    Markers(Layer<MarkerSheet>),
    /// Lines of a river quiz
    Lines(Layer<LineSheet>),
    /// Polygons of a district quiz
    Districts(Layer<PolygonSheet>),
}

macro_rules! on_layer {
    ($board:expr, $layer:ident => $body:expr) => {
        match $board {
            Board::Markers($layer) => $body,
            Board::Lines($layer) => $body,
            Board::Districts($layer) => $body,
        }
    };
}

impl Board {
    /// How the entities are drawn
    pub fn shape(&self) -> Shape {
        match self {
            Self::Markers(_) => Shape::Point,
            Self::Lines(_) => Shape::Line,
            Self::Districts(_) => Shape::Polygon,
        }
    }

    /// Number of rendered entities
    pub fn len(&self) -> usize {
        on_layer!(self, layer => layer.len())
    }

    /// Whether nothing is rendered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entities whose style changed since the last call
    pub fn take_changes(&mut self) -> Vec<EntityId> {
        on_layer!(self, layer => layer.take_changes())
    }

    /// Current visual state of `entity`
    pub fn state(&self, entity: EntityId) -> Option<VisualState> {
        on_layer!(self, layer => layer.get(entity).map(|e| e.state))
    }
}

impl EntityAdapter for Board {
    fn extract_name(&self, entity: EntityId) -> Option<&str> {
        on_layer!(self, layer => layer.extract_name(entity))
    }

    fn apply_visual_state(&mut self, entity: EntityId, state: VisualState) {
        on_layer!(self, layer => layer.apply_visual_state(entity, state));
    }

    fn find_entity_by_name(&self, name: &str) -> Option<EntityId> {
        on_layer!(self, layer => layer.find_entity_by_name(name))
    }

    fn describe(&self, entity: EntityId) -> Option<String> {
        on_layer!(self, layer => layer.describe(entity))
    }

    fn feedback_anchor(&self, entity: EntityId) -> Option<Position> {
        on_layer!(self, layer => layer.feedback_anchor(entity))
    }

    fn ripple_color(&self) -> &str {
        on_layer!(self, layer => layer.ripple_color())
    }

    fn locate_hint(&self) -> &str {
        on_layer!(self, layer => layer.locate_hint())
    }
}

/// Input from the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomingMessage {
    /// An entity was clicked
    Click(EntityId),
    /// An answer was given by name
    Guess(String),
    /// The pointer moved onto an entity
    PointerEnter(EntityId),
    /// The pointer left an entity
    PointerLeave(EntityId),
    /// The player asked for a fresh run
    Restart,
}

/// A registry quiz being played
#[derive(Debug)]
pub struct Game<A, K> {
    quiz_id: String,
    options: QuizOptions,
    items: Vec<QuizItem>,
    focus: BTreeSet<String>,
    quiz: Quiz<A>,
    progress: ProgressStore<K>,
    retest: RetestStore<K>,
    rng: fastrand::Rng,
    recorded: bool,
}

impl<K: KeyValueStore> Game<Board, K> {
    /// Loads the quiz a page asks for
    ///
    /// The quiz comes from the `id` parameter of the `page` address, or
    /// failing that from the address itself. `data` is the content of the
    /// entry's source file. With `retest=wrong` in the address only the
    /// questions saved in `session` for this page are asked.
    ///
    /// # Errors
    ///
    /// Fails when `page` is not an absolute URL, when no quiz matches it,
    /// when the entry has no data source, when `data` cannot be read as
    /// that source, or when it yields no usable item.
    pub fn load(
        registry: &Registry,
        page: &str,
        data: &str,
        progress: ProgressStore<K>,
        session: K,
    ) -> Result<Self> {
        let url = &Url::parse(page)?;
        let (quiz_id, entry) = match registry.select(url) {
            Ok(found) => found,
            Err(error) => {
                let id = registry.detect_quiz_id(url).ok_or(error)?;
                (id, registry.entry(id)?)
            }
        };
        let (board, items) = build_board(registry, quiz_id, entry, data)?;

        let retest = RetestStore::for_page(session, url);
        let focus = retest.focus(url);
        if !focus.is_empty() {
            info!(quiz = quiz_id, questions = focus.len(), "retesting wrong answers");
        }

        Ok(Self::new(
            quiz_id,
            entry.options(),
            board,
            items,
            focus,
            progress,
            retest,
        ))
    }
}

fn build_board(
    registry: &Registry,
    quiz_id: &str,
    entry: &QuizEntry,
    data: &str,
) -> Result<(Board, Vec<QuizItem>)> {
    let source = entry
        .source
        .as_ref()
        .ok_or_else(|| Error::NoDataSource(quiz_id.to_string()))?;

    let (board, items) = match source {
        DataSource::Csv { mapping, .. } => {
            let items = csv::to_items(data, mapping)?;
            let sheet = registry.marker_sheet(entry);
            let sheet = match &mapping.extra_tooltip_field {
                Some(label) => sheet.with_extra_label(label.clone()),
                None => sheet,
            };
            (Board::Markers(Layer::new(sheet, items.clone())), items)
        }
        DataSource::GeoJson {
            name_properties,
            shape,
            filter,
            ..
        } => {
            let mut collection = geojson::parse_feature_collection(data)?;
            if let Some(filter) = filter {
                collection = geojson::filter_by_property(
                    &collection,
                    &filter.property,
                    &filter.value,
                    filter.case_sensitive,
                );
            }
            let items = geojson::to_items(&collection, name_properties.as_slice());
            let properties = name_properties.clone();
            let board = match shape {
                Shape::Point => Board::Markers(Layer::new(
                    registry
                        .marker_sheet(entry)
                        .with_name_properties(properties),
                    items.clone(),
                )),
                Shape::Line => Board::Lines(Layer::new(
                    LineSheet::default().with_name_properties(properties),
                    items.clone(),
                )),
                Shape::Polygon => Board::Districts(Layer::new(
                    PolygonSheet::default().with_name_properties(properties),
                    items.clone(),
                )),
            };
            (board, items)
        }
    };

    if items.is_empty() {
        return Err(Error::NoValidData(quiz_id.to_string()));
    }
    debug!(quiz = quiz_id, items = items.len(), shape = ?board.shape(), "quiz data loaded");
    Ok((board, items))
}

impl<A: EntityAdapter, K: KeyValueStore> Game<A, K> {
    /// Creates a game on already rendered entities
    pub fn new(
        quiz_id: impl Into<String>,
        options: QuizOptions,
        adapter: A,
        items: Vec<QuizItem>,
        focus: BTreeSet<String>,
        progress: ProgressStore<K>,
        retest: RetestStore<K>,
    ) -> Self {
        let mut rng = fastrand::Rng::new();
        let quiz = Quiz::new(options.clone(), adapter, items.clone())
            .with_rng(rng.fork())
            .with_focus(&focus);
        Self {
            quiz_id: quiz_id.into(),
            options,
            items,
            focus,
            quiz,
            progress,
            retest,
            rng,
            recorded: false,
        }
    }

    /// Seeds question order and effects for reproducible runs
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self.quiz = self.quiz.with_rng(self.rng.fork());
        self
    }

    /// Identifier of the registry entry
    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    /// The running quiz
    pub fn quiz(&self) -> &Quiz<A> {
        &self.quiz
    }

    /// Mutable access to the rendered entities
    pub fn adapter_mut(&mut self) -> &mut A {
        self.quiz.adapter_mut()
    }

    /// The progress store
    pub fn progress(&self) -> &ProgressStore<K> {
        &self.progress
    }

    /// The retest list of this page
    pub fn retest(&self) -> &RetestStore<K> {
        &self.retest
    }

    /// Gives the durable and the session store back
    pub fn into_stores(self) -> (ProgressStore<K>, K) {
        (self.progress, self.retest.into_inner())
    }

    /// Names the retest run is restricted to, empty outside retest mode
    pub fn focus(&self) -> &BTreeSet<String> {
        &self.focus
    }

    /// Starts the first run
    pub fn start<S: Scheduler, P: Presenter>(&mut self, scheduler: &mut S, presenter: &P) {
        self.quiz.start(scheduler, presenter);
        self.record_if_finished();
    }

    /// Handles input from the page
    pub fn receive_message<S: Scheduler, P: Presenter>(
        &mut self,
        message: IncomingMessage,
        scheduler: &mut S,
        presenter: &P,
    ) {
        match message {
            IncomingMessage::Click(entity) => self.quiz.click(entity, scheduler, presenter),
            IncomingMessage::Guess(name) => self.quiz.submit_guess(&name, scheduler, presenter),
            IncomingMessage::PointerEnter(entity) => self.quiz.pointer_enter(entity),
            IncomingMessage::PointerLeave(entity) => self.quiz.pointer_leave(entity),
            IncomingMessage::Restart => self.restart(scheduler, presenter),
        }
        self.record_if_finished();
    }

    /// Handles a due alarm
    pub fn receive_alarm<S: Scheduler, P: Presenter>(
        &mut self,
        alarm: Alarm,
        scheduler: &mut S,
        presenter: &P,
    ) {
        self.quiz.receive_alarm(alarm, scheduler, presenter);
        self.record_if_finished();
    }

    fn record_if_finished(&mut self) {
        if self.recorded || self.quiz.state() != QuizState::Finished {
            return;
        }
        self.recorded = true;
        self.progress
            .save_completed(&self.quiz_id, &self.quiz.result());
    }

    /// Throws the current run away and starts a new one
    ///
    /// A retest run restarts as the full quiz over every loaded item.
    pub fn restart<S: Scheduler, P: Presenter>(&mut self, scheduler: &mut S, presenter: &P) {
        info!(quiz = %self.quiz_id, retest = !self.focus.is_empty(), "restarting");
        self.focus.clear();
        self.quiz
            .reset(self.options.clone(), self.items.clone(), &self.focus, scheduler);
        self.recorded = false;
        self.quiz.start(scheduler, presenter);
        self.record_if_finished();
    }

    /// Sends a full snapshot of the quiz
    pub fn resync<P: Presenter>(&self, presenter: &P) {
        presenter.send_state(&SyncMessage::Quiz(self.quiz.sync()));
    }

    /// Saves what has to outlive the page
    ///
    /// A run that did not finish is stored as incomplete, unless the quiz
    /// was completed before. Questions answered wrong are kept for a
    /// retest of this page.
    pub fn unload(&mut self) {
        if !self.recorded {
            self.progress.auto_save_incomplete(&self.quiz_id);
        }
        let wrong = self.quiz.wrong_answers();
        if !wrong.is_empty() {
            self.retest.persist(wrong);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use itertools::Itertools;

    use super::*;
    use crate::{
        presenter::MessageQueue,
        progress::{MemoryStore, ProgressStatus},
        scheduler::ManualScheduler,
    };

    const REGISTRY: &str = r#"{
        "quizzes": {
            "peaks": {
                "category": "WORLD", "title": "Peaks",
                "source": {"type": "csv", "file": "data/peaks.csv",
                           "mapping": {"name": "Name", "lat": "Lat", "lng": "Lng",
                                       "extraTooltipField": "Range"}},
                "options": {"maxQuestions": 3}
            },
            "rivers": {
                "category": "WORLD", "title": "Rivers", "externalUrl": "quizzes/rivers.html",
                "source": {"type": "geojson", "file": "data/rivers.geojson",
                           "nameProperties": ["rivname", "name"], "shape": "line",
                           "filter": {"property": "continent", "value": "asia"}}
            },
            "districts": {
                "category": "INDIA", "title": "Districts",
                "source": {"type": "geojson", "file": "data/districts.geojson",
                           "nameProperties": ["DISTRICT"], "shape": "polygon"}
            },
            "capitals": {"category": "WORLD", "title": "Capitals",
                         "externalUrl": "quizzes/capitals.html"},
            "lakes": {
                "category": "INDIA", "title": "Lakes",
                "source": {"type": "csv", "file": "data/lakes.csv",
                           "mapping": {"name": "Name", "lat": "Lat", "lng": "Lng"}}
            }
        }
    }"#;

    const PEAKS: &str = "Name,Lat,Lng,Range\n\
        Everest,27.98,86.92,Himalaya\n\
        K2,35.88,76.51,Karakoram\n\
        Kangchenjunga,27.70,88.15,Himalaya\n";

    const RIVERS: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"rivname": "Ganga", "continent": "Asia"},
         "geometry": {"type": "LineString", "coordinates": [[83.0, 25.3], [84.0, 25.5]]}},
        {"type": "Feature", "properties": {"name": "Mekong", "continent": "ASIA"},
         "geometry": {"type": "LineString", "coordinates": [[105.0, 15.0], [106.0, 10.0]]}},
        {"type": "Feature", "properties": {"name": "Danube", "continent": "Europe"},
         "geometry": {"type": "LineString", "coordinates": [[20.0, 45.0], [28.0, 45.0]]}}
    ]}"#;

    type PeakGame = Game<Board, MemoryStore>;

    fn registry() -> Registry {
        Registry::from_json(REGISTRY).unwrap()
    }

    fn load(link: &str, data: &str) -> Result<PeakGame> {
        Game::load(
            &registry(),
            link,
            data,
            ProgressStore::new(MemoryStore::new()),
            MemoryStore::new(),
        )
    }

    fn peaks_game() -> PeakGame {
        load("https://geo.example/quiz.html?id=peaks", PEAKS)
            .unwrap()
            .with_seed(7)
    }

    fn run_until(
        game: &mut PeakGame,
        scheduler: &mut ManualScheduler,
        queue: &MessageQueue,
        until: Duration,
    ) {
        while let Some(alarm) = scheduler.pop_due(until) {
            game.receive_alarm(alarm, scheduler, queue);
        }
        scheduler.advance_to(until);
    }

    fn current_name(game: &PeakGame) -> String {
        game.quiz().session().current().unwrap().name.clone()
    }

    fn entity_named(game: &PeakGame, name: &str) -> EntityId {
        game.quiz().adapter().find_entity_by_name(name).unwrap()
    }

    fn other_entity(game: &PeakGame) -> EntityId {
        let name = current_name(game);
        let board = game.quiz().adapter();
        (0..board.len())
            .map(EntityId)
            .find(|id| board.extract_name(*id) != Some(name.as_str()))
            .unwrap()
    }

    #[test]
    fn test_load_csv_quiz() {
        let game = peaks_game();
        assert_eq!(game.quiz_id(), "peaks");
        let board = game.quiz().adapter();
        assert_eq!(board.shape(), Shape::Point);
        assert_eq!(board.len(), 3);
        assert_eq!(game.quiz().session().remaining().len(), 3);
        assert_eq!(game.quiz().options().max_questions, Some(3));
        assert!(game.focus().is_empty());

        let everest = entity_named(&game, "Everest");
        assert_eq!(
            board.describe(everest).as_deref(),
            Some("Everest\nRange: Himalaya")
        );
    }

    #[test]
    fn test_load_detects_page_and_filters() {
        let game = load("https://geo.example/quizzes/rivers.html", RIVERS).unwrap();
        assert_eq!(game.quiz_id(), "rivers");
        let board = game.quiz().adapter();
        assert_eq!(board.shape(), Shape::Line);
        assert_eq!(board.len(), 2);
        assert_eq!(board.extract_name(EntityId(0)), Some("Ganga"));
        assert_eq!(board.extract_name(EntityId(1)), Some("Mekong"));
        assert_eq!(board.locate_hint(), "click the correct river to continue");
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            load("https://geo.example/quiz.html?id=capitals", ""),
            Err(Error::NoDataSource(id)) if id == "capitals"
        ));
        assert!(matches!(
            load("https://geo.example/quiz.html?id=peaks", "Name,Lat,Lng\n"),
            Err(Error::NoValidData(id)) if id == "peaks"
        ));
        assert!(matches!(
            load("https://geo.example/quiz.html?id=peaks", "Title,Lat,Lng\nX,1,2\n"),
            Err(Error::MissingColumn(_))
        ));
        assert!(matches!(
            load("https://geo.example/quiz.html?id=districts", "not json"),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            load("https://geo.example/nowhere.html", PEAKS),
            Err(Error::MissingQuizId)
        ));
        assert!(matches!(
            load("https://geo.example/quiz.html?id=nope", PEAKS),
            Err(Error::UnknownQuiz(_))
        ));
        assert!(matches!(load("quiz.html?id=peaks", PEAKS), Err(Error::Url(_))));
    }

    #[test]
    fn test_polygon_board() {
        let districts = r#"{"features": [
            {"properties": {"DISTRICT": "Pune"},
             "geometry": {"type": "Polygon",
                          "coordinates": [[[73.0, 18.0], [74.0, 18.0], [74.0, 19.0], [73.0, 18.0]]]}}
        ]}"#;
        let mut game = load("https://geo.example/quiz.html?id=districts", districts).unwrap();
        let board = game.adapter_mut();
        assert_eq!(board.shape(), Shape::Polygon);
        board.apply_visual_state(EntityId(0), VisualState::Wrong);
        assert_eq!(board.take_changes(), [EntityId(0)]);
        assert_eq!(board.state(EntityId(0)), Some(VisualState::Wrong));
        assert_eq!(board.feedback_anchor(EntityId(0)), None);
    }

    #[test]
    fn test_completed_run_is_recorded_once() {
        let mut game = peaks_game();
        let mut scheduler = ManualScheduler::new();
        let queue = MessageQueue::new();
        game.start(&mut scheduler, &queue);

        for _ in 0..3 {
            let entity = entity_named(&game, &current_name(&game));
            game.receive_message(IncomingMessage::Click(entity), &mut scheduler, &queue);
            let hold = scheduler.now() + Duration::from_secs(3);
            run_until(&mut game, &mut scheduler, &queue, hold);
        }

        assert!(game.quiz().is_finished());
        let record = game.progress().quiz_data("peaks").unwrap();
        assert_eq!(record.status, ProgressStatus::Completed);
        assert_eq!(record.score, 100);
        assert_eq!(record.total_questions, 3);
        assert_eq!(record.correct_answers, 3);

        game.unload();
        assert_eq!(
            game.progress().quiz_status("peaks"),
            ProgressStatus::Completed
        );
        assert_eq!(game.retest().load(), None);
    }

    #[test]
    fn test_unload_then_retest_wrong_answers() {
        let mut game = peaks_game();
        let mut scheduler = ManualScheduler::new();
        let queue = MessageQueue::new();
        game.start(&mut scheduler, &queue);

        let missed = current_name(&game);
        let wrong = other_entity(&game);
        game.receive_message(IncomingMessage::Click(wrong), &mut scheduler, &queue);
        game.unload();

        assert_eq!(
            game.progress().quiz_status("peaks"),
            ProgressStatus::Incomplete
        );
        let expected = BTreeSet::from([missed.clone()]);
        assert_eq!(game.retest().load(), Some(expected.clone()));

        let (progress, session) = game.into_stores();
        let retest = Game::load(
            &registry(),
            "https://geo.example/quiz.html?id=peaks&retest=wrong",
            PEAKS,
            progress,
            session,
        )
        .unwrap();
        assert_eq!(retest.focus(), &expected);
        assert_eq!(retest.quiz().options().max_questions, Some(1));
        assert_eq!(retest.quiz().session().remaining().len(), 1);
        assert_eq!(retest.quiz().session().remaining()[0].name, missed);
    }

    #[test]
    fn test_unload_keeps_completed_record() {
        let mut progress = ProgressStore::new(MemoryStore::new());
        progress.save_quiz_result("peaks", ProgressStatus::Completed, 90, 10, 9);
        let mut game = Game::load(
            &registry(),
            "https://geo.example/quiz.html?id=peaks",
            PEAKS,
            progress,
            MemoryStore::new(),
        )
        .unwrap();
        let mut scheduler = ManualScheduler::new();
        game.start(&mut scheduler, &MessageQueue::new());
        game.unload();

        let record = game.progress().quiz_data("peaks").unwrap();
        assert_eq!(record.status, ProgressStatus::Completed);
        assert_eq!(record.score, 90);
    }

    #[test]
    fn test_restart_starts_fresh() {
        let mut game = peaks_game();
        let mut scheduler = ManualScheduler::new();
        let queue = MessageQueue::new();
        game.start(&mut scheduler, &queue);
        let wrong = other_entity(&game);
        game.receive_message(IncomingMessage::Click(wrong), &mut scheduler, &queue);
        queue.drain();

        game.receive_message(IncomingMessage::Restart, &mut scheduler, &queue);
        let quiz = game.quiz();
        assert_eq!(quiz.state(), QuizState::AwaitingAnswer);
        assert_eq!(quiz.session().question_index(), 1);
        assert_eq!(quiz.session().remaining().len(), 2);
        assert_eq!(quiz.result().attempts, 0);
        assert!(quiz.wrong_answers().is_empty());
        assert_eq!(quiz.adapter().state(wrong), Some(VisualState::Default));
        assert_eq!(scheduler.pending(), 1);
        assert!(scheduler.is_scheduled(&Alarm::TimerTick));
    }

    #[test]
    fn test_restart_leaves_retest_mode() {
        let mut session = MemoryStore::new();
        session
            .set(
                &crate::retest::context_key(&Url::parse("https://geo.example/quiz.html?id=peaks").unwrap()),
                r#"["K2"]"#,
            )
            .unwrap();
        let mut game = Game::load(
            &registry(),
            "https://geo.example/quiz.html?id=peaks&retest=wrong",
            PEAKS,
            ProgressStore::new(MemoryStore::new()),
            session,
        )
        .unwrap()
        .with_seed(7);
        let mut scheduler = ManualScheduler::new();
        let queue = MessageQueue::new();
        game.start(&mut scheduler, &queue);
        assert_eq!(game.quiz().session().total_questions(), 1);
        assert_eq!(current_name(&game), "K2");

        game.receive_message(IncomingMessage::Restart, &mut scheduler, &queue);
        assert!(game.focus().is_empty());
        let quiz = game.quiz();
        assert_eq!(quiz.options().max_questions, Some(3));
        assert_eq!(quiz.session().total_questions(), 3);
        assert_eq!(quiz.session().remaining().len(), 2);
    }

    #[test]
    fn test_unset_cap_asks_every_item() {
        let lakes = std::iter::once("Name,Lat,Lng".to_string())
            .chain((1..=30).map(|n| format!("Lake {n},{n}.5,{}.5", 70 + n)))
            .join("\n");
        let mut game = load("https://geo.example/quiz.html?id=lakes", &lakes)
            .unwrap()
            .with_seed(3);
        assert_eq!(game.quiz().options().max_questions, None);
        assert_eq!(game.quiz().session().remaining().len(), 30);

        let mut scheduler = ManualScheduler::new();
        let queue = MessageQueue::new();
        game.start(&mut scheduler, &queue);
        assert_eq!(game.quiz().session().total_questions(), 30);

        let mut asked = BTreeSet::new();
        while !game.quiz().is_finished() {
            let name = current_name(&game);
            asked.insert(name.clone());
            let entity = entity_named(&game, &name);
            game.receive_message(IncomingMessage::Click(entity), &mut scheduler, &queue);
            let hold = scheduler.now() + Duration::from_secs(3);
            run_until(&mut game, &mut scheduler, &queue, hold);
        }

        assert_eq!(asked.len(), 30);
        assert_eq!(game.quiz().result().questions, 30);
        let record = game.progress().quiz_data("lakes").unwrap();
        assert_eq!(record.total_questions, 30);
        assert_eq!(record.correct_answers, 30);
    }

    #[test]
    fn test_resync_sends_snapshot() {
        let mut game = peaks_game();
        let mut scheduler = ManualScheduler::new();
        let queue = MessageQueue::new();
        game.start(&mut scheduler, &queue);
        game.resync(&queue);

        let Some(SyncMessage::Quiz(sync)) = queue.take_state() else {
            panic!("no snapshot sent");
        };
        assert_eq!(sync.index, 1);
        assert_eq!(sync.total, 3);
        assert_eq!(sync.name, Some(current_name(&game)));
    }

    #[test]
    fn test_incoming_message_format() {
        assert_eq!(
            serde_json::from_str::<IncomingMessage>(r#"{"Click": 2}"#).unwrap(),
            IncomingMessage::Click(EntityId(2))
        );
        assert_eq!(
            serde_json::from_str::<IncomingMessage>(r#""Restart""#).unwrap(),
            IncomingMessage::Restart
        );
    }
}
