use std::sync::Arc;

use lesson_core::model::{
    GeneratedContent, LessonDescriptor, LessonId, LessonProgress, QuizQuestion,
};
use tracing::{debug, warn};

use crate::error::RunnerError;
use crate::progress::{CORRECT_ANSWER_POINTS, ProgressStore};
use crate::provider::ContentProvider;

use super::navigation::{initial_index, next_destination};
use super::state::{ActivityPhase, Advance, AnswerOutcome, Navigation, RunnerState};

const ITEM_ERROR: &str = "Could not create the lesson content. Please try again.";
const QUIZ_ERROR_QUESTION: &str = "Could not load a question";
const QUIZ_ERROR_EXPLANATION: &str =
    "Please try again. Check the API key and the network connection.";

/// An in-flight request for one item's material.
///
/// Produced by `LessonRunner::begin_item_fetch` and handed back with the provider's
/// answer to `complete_item_fetch`. If the runner moved on in between, the answer is
/// dropped.
#[derive(Debug, Clone)]
pub struct ItemFetch {
    index: usize,
    item_key: String,
    prompt: String,
    generation: u64,
}

impl ItemFetch {
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn item_key(&self) -> &str {
        &self.item_key
    }

    pub async fn run(&self, provider: &dyn ContentProvider) -> Option<GeneratedContent> {
        provider
            .generate_lesson_material(&self.prompt, &self.item_key)
            .await
    }
}

/// An in-flight request for the activity question.
#[derive(Debug, Clone)]
pub struct QuizFetch {
    prompt: String,
    generation: u64,
}

impl QuizFetch {
    pub async fn run(&self, provider: &dyn ContentProvider) -> Option<QuizQuestion> {
        provider.generate_quiz_question(&self.prompt).await
    }
}

/// Drives one lesson: walks its items in order, fetches material for each, then runs
/// the optional end-of-lesson question.
///
/// Fetching an item's material successfully is what marks that item completed; quiz
/// answers only affect the score. Every provider round-trip is split into a `begin_*`
/// and a `complete_*` step tagged with a generation counter so that results arriving
/// after the learner moved on are discarded.
pub struct LessonRunner {
    lesson: LessonDescriptor,
    store: Arc<ProgressStore>,
    provider: Arc<dyn ContentProvider>,
    state: RunnerState,
    generation: u64,
    content: Option<GeneratedContent>,
    quiz: Option<QuizQuestion>,
    answer: Option<AnswerOutcome>,
    error: Option<String>,
    progress: Option<LessonProgress>,
    exit: Option<Navigation>,
}

impl LessonRunner {
    /// Enter a lesson.
    ///
    /// A locked lesson yields a runner in `RunnerState::Locked` whose `redirect` is
    /// `Navigation::Home`. Otherwise the runner starts loading at the stored cursor, or
    /// at the first item when the cursor no longer fits the lesson.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::UnknownLesson` if the catalog has no such lesson.
    pub async fn open(
        lesson_id: &str,
        store: Arc<ProgressStore>,
        provider: Arc<dyn ContentProvider>,
    ) -> Result<Self, RunnerError> {
        let lesson = store
            .catalog()
            .get(lesson_id)
            .cloned()
            .ok_or_else(|| RunnerError::UnknownLesson {
                id: lesson_id.to_owned(),
            })?;
        let progress = store.load().await.get(lesson_id).cloned();

        let mut runner = Self {
            lesson,
            store,
            provider,
            state: RunnerState::Locked,
            generation: 0,
            content: None,
            quiz: None,
            answer: None,
            error: None,
            progress: None,
            exit: None,
        };

        match progress {
            Some(progress) if progress.unlocked() => {
                let index = initial_index(progress.last_item_index(), runner.lesson.item_count());
                runner.progress = Some(progress);
                runner.enter_loading(index);
            }
            _ => {
                warn!(lesson_id, "lesson is locked; redirecting home");
                runner.exit = Some(Navigation::Home);
            }
        }
        Ok(runner)
    }

    #[must_use]
    pub fn lesson(&self) -> &LessonDescriptor {
        &self.lesson
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        self.lesson.id()
    }

    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Index of the item on screen; the last item while in the activity.
    #[must_use]
    pub fn index(&self) -> usize {
        self.state
            .item_index()
            .unwrap_or_else(|| self.lesson.last_index())
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&str> {
        self.state.item_index().and_then(|i| self.lesson.item(i))
    }

    #[must_use]
    pub fn content(&self) -> Option<&GeneratedContent> {
        self.content.as_ref()
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&QuizQuestion> {
        self.quiz.as_ref()
    }

    #[must_use]
    pub fn answer(&self) -> Option<&AnswerOutcome> {
        self.answer.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// This session's copy of the lesson's progress, refreshed after every write.
    #[must_use]
    pub fn progress(&self) -> Option<&LessonProgress> {
        self.progress.as_ref()
    }

    /// Set once the runner is `Locked` or `Done`.
    #[must_use]
    pub fn redirect(&self) -> Option<&Navigation> {
        self.exit.as_ref()
    }

    #[must_use]
    pub fn provider(&self) -> Arc<dyn ContentProvider> {
        Arc::clone(&self.provider)
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        matches!(self.state, RunnerState::Ready(i) | RunnerState::Error(i) if i > 0)
    }

    /// Start fetching material for the item being loaded.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::InvalidState` unless the runner is loading an item, and
    /// `RunnerError::ItemIndexOutOfRange` if the index does not fit the lesson.
    pub fn begin_item_fetch(&self) -> Result<ItemFetch, RunnerError> {
        let RunnerState::Loading(index) = self.state else {
            return Err(RunnerError::InvalidState);
        };
        let item_key = self
            .lesson
            .item(index)
            .ok_or(RunnerError::ItemIndexOutOfRange {
                index,
                len: self.lesson.item_count(),
            })?;

        Ok(ItemFetch {
            index,
            item_key: item_key.to_owned(),
            prompt: self.lesson.material_prompt(item_key),
            generation: self.generation,
        })
    }

    /// Apply the provider's answer for `fetch`. Returns `false` if the fetch was superseded.
    ///
    /// On success the item is recorded as completed and the runner becomes `Ready`; on
    /// `None` it becomes `Error` without touching progress.
    pub async fn complete_item_fetch(
        &mut self,
        fetch: ItemFetch,
        result: Option<GeneratedContent>,
    ) -> bool {
        if fetch.generation != self.generation || self.state != RunnerState::Loading(fetch.index)
        {
            debug!(lesson_id = %self.lesson.id(), index = fetch.index, "discarding superseded item fetch");
            return false;
        }

        match result {
            Some(mut content) => {
                content.item_key.clone_from(&fetch.item_key);
                let progress = self
                    .store
                    .record_item_completion(self.lesson.id().as_str(), &fetch.item_key, fetch.index)
                    .await;
                self.progress = progress.get(self.lesson.id().as_str()).cloned();
                self.content = Some(content);
                self.error = None;
                self.state = RunnerState::Ready(fetch.index);
                debug!(lesson_id = %self.lesson.id(), index = fetch.index, "item ready");
            }
            None => {
                self.content = None;
                self.error = Some(ITEM_ERROR.to_owned());
                self.state = RunnerState::Error(fetch.index);
                debug!(lesson_id = %self.lesson.id(), index = fetch.index, "item failed");
            }
        }
        true
    }

    /// Fetch and apply material for the item being loaded.
    ///
    /// # Errors
    ///
    /// See `begin_item_fetch`.
    pub async fn load_current(&mut self) -> Result<(), RunnerError> {
        let fetch = self.begin_item_fetch()?;
        let result = fetch.run(self.provider.as_ref()).await;
        self.complete_item_fetch(fetch, result).await;
        Ok(())
    }

    /// Re-request the item that failed.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::InvalidState` unless the runner is in `Error`.
    pub fn retry(&mut self) -> Result<usize, RunnerError> {
        let RunnerState::Error(index) = self.state else {
            return Err(RunnerError::InvalidState);
        };
        self.enter_loading(index);
        Ok(index)
    }

    /// Move past the ready item: to the next item, into the activity after the last item,
    /// or out of a lesson without an activity.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::InvalidState` unless the runner is `Ready`.
    pub async fn next(&mut self) -> Result<Advance, RunnerError> {
        let RunnerState::Ready(index) = self.state else {
            return Err(RunnerError::InvalidState);
        };

        if index < self.lesson.last_index() {
            self.enter_loading(index + 1);
            return Ok(Advance::Item(index + 1));
        }
        if self.lesson.has_activity() {
            self.generation += 1;
            self.quiz = None;
            self.answer = None;
            self.state = RunnerState::Activity(ActivityPhase::Loading);
            debug!(lesson_id = %self.lesson.id(), "entering activity");
            return Ok(Advance::Activity);
        }
        Ok(Advance::Finished(self.finish().await))
    }

    /// Step back one item.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::InvalidState` on the first item or while loading.
    pub fn previous(&mut self) -> Result<usize, RunnerError> {
        match self.state {
            RunnerState::Ready(index) | RunnerState::Error(index) if index > 0 => {
                self.enter_loading(index - 1);
                Ok(index - 1)
            }
            _ => Err(RunnerError::InvalidState),
        }
    }

    /// Start fetching the activity question, built from the last item's material.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::InvalidState` unless the activity is loading.
    pub fn begin_quiz_fetch(&self) -> Result<QuizFetch, RunnerError> {
        if self.state != RunnerState::Activity(ActivityPhase::Loading) {
            return Err(RunnerError::InvalidState);
        }
        let taught = self.content.as_ref().ok_or(RunnerError::InvalidState)?;
        let prompt = self
            .lesson
            .activity_prompt(&taught.item_key, taught)
            .ok_or(RunnerError::InvalidState)?;
        Ok(QuizFetch {
            prompt,
            generation: self.generation,
        })
    }

    /// Apply the provider's question. `None` installs a single-option stand-in so the
    /// activity can still be closed. Returns `false` if the fetch was superseded.
    pub fn complete_quiz_fetch(&mut self, fetch: QuizFetch, result: Option<QuizQuestion>) -> bool {
        if fetch.generation != self.generation
            || self.state != RunnerState::Activity(ActivityPhase::Loading)
        {
            debug!(lesson_id = %self.lesson.id(), "discarding superseded quiz fetch");
            return false;
        }

        match result {
            Some(quiz) => {
                self.quiz = Some(quiz);
                self.state = RunnerState::Activity(ActivityPhase::Ready);
            }
            None => {
                self.quiz = Some(QuizQuestion::closed(
                    QUIZ_ERROR_QUESTION,
                    QUIZ_ERROR_EXPLANATION,
                ));
                self.state = RunnerState::Activity(ActivityPhase::Error);
            }
        }
        true
    }

    /// Fetch and apply the activity question.
    ///
    /// # Errors
    ///
    /// See `begin_quiz_fetch`.
    pub async fn load_quiz(&mut self) -> Result<(), RunnerError> {
        let fetch = self.begin_quiz_fetch()?;
        let result = fetch.run(self.provider.as_ref()).await;
        self.complete_quiz_fetch(fetch, result);
        Ok(())
    }

    /// Answer the activity question once. A correct answer earns the fixed award and
    /// may unlock the next lesson; a wrong one changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::InvalidState` if no question is shown, it was already
    /// answered, or `option` is not one of its options.
    pub async fn submit_answer(&mut self, option: usize) -> Result<AnswerOutcome, RunnerError> {
        if !matches!(
            self.state,
            RunnerState::Activity(ActivityPhase::Ready | ActivityPhase::Error)
        ) || self.answer.is_some()
        {
            return Err(RunnerError::InvalidState);
        }
        let quiz = self.quiz.as_ref().ok_or(RunnerError::InvalidState)?;
        let correct = quiz.is_correct(option).ok_or(RunnerError::InvalidState)?;
        let explanation = quiz.explanation.clone();

        let points_awarded = if correct {
            let progress = self
                .store
                .award_score_and_maybe_unlock_next(self.lesson.id().as_str(), CORRECT_ANSWER_POINTS)
                .await;
            self.progress = progress.get(self.lesson.id().as_str()).cloned();
            CORRECT_ANSWER_POINTS
        } else {
            0
        };

        let outcome = AnswerOutcome {
            option,
            correct,
            points_awarded,
            explanation,
        };
        self.answer = Some(outcome.clone());
        Ok(outcome)
    }

    /// Close the activity, answered or not, and end the lesson.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::InvalidState` outside the activity.
    pub async fn close_activity(&mut self) -> Result<Navigation, RunnerError> {
        if !matches!(self.state, RunnerState::Activity(_)) {
            return Err(RunnerError::InvalidState);
        }
        Ok(self.finish().await)
    }

    /// Leave the lesson early. Any fetch still in flight will be discarded.
    pub fn abandon(&mut self) -> Navigation {
        self.generation += 1;
        if !self.state.is_terminal() {
            self.state = RunnerState::Done;
        }
        self.exit.get_or_insert(Navigation::Home).clone()
    }

    fn enter_loading(&mut self, index: usize) {
        self.generation += 1;
        self.error = None;
        self.state = RunnerState::Loading(index);
        debug!(lesson_id = %self.lesson.id(), index, "loading item");
    }

    async fn finish(&mut self) -> Navigation {
        self.generation += 1;
        let destination = next_destination(&self.store, self.lesson.id().as_str()).await;
        self.state = RunnerState::Done;
        self.exit = Some(destination.clone());
        destination
    }
}
