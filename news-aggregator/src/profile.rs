use crate::profile_api::ProfileBackend;
use crate::types::{AggregatorError, InterestPoint, ProfileUpdate, SurveyQuestion, User};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info};

pub const SURVEY_COOLDOWN_HOURS: i64 = 12;

pub const PASSWORD_MISMATCH: &str = "Passwords do not match!";
pub const SURVEY_SUBMIT_FAILED: &str = "Failed to submit survey";
pub const SURVEY_RESPONSE_FAILED: &str = "Failed to submit survey response";
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile";
pub const INTEREST_DATA_FAILED: &str = "Failed to load interest data";

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("{}", PASSWORD_MISMATCH)]
    PasswordMismatch,

    #[error("rating must be between 1 and 5, got {rating}")]
    InvalidRating { rating: u8 },

    #[error("unknown survey question: {id}")]
    UnknownQuestion { id: String },

    #[error("survey already submitted, next one opens at {next_eligible}")]
    SurveyCoolingDown { next_eligible: DateTime<Utc> },

    #[error("profile is not being edited")]
    NotEditing,

    #[error(transparent)]
    Backend(#[from] AggregatorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyState {
    Answering,
    Submitted { next_eligible: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub hours: i64,
    pub minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Viewing,
    Editing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub username: String,
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
    pub preferences: Vec<String>,
}

impl EditForm {
    fn for_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            preferences: user.preferences.clone(),
            ..Self::default()
        }
    }

    fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            username: self.username.clone(),
            old_password: self.old_password.clone(),
            new_password: (!self.new_password.is_empty()).then(|| self.new_password.clone()),
            preferences: self.preferences.clone(),
        }
    }
}

/// Profile page state: survey with cooldown, profile edit form, summary toggles
/// and interest-trend data.
pub struct ProfilePanel {
    backend: Arc<dyn ProfileBackend>,
    user: User,
    original_questions: Vec<SurveyQuestion>,
    questions: Vec<SurveyQuestion>,
    survey: SurveyState,
    countdown: Option<Countdown>,
    edit_mode: EditMode,
    form: EditForm,
    show_today_summary: bool,
    show_week_summary: bool,
    interest_data: Vec<InterestPoint>,
    loading: bool,
    error: Option<String>,
}

impl ProfilePanel {
    pub fn new(backend: Arc<dyn ProfileBackend>, user: User, questions: Vec<SurveyQuestion>) -> Self {
        Self {
            backend,
            form: EditForm::for_user(&user),
            user,
            original_questions: questions.clone(),
            questions,
            survey: SurveyState::Answering,
            countdown: None,
            edit_mode: EditMode::Viewing,
            show_today_summary: false,
            show_week_summary: false,
            interest_data: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn questions(&self) -> &[SurveyQuestion] {
        &self.questions
    }

    pub fn survey_state(&self) -> SurveyState {
        self.survey
    }

    pub fn countdown(&self) -> Option<Countdown> {
        self.countdown
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    pub fn form(&self) -> &EditForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EditForm {
        &mut self.form
    }

    pub fn interest_data(&self) -> &[InterestPoint] {
        &self.interest_data
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn show_today_summary(&self) -> bool {
        self.show_today_summary
    }

    pub fn show_week_summary(&self) -> bool {
        self.show_week_summary
    }

    pub fn toggle_today_summary(&mut self) -> bool {
        self.show_today_summary = !self.show_today_summary;
        self.show_today_summary
    }

    pub fn toggle_week_summary(&mut self) -> bool {
        self.show_week_summary = !self.show_week_summary;
        self.show_week_summary
    }

    /// Replace the questions, e.g. after the caller reloaded them.
    pub fn reset_questions(&mut self, questions: Vec<SurveyQuestion>) {
        self.original_questions = questions.clone();
        self.questions = questions;
    }

    /// Star pick on one question. Local only.
    pub fn set_rating(&mut self, id: &str, rating: u8) -> Result<(), ProfileError> {
        if !(1..=5).contains(&rating) {
            return Err(ProfileError::InvalidRating { rating });
        }
        let question = self
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| ProfileError::UnknownQuestion { id: id.to_string() })?;
        question.rating = rating;
        Ok(())
    }

    /// Star pick that is sent immediately. A rejected update restores the original questions.
    pub async fn respond(&mut self, id: &str, rating: u8) -> Result<(), ProfileError> {
        self.set_rating(id, rating)?;

        if let Err(e) = self.backend.update_survey_response(id, rating).await {
            error!("Survey response for {} rejected: {}", id, e);
            self.questions = self.original_questions.clone();
            self.error = Some(SURVEY_RESPONSE_FAILED.to_string());
            return Err(e.into());
        }
        Ok(())
    }

    /// Submit every rating. On success the survey locks for twelve hours from `now`.
    pub async fn submit_survey(&mut self, now: DateTime<Utc>) -> Result<DateTime<Utc>, ProfileError> {
        if let SurveyState::Submitted { next_eligible } = self.survey {
            return Err(ProfileError::SurveyCoolingDown { next_eligible });
        }

        if let Err(e) = self.backend.submit_survey(&self.questions).await {
            error!("Survey submission rejected: {}", e);
            self.questions = self.original_questions.clone();
            self.error = Some(SURVEY_SUBMIT_FAILED.to_string());
            return Err(e.into());
        }

        let next_eligible = now + Duration::hours(SURVEY_COOLDOWN_HOURS);
        self.survey = SurveyState::Submitted { next_eligible };
        self.error = None;
        self.tick(now);
        info!("Survey submitted, next one opens at {}", next_eligible);
        Ok(next_eligible)
    }

    /// Once-a-second clock. Reopens the survey once the cooldown has run out.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Countdown> {
        let SurveyState::Submitted { next_eligible } = self.survey else {
            self.countdown = None;
            return None;
        };

        let remaining = next_eligible.signed_duration_since(now);
        if remaining <= Duration::zero() {
            self.survey = SurveyState::Answering;
            self.countdown = None;
            return None;
        }

        let countdown = Countdown {
            hours: remaining.num_hours(),
            minutes: remaining.num_minutes() % 60,
        };
        self.countdown = Some(countdown);
        Some(countdown)
    }

    /// Flip between viewing and editing. Entering edit mode starts from the current user.
    pub fn toggle_edit(&mut self) -> EditMode {
        self.edit_mode = match self.edit_mode {
            EditMode::Viewing => {
                self.form = EditForm::for_user(&self.user);
                EditMode::Editing
            }
            EditMode::Editing => EditMode::Viewing,
        };
        self.edit_mode
    }

    pub fn cancel_edit(&mut self) {
        self.edit_mode = EditMode::Viewing;
    }

    /// Validate and send the edit form. The form stays open on any failure.
    pub async fn submit_edit(&mut self) -> Result<&User, ProfileError> {
        if self.edit_mode != EditMode::Editing {
            return Err(ProfileError::NotEditing);
        }

        if !self.form.new_password.is_empty() && self.form.new_password != self.form.confirm_password {
            self.error = Some(PASSWORD_MISMATCH.to_string());
            return Err(ProfileError::PasswordMismatch);
        }

        let update = self.form.to_update();
        match self.backend.update_profile(&update).await {
            Ok(updated) => {
                info!("Profile updated for {}", updated.email);
                self.user = updated;
                self.edit_mode = EditMode::Viewing;
                self.error = None;
                Ok(&self.user)
            }
            Err(e) => {
                error!("Profile update failed: {}", e);
                self.error = Some(PROFILE_UPDATE_FAILED.to_string());
                Err(e.into())
            }
        }
    }

    pub async fn load_interest_data(&mut self) -> Result<&[InterestPoint], ProfileError> {
        self.loading = true;
        let result = self.backend.interest_data().await;
        self.loading = false;

        match result {
            Ok(points) => {
                self.interest_data = points;
                Ok(&self.interest_data)
            }
            Err(e) => {
                error!("Interest data request failed: {}", e);
                self.error = Some(INTEREST_DATA_FAILED.to_string());
                Err(e.into())
            }
        }
    }
}
