//! Inline comment creation form.
//!
//! A two-field controlled form with an explicit phase machine:
//! empty -> editing on any field change, editing -> submitting only through
//! a validity gate, submitting -> empty on success and back to editing
//! (fields intact) on failure.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Empty,
    Editing,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Content,
    AuthorEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Cancel,
    Submit,
}

/// Trimmed field values handed to the store on submit.
#[derive(Debug, Clone)]
pub struct FormInput {
    pub content: String,
    pub author_email: String,
}

#[derive(Debug, Clone)]
pub struct CommentForm {
    content: String,
    author_email: String,
    active: FormField,
    phase: FormPhase,
}

impl CommentForm {
    /// Fresh form, with the author email prefilled from configuration.
    pub fn new(author_email: &str) -> Self {
        let author_email = author_email.trim().to_string();
        let phase = if author_email.is_empty() {
            FormPhase::Empty
        } else {
            FormPhase::Editing
        };
        Self {
            content: String::new(),
            author_email,
            active: FormField::Content,
            phase,
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author_email(&self) -> &str {
        &self.author_email
    }

    pub fn active_field(&self) -> FormField {
        self.active
    }

    /// Submit is enabled only when both trimmed fields are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.content.trim().is_empty() && !self.author_email.trim().is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        // No edits or transitions while a submission is in flight.
        if self.is_submitting() {
            return FormAction::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
            self.active_value_mut().clear();
            self.refresh_phase();
            return FormAction::None;
        }

        match key.code {
            KeyCode::Esc => FormAction::Cancel,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.active = match self.active {
                    FormField::Content => FormField::AuthorEmail,
                    FormField::AuthorEmail => FormField::Content,
                };
                FormAction::None
            }
            KeyCode::Enter => {
                if self.is_valid() {
                    FormAction::Submit
                } else {
                    FormAction::None
                }
            }
            KeyCode::Backspace => {
                self.active_value_mut().pop();
                self.refresh_phase();
                FormAction::None
            }
            KeyCode::Char(ch) => {
                self.active_value_mut().push(ch);
                self.phase = FormPhase::Editing;
                FormAction::None
            }
            _ => FormAction::None,
        }
    }

    /// Gate into the submitting phase. Returns the trimmed input, or `None`
    /// when the validity predicate fails or a submission is already in
    /// flight.
    pub fn begin_submit(&mut self) -> Option<FormInput> {
        if self.is_submitting() || !self.is_valid() {
            return None;
        }
        self.phase = FormPhase::Submitting;
        Some(FormInput {
            content: self.content.trim().to_string(),
            author_email: self.author_email.trim().to_string(),
        })
    }

    /// Mutation succeeded: clear the fields.
    pub fn submit_succeeded(&mut self) {
        self.content.clear();
        self.author_email.clear();
        self.active = FormField::Content;
        self.phase = FormPhase::Empty;
    }

    /// Mutation failed: keep the fields so the user can resubmit.
    pub fn submit_failed(&mut self) {
        self.phase = FormPhase::Editing;
    }

    /// Discard field contents. Refused while submitting.
    pub fn cancel(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.content.clear();
        self.author_email.clear();
        self.active = FormField::Content;
        self.phase = FormPhase::Empty;
        true
    }

    fn active_value_mut(&mut self) -> &mut String {
        match self.active {
            FormField::Content => &mut self.content,
            FormField::AuthorEmail => &mut self.author_email,
        }
    }

    fn refresh_phase(&mut self) {
        self.phase = if self.content.is_empty() && self.author_email.is_empty() {
            FormPhase::Empty
        } else {
            FormPhase::Editing
        };
    }
}
