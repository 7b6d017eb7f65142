//! Dialog engine: owns the session and turns events into effects.
//!
//! `handle` runs one event to completion and returns its effects in order.
//! It performs no I/O: collaborator calls leave as [`Effect::Call`] and their
//! outcomes come back as completion events.

use tracing::debug;

use crate::backend::{LeadSnapshot, SaveReceipt, UploadReceipt};
use crate::config::DialogConfig;
use crate::error::BackendError;
use crate::uploads::CvFile;

use super::effect::{Call, Effect};
use super::event::{CallId, Choice, Event, OfferId, OptionSet};
use super::prompts;
use super::session::{
    Budget, BudgetBucket, Category, EmployeeSize, LeadPath, SessionRecord, StartTime, Step,
};
use super::validate;

/// Collaborator call currently outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCall {
    Upload,
    Summarize,
    Save,
}

/// Single-session conversation driver.
pub struct Engine {
    config: DialogConfig,
    session: SessionRecord,
    started: bool,
    active_offer: Option<OptionSet>,
    next_offer: u64,
    next_call: u64,
    pending: Option<(CallId, PendingCall)>,
}

impl Engine {
    pub fn new(config: DialogConfig) -> Self {
        Self {
            config,
            session: SessionRecord::create(),
            started: false,
            active_offer: None,
            next_offer: 1,
            next_call: 1,
            pending: None,
        }
    }

    pub fn session(&self) -> &SessionRecord {
        &self.session
    }

    /// The option set currently accepting a selection, if any.
    pub fn active_offer(&self) -> Option<&OptionSet> {
        self.active_offer.as_ref()
    }

    pub fn pending(&self) -> Option<PendingCall> {
        self.pending.map(|(_, kind)| kind)
    }

    /// Id of the outstanding call, if any.
    pub fn pending_id(&self) -> Option<CallId> {
        self.pending.map(|(id, _)| id)
    }

    /// Whether a CV file would be accepted right now.
    pub fn awaiting_upload(&self) -> bool {
        self.session.step == Step::AwaitCvUpload
            && self.pending.is_none()
            && !self.session.closing_sent
    }

    /// Process one event to completion.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let mut out = Vec::new();
        match event {
            Event::Restart => self.restart(&mut out),
            _ if self.session.closing_sent => {
                debug!("Conversation closed, ignoring event until restart");
            }
            Event::Start => self.start(&mut out),
            Event::FreeText(text) => self.on_text(&text, &mut out),
            Event::Selection { offer, choice } => self.on_selection(offer, choice, &mut out),
            Event::UploadSubmitted(file) => self.on_upload_submitted(file, &mut out),
            Event::UploadFinished(id, result) => self.on_upload_finished(id, result, &mut out),
            Event::SummaryFinished(id, result) => self.on_summary_finished(id, result, &mut out),
            Event::SaveFinished(id, result) => self.on_save_finished(id, result, &mut out),
        }
        out
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    fn start(&mut self, out: &mut Vec<Effect>) {
        if self.started {
            return;
        }
        self.started = true;
        out.push(Effect::say(prompts::OPENING));
    }

    fn restart(&mut self, out: &mut Vec<Effect>) {
        debug!(step = %self.session.step, "Restarting conversation");
        self.session = SessionRecord::create();
        self.started = true;
        self.active_offer = None;
        self.pending = None;
        out.push(Effect::InputEnabled(true));
        out.push(Effect::say(prompts::OPENING));
    }

    // ── Free text ───────────────────────────────────────────────────

    fn on_text(&mut self, raw: &str, out: &mut Vec<Effect>) {
        let text = raw.trim();
        if text.is_empty() {
            return;
        }
        if !self.started {
            self.start(out);
            return;
        }
        if self.pending.is_some() {
            debug!("Call in flight, ignoring free text");
            return;
        }
        if self.intercept_closing(text, out) {
            return;
        }
        if !self.session.step.accepts_text() {
            debug!(step = %self.session.step, "No free text expected, ignoring");
            return;
        }

        match self.session.step {
            Step::AwaitName => {
                self.session.name = Some(text.to_string());
                self.session.step = Step::AwaitCompany;
                out.push(Effect::say(prompts::greeting(text)));
            }
            Step::AwaitCompany => {
                self.session.company_name = Some(text.to_string());
                self.session.step = Step::AwaitPhone;
                out.push(Effect::say(prompts::ASK_PHONE));
            }
            Step::AwaitPhone => {
                if !validate::is_valid_phone(text) {
                    out.push(Effect::warn(prompts::INVALID_PHONE));
                    return;
                }
                self.session.phone = Some(text.to_string());
                self.session.step = Step::AwaitEmail;
                out.push(Effect::say(prompts::ASK_EMAIL));
            }
            Step::AwaitEmail => {
                if !validate::is_valid_email(text) {
                    out.push(Effect::warn(prompts::INVALID_EMAIL));
                    return;
                }
                self.session.email = Some(text.to_string());
                self.session.step = Step::ChoosePath;
                out.push(Effect::Pause(self.config.fork_delay));
                out.push(Effect::say(prompts::ASK_PATH));
                self.offer(vec![Choice::Job, Choice::Product], out);
            }
            Step::AwaitRequirementText => {
                self.session.requirement_text = Some(text.to_string());
                self.offer_employee_size(out);
            }
            Step::AwaitCustomBudgetAmount => match validate::parse_budget_amount(text) {
                Some(amount) => {
                    self.session.budget = Some(Budget::Custom { amount });
                    self.offer_start_time(out);
                }
                None => out.push(Effect::warn(prompts::INVALID_BUDGET)),
            },
            _ => {}
        }
    }

    /// Closing guard, checked before step dispatch. Returns true when it fired.
    fn intercept_closing(&mut self, text: &str, out: &mut Vec<Effect>) -> bool {
        if !self.session.closing_ready || self.session.closing_sent {
            return false;
        }
        if !validate::is_closing_utterance(text) {
            return false;
        }
        out.push(Effect::say(prompts::farewell(
            self.session.name.as_deref(),
            self.session.company_name.as_deref(),
            &self.config.contact,
        )));
        self.session.closing_sent = true;
        self.active_offer = None;
        out.push(Effect::InputEnabled(false));
        true
    }

    // ── Selections ──────────────────────────────────────────────────

    fn offer(&mut self, options: Vec<Choice>, out: &mut Vec<Effect>) {
        let set = OptionSet {
            id: OfferId(self.next_offer),
            options,
        };
        self.next_offer += 1;
        self.active_offer = Some(set.clone());
        out.push(Effect::Offer(set));
    }

    fn on_selection(&mut self, offer: OfferId, choice: Choice, out: &mut Vec<Effect>) {
        if self.pending.is_some() {
            debug!(%offer, "Call in flight, ignoring selection");
            return;
        }
        match &self.active_offer {
            Some(active) if active.id == offer && active.contains(&choice) => {}
            _ => {
                debug!(%offer, ?choice, "Selection from an inactive option set, ignoring");
                return;
            }
        }
        self.active_offer = None;

        match (self.session.step, choice) {
            (Step::ChoosePath, Choice::Job) => {
                self.session.path = LeadPath::Job;
                self.session.step = Step::AwaitCvUpload;
                out.push(Effect::say(prompts::ASK_CV));
                out.push(Effect::RequestUpload);
            }
            (Step::ChoosePath, Choice::Product) => {
                self.session.path = LeadPath::Product;
                self.session.step = Step::ChooseCategory;
                out.push(Effect::say(prompts::ASK_CATEGORY));
                let options = Category::ALL.into_iter().map(Choice::Category).collect();
                self.offer(options, out);
            }
            (Step::ChooseCategory, Choice::Category(category)) => {
                self.session.category = Some(category);
                self.session.step = Step::ChooseRequirements;
                out.push(Effect::say(prompts::ASK_REQUIREMENTS));
                self.offer(
                    vec![Choice::Requirements(true), Choice::Requirements(false)],
                    out,
                );
            }
            (Step::ChooseRequirements, Choice::Requirements(true)) => {
                self.session.has_requirements = Some(true);
                self.session.step = Step::AwaitRequirementText;
                out.push(Effect::say(prompts::ASK_REQUIREMENT_TEXT));
            }
            (Step::ChooseRequirements, Choice::Requirements(false)) => {
                self.session.has_requirements = Some(false);
                self.offer_employee_size(out);
            }
            (Step::ChooseEmployeeSize, Choice::EmployeeSize(size)) => {
                self.session.employee_size = Some(size);
                if self.session.category.is_some_and(|c| c.needs_budget()) {
                    self.session.step = Step::ChooseBudget;
                    out.push(Effect::say(prompts::ASK_BUDGET));
                    let mut options: Vec<Choice> =
                        BudgetBucket::ALL.into_iter().map(Choice::Budget).collect();
                    options.push(Choice::CustomBudget);
                    self.offer(options, out);
                } else {
                    self.offer_start_time(out);
                }
            }
            (Step::ChooseBudget, Choice::Budget(bucket)) => {
                self.session.budget = Some(Budget::Bucket(bucket));
                self.offer_start_time(out);
            }
            (Step::ChooseBudget, Choice::CustomBudget) => {
                self.session.step = Step::AwaitCustomBudgetAmount;
                out.push(Effect::say(prompts::ASK_CUSTOM_BUDGET));
            }
            (Step::ChooseStartTime, Choice::StartTime(start)) => {
                self.session.start_time = Some(start);
                let call = Call::Summarize {
                    snapshot: self.snapshot(),
                };
                self.begin_call(PendingCall::Summarize, prompts::PREPARING_SUMMARY, call, out);
            }
            (Step::Declaration, Choice::Agree) => {
                let call = Call::Save {
                    snapshot: self.snapshot(),
                };
                self.begin_call(PendingCall::Save, prompts::SAVING, call, out);
            }
            (Step::Declaration, Choice::Edit) => self.restart(out),
            (step, choice) => {
                debug!(%step, ?choice, "Choice does not apply to this step, ignoring");
            }
        }
    }

    fn offer_employee_size(&mut self, out: &mut Vec<Effect>) {
        self.session.step = Step::ChooseEmployeeSize;
        out.push(Effect::say(prompts::ASK_EMPLOYEE_SIZE));
        let options = EmployeeSize::ALL
            .into_iter()
            .map(Choice::EmployeeSize)
            .collect();
        self.offer(options, out);
    }

    fn offer_start_time(&mut self, out: &mut Vec<Effect>) {
        self.session.step = Step::ChooseStartTime;
        out.push(Effect::say(prompts::ASK_START_TIME));
        let options = StartTime::ALL.into_iter().map(Choice::StartTime).collect();
        self.offer(options, out);
    }

    fn offer_declaration(&mut self, out: &mut Vec<Effect>) {
        self.session.step = Step::Declaration;
        out.push(Effect::say(prompts::ASK_DECLARATION));
        self.offer(vec![Choice::Agree, Choice::Edit], out);
    }

    // ── Collaborator calls ──────────────────────────────────────────

    fn snapshot(&self) -> LeadSnapshot {
        LeadSnapshot::from(&self.session)
    }

    /// Mark a call outstanding and emit it last, after the busy notice.
    fn begin_call(&mut self, kind: PendingCall, notice: &str, call: Call, out: &mut Vec<Effect>) {
        let id = CallId(self.next_call);
        self.next_call += 1;
        self.pending = Some((id, kind));
        out.push(Effect::InputEnabled(false));
        out.push(Effect::say(notice));
        out.push(Effect::Call(id, call));
    }

    /// Clear the pending marker if it matches; stale completions are dropped.
    fn finish_call(&mut self, id: CallId, kind: PendingCall) -> bool {
        if self.pending != Some((id, kind)) {
            debug!(%id, ?kind, pending = ?self.pending, "Unexpected call completion, ignoring");
            return false;
        }
        self.pending = None;
        true
    }

    fn on_upload_submitted(&mut self, file: CvFile, out: &mut Vec<Effect>) {
        if !self.awaiting_upload() {
            debug!(file = %file.filename, "Upload not expected, ignoring");
            return;
        }
        if let Err(e) = file.validate() {
            out.push(Effect::warn(e.to_string()));
            out.push(Effect::RequestUpload);
            return;
        }
        let call = Call::Upload {
            file,
            snapshot: self.snapshot(),
        };
        self.begin_call(PendingCall::Upload, prompts::UPLOADING, call, out);
    }

    fn on_upload_finished(
        &mut self,
        id: CallId,
        result: Result<UploadReceipt, BackendError>,
        out: &mut Vec<Effect>,
    ) {
        if !self.finish_call(id, PendingCall::Upload) {
            return;
        }
        match result {
            Ok(receipt) => {
                out.push(Effect::say(prompts::upload_succeeded(&receipt.filename)));
                if let Some(status) =
                    prompts::upload_email_status(receipt.email_sent, receipt.email_error.as_deref())
                {
                    out.push(Effect::say(status));
                }
                out.push(Effect::say(prompts::APPLICATION_THANKS));
                self.session.cv_filename = Some(receipt.filename);
                self.session.step = Step::Closing;
                self.session.closing_ready = true;
                out.push(Effect::InputEnabled(true));
            }
            Err(e) => {
                out.push(Effect::error(prompts::upload_failed(&e.to_string())));
                out.push(Effect::InputEnabled(true));
                out.push(Effect::RequestUpload);
            }
        }
    }

    fn on_summary_finished(
        &mut self,
        id: CallId,
        result: Result<String, BackendError>,
        out: &mut Vec<Effect>,
    ) {
        if !self.finish_call(id, PendingCall::Summarize) {
            return;
        }
        match result {
            Ok(summary) => {
                out.push(Effect::markup(summary));
                out.push(Effect::InputEnabled(true));
                self.offer_declaration(out);
            }
            Err(e) => {
                debug!(error = %e, "Summary failed");
                out.push(Effect::error(prompts::SUMMARY_FAILED));
                out.push(Effect::InputEnabled(true));
                let options = StartTime::ALL.into_iter().map(Choice::StartTime).collect();
                self.offer(options, out);
            }
        }
    }

    fn on_save_finished(
        &mut self,
        id: CallId,
        result: Result<SaveReceipt, BackendError>,
        out: &mut Vec<Effect>,
    ) {
        if !self.finish_call(id, PendingCall::Save) {
            return;
        }
        match result {
            Ok(receipt) => {
                out.push(Effect::say(prompts::saved(receipt.email_sent)));
                self.session.step = Step::Closing;
                self.session.closing_ready = true;
                out.push(Effect::InputEnabled(true));
            }
            Err(e) => {
                out.push(Effect::error(prompts::save_failed(&e.to_string())));
                out.push(Effect::InputEnabled(true));
                self.offer(vec![Choice::Agree, Choice::Edit], out);
            }
        }
    }
}
