use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info};

use crate::{countdown, ids, ChallengeStatus, Instance, TextSurface, Tick, WidgetConfig, WidgetError};

/// A running repeating timer. Cancelling consumes it.
pub trait TickHandle {
    fn cancel(self);
}

/// Starts the repeating countdown tick. The handle it returns is owned by the
/// widget, which cancels it before every transition.
pub trait Scheduler {
    type Handle: TickHandle;

    fn start(&self, period: Duration) -> Self::Handle;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Delete,
    Refresh,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create => "Create instance",
            Self::Delete => "Delete instance",
            Self::Refresh => "Refresh",
        }
    }

    /// Present participle shown on the button while the action is in flight.
    pub fn verbing(&self) -> &'static str {
        match self {
            Self::Create => "Creating",
            Self::Delete => "Deleting",
            Self::Refresh => "Refreshing",
        }
    }

    pub fn element_id(&self) -> &'static str {
        match self {
            Self::Create | Self::Delete => ids::VERB,
            Self::Refresh => "chall__refresh",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionButton {
    pub action: Action,
    pub label: String,
    pub disabled: bool,
}

impl ActionButton {
    fn idle(action: Action) -> Self {
        Self {
            action,
            label: action.label().to_string(),
            disabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveView {
    pub endpoints: Vec<String>,
    pub owner: String,
    pub expiry: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusView {
    /// Nothing heard from the server yet.
    Loading,
    None,
    Live(LiveView),
}

/// Everything the front end needs to mount, derived from the widget state.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub status: StatusView,
    pub actions: Vec<ActionButton>,
    pub error: String,
}

impl View {
    pub fn button(&self, action: Action) -> Option<&ActionButton> {
        self.actions.iter().find(|button| button.action == action)
    }
}

// Mutable page regions, separate from the status so the countdown can borrow them alone.
#[derive(Debug, Default)]
struct Regions {
    actions: Vec<ActionButton>,
    error: String,
    expiry: Option<String>,
}

impl Regions {
    fn clear(&mut self) {
        self.actions.clear();
        self.expiry = None;
    }
}

impl TextSurface for Regions {
    fn text_mut(&mut self, id: &str) -> Option<&mut String> {
        match id {
            ids::EXPIRY => self.expiry.as_mut(),
            _ => None,
        }
    }
}

/// The challenge instance panel: a projection of the last server answer plus
/// a countdown to the instance's expiry.
#[derive(Debug)]
pub struct Widget<H> {
    config: WidgetConfig,
    status: Option<ChallengeStatus>,
    regions: Regions,
    ticker: Option<H>,
}

impl<H> Widget<H>
where
    H: TickHandle,
{
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            config,
            status: None,
            regions: Regions::default(),
            ticker: None,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// `None` until the first answer from the server.
    pub fn status(&self) -> Option<&ChallengeStatus> {
        self.status.as_ref()
    }

    pub fn is_live(&self) -> bool {
        matches!(self.status, Some(ChallengeStatus::Live(_)))
    }

    pub fn active_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            debug!("cancelling countdown");
            ticker.cancel();
        }
    }

    /// Called when an action starts: clears the error banner and locks the
    /// triggering button.
    pub fn begin(&mut self, action: Action) {
        self.regions.error.clear();
        self.mark_busy(action);
    }

    pub fn mark_busy(&mut self, action: Action) {
        let suffix = &self.config.busy_suffix;
        match self.regions.actions.iter_mut().find(|b| b.action == action) {
            Some(button) => {
                button.label = format!("{}{}", action.verbing(), suffix);
                button.disabled = true;
            }
            None => debug!("no {action:?} button on screen"),
        }
    }

    pub fn show(
        &mut self,
        found: Option<Instance>,
        scheduler: &impl Scheduler<Handle = H>,
        now: DateTime<Utc>,
    ) {
        match found {
            Some(instance) => self.show_live(instance, scheduler, now),
            None => self.show_none(),
        }
    }

    pub fn show_none(&mut self) {
        self.stop();
        self.regions.clear();
        info!("no challenge instance");
        self.status = Some(ChallengeStatus::None);
        self.regions.actions = vec![
            ActionButton::idle(Action::Create),
            ActionButton::idle(Action::Refresh),
        ];
    }

    pub fn show_live(
        &mut self,
        instance: Instance,
        scheduler: &impl Scheduler<Handle = H>,
        now: DateTime<Utc>,
    ) {
        self.stop();
        self.regions.clear();
        info!(
            "challenge instance live until {} with {} endpoint(s)",
            instance.expires_at(),
            instance.endpoints.len()
        );

        if !instance.is_owned_by(&self.config.public_owner) {
            self.regions.actions.push(ActionButton::idle(Action::Delete));
        }
        self.regions.actions.push(ActionButton::idle(Action::Refresh));
        self.regions.expiry = Some(String::new());
        self.status = Some(ChallengeStatus::Live(instance));

        self.ticker = Some(scheduler.start(self.config.tick_period()));
        self.tick(now);
    }

    /// One countdown tick. Moves to the none state once the instance expired.
    /// Returns `None` when there is no live instance to count down.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Tick> {
        let target = match &self.status {
            Some(ChallengeStatus::Live(instance)) => instance.expires_at(),
            _ => return None,
        };

        let mut expired = false;
        let tick = countdown(
            &mut self.regions,
            ids::EXPIRY,
            target,
            now,
            &self.config.countdown,
            || expired = true,
        );
        if expired {
            info!("challenge instance expired");
            self.show_none();
        }
        Some(tick)
    }

    /// Shows the generic error banner. State is kept; buttons of the current
    /// state become clickable again. Before any answer from the server there
    /// are no buttons yet, so a refresh is offered.
    pub fn fail(&mut self, err: &WidgetError) {
        error!("challenge request failed: {err}");
        self.regions.error = self.config.error_message.clone();
        for button in self.regions.actions.iter_mut() {
            *button = ActionButton::idle(button.action);
        }
        if self.status.is_none() && self.regions.actions.is_empty() {
            self.regions.actions.push(ActionButton::idle(Action::Refresh));
        }
    }

    pub fn render(&self) -> View {
        let status = match &self.status {
            None => StatusView::Loading,
            Some(ChallengeStatus::None) => StatusView::None,
            Some(ChallengeStatus::Live(instance)) => StatusView::Live(LiveView {
                endpoints: instance
                    .endpoints
                    .iter()
                    .map(|endpoint| endpoint.connection.clone())
                    .collect(),
                owner: instance.owner.clone(),
                expiry: self.regions.expiry.clone().unwrap_or_default(),
            }),
        };
        View {
            status,
            actions: self.regions.actions.clone(),
            error: self.regions.error.clone(),
        }
    }
}
