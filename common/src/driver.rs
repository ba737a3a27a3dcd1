//! The three challenge operations, run against a widget that lives behind some
//! shared cell. The cell is only borrowed for synchronous updates, never
//! across a request.

use std::cell::RefCell;

use chrono::Utc;
use log::warn;

use crate::{Action, ChallengeClient, CredentialProvider, Scheduler, TickHandle, Transport, Widget};

/// Shared, exclusive access to a widget.
pub trait WidgetCell {
    type Handle: TickHandle;

    fn update<R>(&self, f: impl FnOnce(&mut Widget<Self::Handle>) -> R) -> R;
}

impl<H> WidgetCell for RefCell<Widget<H>>
where
    H: TickHandle,
{
    type Handle = H;

    fn update<R>(&self, f: impl FnOnce(&mut Widget<H>) -> R) -> R {
        f(&mut *self.borrow_mut())
    }
}

/// Asks the server for the current instance and shows whatever it reports.
pub async fn fetch_status<W, T, C, S>(widget: &W, client: &ChallengeClient<T, C>, scheduler: &S)
where
    W: WidgetCell,
    T: Transport,
    C: CredentialProvider,
    S: Scheduler<Handle = W::Handle>,
{
    widget.update(|w| w.begin(Action::Refresh));
    match client.status().await {
        Ok(found) => widget.update(|w| w.show(found, scheduler, Utc::now())),
        Err(err) => widget.update(|w| w.fail(&err)),
    }
}

/// Requests a new instance. An empty answer (quota, already running) falls
/// back to a status refresh.
pub async fn create<W, T, C, S>(widget: &W, client: &ChallengeClient<T, C>, scheduler: &S)
where
    W: WidgetCell,
    T: Transport,
    C: CredentialProvider,
    S: Scheduler<Handle = W::Handle>,
{
    widget.update(|w| w.begin(Action::Create));
    match client.create().await {
        Ok(Some(instance)) => widget.update(|w| w.show_live(instance, scheduler, Utc::now())),
        Ok(None) => {
            warn!("server did not create an instance, refreshing status");
            fetch_status(widget, client, scheduler).await;
        }
        Err(err) => widget.update(|w| w.fail(&err)),
    }
}

pub async fn delete<W, T, C>(widget: &W, client: &ChallengeClient<T, C>)
where
    W: WidgetCell,
    T: Transport,
    C: CredentialProvider,
{
    widget.update(|w| w.begin(Action::Delete));
    match client.delete().await {
        Ok(()) => widget.update(|w| w.show_none()),
        Err(err) => widget.update(|w| w.fail(&err)),
    }
}

pub async fn dispatch<W, T, C, S>(
    action: Action,
    widget: &W,
    client: &ChallengeClient<T, C>,
    scheduler: &S,
) where
    W: WidgetCell,
    T: Transport,
    C: CredentialProvider,
    S: Scheduler<Handle = W::Handle>,
{
    match action {
        Action::Create => create(widget, client, scheduler).await,
        Action::Delete => delete(widget, client).await,
        Action::Refresh => fetch_status(widget, client, scheduler).await,
    }
}
