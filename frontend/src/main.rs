#![allow(non_snake_case)]
use common::{dispatch, Action, View, Widget, WidgetCell};
use dioxus::prelude::*;
use dom::{browser_client, read_config, TaskTicker, WidgetSignal};
use log::info;
use panel::ChallengePanel;

mod dom;
mod panel;

static CSS: Asset = asset!("/assets/main.css");

#[derive(Clone, Copy)]
struct AppContext {
    widget: WidgetSignal,
}

impl AppContext {
    /// Reads the widget and subscribes the calling component to changes.
    fn view(&self) -> View {
        self.widget.0.read().render()
    }

    fn public_owner(&self) -> String {
        self.widget.0.read().config().public_owner.clone()
    }

    /// Runs `action` in the background. The widget is only borrowed between
    /// requests, never while one is in flight.
    fn run(&self, action: Action) {
        let widget = self.widget;
        spawn(async move {
            let config = widget.0.peek().config().clone();
            match browser_client(&config) {
                Ok(client) => dispatch(action, &widget, &client, &widget).await,
                Err(err) => widget.update(|w| w.fail(&err)),
            }
        });
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    launch(App);
}

#[component]
fn App() -> Element {
    let widget = use_signal(|| Widget::<TaskTicker>::new(read_config()));
    let app_ctx = use_context_provider(|| AppContext {
        widget: WidgetSignal(widget),
    });

    // The server is the only source of truth, so always ask on load.
    use_effect(move || {
        info!("loading challenge instance status");
        app_ctx.run(Action::Refresh);
    });

    rsx! {
        document::Stylesheet { href: CSS }
        div {
            class: "chall",
            ChallengePanel {}
        }
    }
}
