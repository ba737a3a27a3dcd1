use crate::AppContext;
use common::{ids, LiveView, StatusView};
use dioxus::prelude::*;

#[component]
pub fn ChallengePanel() -> Element {
    let app_ctx = use_context::<AppContext>();
    let view = app_ctx.view();

    let status = match view.status {
        StatusView::Loading => rsx! {
            p { class: "chall-loading", "Checking for a running instance..." }
        },
        StatusView::None => rsx! {
            p { "No instance is running." }
        },
        StatusView::Live(live) => {
            let shared = live.owner == app_ctx.public_owner();
            rsx! { LiveStatus { live, shared } }
        }
    };

    let buttons = view.actions.into_iter().map(move |button| {
        let action = button.action;
        rsx! {
            button {
                key: "{action:?}",
                id: action.element_id(),
                class: "control-button",
                disabled: button.disabled,
                onclick: move |_| app_ctx.run(action),
                "{button.label}"
            }
        }
    });

    rsx! {
        div {
            id: ids::STATUS,
            class: "chall-status",
            {status}
        }
        div {
            class: "chall-actions",
            {buttons}
        }
        p { id: ids::ERROR, class: "error", "{view.error}" }
    }
}

#[component]
fn LiveStatus(live: LiveView, shared: bool) -> Element {
    rsx! {
        if shared {
            p { class: "chall-shared", "This instance is shared by everyone." }
        }
        p { "Connect with:" }
        ul {
            id: ids::ENDPOINTS,
            for connection in live.endpoints.iter() {
                li { code { "{connection}" } }
            }
        }
        p {
            "Expires: "
            span { id: ids::EXPIRY, "{live.expiry}" }
        }
    }
}
