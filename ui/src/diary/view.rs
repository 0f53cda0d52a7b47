use std::cell::RefCell;
use std::rc::Rc;

use dioxus::html::point_interaction::InteractionLocation;
use dioxus::logger::tracing::{debug, info};
use dioxus::prelude::*;
use futures_channel::mpsc::UnboundedSender;
use futures_util::StreamExt;

use crate::core::config::DiaryConfig;
use crate::core::platform::{self, Platform};
use crate::core::timing;
use crate::t;

use super::content::PageContent;
use super::engine::{DiaryEngine, Direction, Face, Layout, NavOutcome};
use super::input::{intent_for_key, Intent, SwipeTracker, TapZone};

type SenderSlot = Rc<RefCell<Option<UnboundedSender<DiaryEvent>>>>;

/// Diary launcher plus the page-flip viewer overlay.
///
/// All navigation funnels through one coroutine so engine mutations happen in
/// order; flip and bounce timers report back into the same channel.
#[component]
pub fn DiaryView(#[props(default)] open_on_mount: bool) -> Element {
    let config = use_hook(DiaryConfig::load);
    let engine = use_signal({
        let config = config.clone();
        move || {
            let mut eng = DiaryEngine::from_config(&config);
            if open_on_mount {
                eng.open();
            }
            info!(
                platform = Platform::current().label(),
                pages = eng.total_positions(),
                "diary view mounted"
            );
            eng
        }
    });
    let mut swipe = use_signal(|| SwipeTracker::new(config.swipe_threshold));
    // Labels re-render on a language switch; the engine signal is untouched.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    let sender_slot: SenderSlot = use_hook(|| Rc::new(RefCell::new(None)));
    let sender_slot_for_loop = sender_slot.clone();

    let coroutine = use_coroutine(move |mut rx: UnboundedReceiver<DiaryEvent>| {
        let sender_slot = sender_slot_for_loop.clone();
        let mut engine_signal = engine;

        async move {
            while let Some(event) = rx.next().await {
                debug!(?event, "diary event");
                match event {
                    DiaryEvent::Intent(Intent::Advance) | DiaryEvent::SurpriseDue => {
                        let outcome = engine_signal.with_mut(|eng| {
                            refresh_flip_duration(eng);
                            eng.advance()
                        });
                        schedule_outcome(&sender_slot, outcome);
                    }
                    DiaryEvent::Intent(Intent::Retreat) => {
                        let outcome = engine_signal.with_mut(|eng| {
                            refresh_flip_duration(eng);
                            eng.retreat()
                        });
                        schedule_outcome(&sender_slot, outcome);
                    }
                    DiaryEvent::Intent(Intent::Open) => {
                        engine_signal.with_mut(|eng| eng.open());
                    }
                    DiaryEvent::Intent(Intent::Close) => {
                        engine_signal.with_mut(|eng| eng.close());
                    }
                    DiaryEvent::Intent(Intent::Surprise) => {
                        let plan = engine_signal.with_mut(|eng| eng.surprise());
                        queue_event(&sender_slot, plan.delay_ms, DiaryEvent::SurpriseDue);
                    }
                    DiaryEvent::FlipDone { ticket } => {
                        engine_signal.with_mut(|eng| eng.complete(ticket));
                    }
                    DiaryEvent::BounceDone { ticket } => {
                        engine_signal.with_mut(|eng| eng.clear_feedback(ticket));
                    }
                    DiaryEvent::ImageFailed { position } => {
                        engine_signal.with_mut(|eng| eng.mark_image_failed(position));
                    }
                }
            }
        }
    });

    sender_slot.borrow_mut().replace(coroutine.tx());

    let send = move |intent: Intent| coroutine.send(DiaryEvent::Intent(intent));

    let snapshot = engine();
    let frame = snapshot.frame();
    let pending = snapshot.pending();
    let spread = snapshot.layout() == Layout::Spread;

    let book_class = {
        let mut class = String::from("diary__book");
        if !spread {
            class.push_str(" diary__book--single");
        }
        if let Some(bounce) = snapshot.feedback() {
            class.push(' ');
            class.push_str(bounce.css_class());
        }
        class
    };

    let leaf = pending.map(|flip| {
        let (modifier, face) = match flip.direction {
            Direction::Forward => ("diary__leaf--forward", frame.current.clone()),
            Direction::Backward if spread => ("diary__leaf--backward", frame.facing.clone()),
            Direction::Backward => ("diary__leaf--backward", frame.current.clone()),
        };
        (modifier, flip.duration_ms, face)
    });

    let page_label = t!(
        "diary-page-label",
        position = frame.indicator.position,
        total = frame.indicator.total
    );
    let indicator = frame.indicator.to_string();
    let tap_zones = [
        (TapZone::Left, t!("diary-tap-prev")),
        (TapZone::Right, t!("diary-tap-next")),
    ];
    let empty = frame.is_empty();
    // Bound buttons stay clickable so the press can play the bounce.
    let at_start = snapshot.at_start();
    let at_end = snapshot.at_end();

    rsx! {
        div { style: "display:none", "{lang_marker}" }
        div { class: "diary-launcher",
            button {
                r#type: "button",
                class: "button button--primary",
                onclick: move |_| send(Intent::Open),
                {t!("diary-open")}
            }
            button {
                r#type: "button",
                class: "button button--accent",
                onclick: move |_| send(Intent::Surprise),
                {t!("diary-surprise")}
            }
        }

        if snapshot.is_visible() {
            div { class: "diary-overlay",
                div {
                    class: "diary",
                    tabindex: 0,
                    role: "region",
                    aria_label: "{page_label}",
                    onmounted: move |evt| async move {
                        let _ = evt.set_focus(true).await;
                    },
                    onkeydown: move |evt| {
                        let key = evt.key().to_string();
                        if let Some(intent) = intent_for_key(&key) {
                            evt.prevent_default();
                            send(intent);
                        }
                    },
                    ontouchstart: move |evt| {
                        if let Some(point) = evt.touches().first() {
                            let at = point.client_coordinates();
                            swipe.with_mut(|tracker| tracker.begin(at.x, at.y));
                        }
                    },
                    ontouchend: move |evt| {
                        let intent = evt.touches_changed().first().and_then(|point| {
                            let at = point.client_coordinates();
                            swipe.with_mut(|tracker| tracker.finish(at.x, at.y))
                        });
                        if let Some(intent) = intent {
                            send(intent);
                        }
                    },
                    ontouchcancel: move |_| swipe.with_mut(|tracker| tracker.cancel()),

                    div { class: "{book_class}",
                        if empty {
                            p { class: "diary__empty", {t!("diary-empty")} }
                        }
                        if spread {
                            div { class: "diary__face diary__face--left",
                                if let Some(face) = frame.facing.as_ref() {
                                    {render_face(face, coroutine)}
                                }
                            }
                        }
                        div { class: "diary__face diary__face--right",
                            if let Some(face) = frame.current.as_ref() {
                                {render_face(face, coroutine)}
                            }
                        }
                        if let Some((modifier, duration_ms, face)) = leaf {
                            div {
                                class: "diary__leaf {modifier}",
                                style: "animation-duration: {duration_ms}ms",
                                if let Some(face) = face.as_ref() {
                                    {render_face(face, coroutine)}
                                }
                            }
                        }
                        for (zone, label) in tap_zones {
                            button {
                                key: "{zone.css_class()}",
                                r#type: "button",
                                class: zone.css_class(),
                                aria_label: "{label}",
                                onclick: move |_| send(zone.intent()),
                            }
                        }
                    }

                    div { class: "diary__controls",
                        button {
                            r#type: "button",
                            class: "button button--ghost diary__prev",
                            aria_disabled: "{at_start}",
                            onclick: move |_| send(Intent::Retreat),
                            "‹ "
                            {t!("diary-prev")}
                        }
                        span { class: "diary__indicator", "{indicator}" }
                        button {
                            r#type: "button",
                            class: "button button--ghost diary__next",
                            aria_disabled: "{at_end}",
                            onclick: move |_| send(Intent::Advance),
                            {t!("diary-next")}
                            " ›"
                        }
                        button {
                            r#type: "button",
                            class: "button diary__close",
                            onclick: move |_| send(Intent::Close),
                            {t!("diary-close")}
                        }
                    }
                }
            }
        }
    }
}

fn render_face(face: &Face, coroutine: Coroutine<DiaryEvent>) -> Element {
    let position = face.position;
    match &face.content {
        PageContent::Image { src, alt } => rsx! {
            img {
                class: "diary__image",
                src: "{src}",
                alt: "{alt}",
                draggable: "false",
                onerror: move |_| coroutine.send(DiaryEvent::ImageFailed { position }),
            }
        },
        PageContent::Closing(message) => rsx! {
            div { class: "handwritten",
                for line in message.lines.iter() {
                    p { "{line}" }
                }
                p { b { "{message.signoff}" } }
            }
        },
    }
}

/// Prefer the stylesheet's flip duration so the timer matches the animation.
fn refresh_flip_duration(engine: &mut DiaryEngine) {
    if let Some(duration) = timing::css_flip_duration() {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        engine.set_flip_ms(ms);
    }
}

fn schedule_outcome(sender_slot: &SenderSlot, outcome: NavOutcome) {
    match outcome {
        NavOutcome::Started(flip) => queue_event(
            sender_slot,
            flip.duration_ms,
            DiaryEvent::FlipDone {
                ticket: flip.ticket,
            },
        ),
        NavOutcome::Bounce(bounce) => queue_event(
            sender_slot,
            bounce.duration_ms,
            DiaryEvent::BounceDone {
                ticket: bounce.ticket,
            },
        ),
        NavOutcome::Ignored => {}
    }
}

fn queue_event(sender_slot: &SenderSlot, delay_ms: u64, event: DiaryEvent) {
    if let Some(sender) = sender_slot.borrow().as_ref().cloned() {
        platform::spawn_future(async move {
            timing::sleep_ms(delay_ms).await;
            let _ = sender.unbounded_send(event);
        });
    }
}

#[derive(Debug, Clone)]
enum DiaryEvent {
    Intent(Intent),
    FlipDone { ticket: u64 },
    BounceDone { ticket: u64 },
    SurpriseDue,
    ImageFailed { position: usize },
}
