//! Capture-phase page listeners. Attached only while the session is active.

use std::cell::Cell;

use dc_core::EventOutcome;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, KeyboardEvent, MouseEvent};

use crate::{spawn_flush, with_session};

pub struct PageListeners {
    document: web_sys::Document,
    handlers: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
    attached: Cell<bool>,
}

impl PageListeners {
    pub fn new(document: web_sys::Document) -> Self {
        let handlers = vec![
            ("mousemove", Closure::<dyn FnMut(Event)>::new(on_mouse_move)),
            ("click", Closure::<dyn FnMut(Event)>::new(on_click)),
            ("keydown", Closure::<dyn FnMut(Event)>::new(on_key_down)),
            ("keyup", Closure::<dyn FnMut(Event)>::new(on_key_up)),
        ];
        Self {
            document,
            handlers,
            attached: Cell::new(false),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    pub fn set_attached(&self, attached: bool) {
        if self.attached.replace(attached) == attached {
            return;
        }
        for (kind, handler) in &self.handlers {
            let callback = handler.as_ref().unchecked_ref();
            let result = if attached {
                self.document.add_event_listener_with_callback_and_bool(kind, callback, true)
            } else {
                self.document.remove_event_listener_with_callback_and_bool(kind, callback, true)
            };
            if let Err(err) = result {
                log::warn!("Could not update {} listener: {:?}", kind, err);
            }
        }
    }
}

fn target_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn on_mouse_move(event: Event) {
    if let Some(target) = target_element(&event) {
        with_session(|session| session.pointer_moved(target));
    }
}

fn on_click(event: Event) {
    let Some(target) = target_element(&event) else {
        return;
    };
    let primary = event.dyn_ref::<MouseEvent>().map_or(true, |mouse| mouse.button() == 0);
    finish(&event, with_session(|session| session.clicked(&target, primary)));
}

fn on_key_down(event: Event) {
    if let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() {
        let key = keyboard.key();
        finish(&event, with_session(|session| session.key_down(&key)));
    }
}

fn on_key_up(event: Event) {
    if let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() {
        let key = keyboard.key();
        finish(&event, with_session(|session| session.key_up(&key)));
    }
}

fn finish(event: &Event, outcome: Option<EventOutcome>) {
    let Some(outcome) = outcome else {
        return;
    };
    if outcome.consumed {
        event.prevent_default();
        event.stop_propagation();
    }
    if let Some(flush) = outcome.flush {
        spawn_flush(flush);
    }
}
