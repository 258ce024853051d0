//! Event-Driven Revalidation Scheduler
//!
//! Binds per-control handlers exactly once and turns input events into
//! immediate or debounced validation. Time is threaded explicitly; the
//! host pumps `tick` from its event loop.

use std::time::{Duration, Instant};

use formic_dom::{controls, Document, FormEvent, NodeId};
use tracing::trace;

use crate::decorate;
use crate::keys;
use crate::message;
use crate::rules::RuleEngine;
use crate::validator::{LiveValidator, INITIALIZED_ATTR};

/// Debounce delays below this floor leave the keydown clear disabled
const KEYDOWN_CLEAR_FLOOR_MS: u64 = 200;

impl<E: RuleEngine> LiveValidator<E> {
    /// Bind live-validation handlers to a control, once.
    ///
    /// Controls that opted out, and controls already initialized, are
    /// left untouched.
    pub fn setup_handlers(&mut self, doc: &mut Document, control: NodeId) {
        if doc
            .tree()
            .has_class(control, &self.options().disable_live_validation_class)
        {
            return;
        }
        if doc.tree().has_attr(control, INITIALIZED_ATTR) {
            return;
        }
        doc.tree_mut().set_attr(control, INITIALIZED_ATTR, "true");
        trace!(control = ?control, "handlers bound");
    }

    /// Route one input event.
    ///
    /// Returns the submission verdict for `Submit` events (`false`
    /// cancels the submission); every other event returns `true`.
    pub fn handle_event(&mut self, doc: &mut Document, event: FormEvent, now: Instant) -> bool {
        match event {
            FormEvent::Change { target } | FormEvent::Blur { target } => {
                if self.is_initialized(doc, target) {
                    self.timers.cancel(target);
                    self.validate_control(doc, target);
                }
                true
            }
            FormEvent::KeyDown { target, key } => {
                if self.is_initialized(doc, target) {
                    self.on_key_down(doc, target, key);
                }
                true
            }
            FormEvent::KeyUp { target, key } => {
                if self.is_initialized(doc, target) {
                    self.on_key_up(target, key, now);
                }
                true
            }
            FormEvent::Click { target } => {
                self.record_submitter(doc, target);
                true
            }
            FormEvent::Submit { form } => {
                if self.registry().is_registered(doc, form) {
                    self.validate_form(doc, form)
                } else {
                    true
                }
            }
        }
    }

    /// Fire whatever came due: the focus follow-up (guard reset plus
    /// offset scroll), then debounced validations.
    pub fn tick(&mut self, doc: &mut Document, now: Instant) {
        if let Some(control) = self.pending_focus.take() {
            self.focusing = false;
            if let Some(offset) = self.options().focus_screen_offset_y {
                if let Some(top) = self.host().control_top(control) {
                    if top < offset {
                        self.host_mut().scroll_by(top - offset);
                    }
                }
            }
        }

        for control in self.timers.take_due(now) {
            trace!(control = ?control, "debounce fired");
            self.validate_control(doc, control);
        }
    }

    fn is_initialized(&self, doc: &Document, control: NodeId) -> bool {
        doc.tree().has_attr(control, INITIALIZED_ATTR)
    }

    /// Ordinary typing suspends judgment: clear the visual state and
    /// drop any pending validation. Navigation/modifier keys leave the
    /// state alone, as does a sub-floor debounce delay.
    fn on_key_down(&mut self, doc: &mut Document, control: NodeId, key: u32) {
        if keys::is_special_key(key) {
            return;
        }
        match self.options().wait {
            None => {}
            Some(wait) if wait >= KEYDOWN_CLEAR_FLOOR_MS => {}
            Some(_) => return,
        }

        let group = decorate::group_element(doc, self.options(), control);
        doc.tree_mut()
            .remove_class(group, &self.options().control_error_class);
        doc.tree_mut()
            .remove_class(group, &self.options().control_valid_class);

        let message_node = message::message_element(doc, self.options(), control);
        doc.tree_mut().set_text_content(message_node, "");
        doc.tree_mut().set_class(message_node, "");

        self.timers.cancel(control);
    }

    /// Releasing a key (other than Tab) restarts the debounce window.
    fn on_key_up(&mut self, control: NodeId, key: u32, now: Instant) {
        let Some(wait) = self.options().wait else { return };
        if key == keys::TAB {
            return;
        }
        self.timers
            .schedule(control, now + Duration::from_millis(wait));
    }

    /// Remember which submit/image control triggered the submission,
    /// for scope resolution.
    fn record_submitter(&mut self, doc: &Document, target: NodeId) {
        let kind = controls::control_type(doc.tree(), target);
        if kind != "submit" && kind != "image" {
            return;
        }
        let Some(form) = controls::form_owner(doc.tree(), target) else {
            return;
        };
        // Form state exists only for initialized forms
        if self.registry().is_registered(doc, form) {
            self.registry_mut()
                .update(doc, form, |flags| flags.submitted_by = Some(target));
        }
    }
}
