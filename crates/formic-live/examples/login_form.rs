//! Login form demo
//!
//! Builds a small login form, drives it through typing and submit
//! events, and prints the validation state a page would render.
//!
//! Run with: cargo run -p formic-live --example login_form

use std::time::{Duration, Instant};

use anyhow::Result;
use formic_dom::{ControlValue, Document, FormEvent, NodeId};
use formic_live::{LiveValidator, OptionsPatch, RuleEngine, RULES_ATTR};
use serde_json::Value;

/// Minimal rule engine: filled, email and minLength operators
struct BasicRules;

impl RuleEngine for BasicRules {
    fn evaluate_rule(
        &self,
        _doc: &Document,
        _control: NodeId,
        op: &str,
        arg: Option<&Value>,
        value: &ControlValue,
    ) -> Option<bool> {
        match op {
            ":filled" => Some(!value.is_empty()),
            ":email" => {
                let text = value.display();
                Some(text.contains('@') && text.contains('.'))
            }
            ":minLength" => {
                let min = arg.and_then(Value::as_u64).unwrap_or(0) as usize;
                Some(value.display().chars().count() >= min)
            }
            _ => None,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut doc = Document::new();
    let body = doc.body();
    let form = doc.tree.create_element("form");
    doc.tree.set_attr(form, "id", "login");
    doc.tree.append_child(body, form);

    let email_group = doc.tree.create_element("div");
    doc.tree.set_attr(email_group, "class", "form-group");
    doc.tree.append_child(form, email_group);
    let email = doc.tree.create_element("input");
    doc.tree.set_attr(email, "id", "email");
    doc.tree.set_attr(email, "name", "email");
    doc.tree.set_attr(
        email,
        RULES_ATTR,
        r#"[
            {"op": ":filled", "msg": "Enter your e-mail."},
            {"op": ":email", "msg": "Enter a valid e-mail address."}
        ]"#,
    );
    doc.tree.append_child(email_group, email);

    let password_group = doc.tree.create_element("div");
    doc.tree.set_attr(password_group, "class", "form-group");
    doc.tree.append_child(form, password_group);
    let password = doc.tree.create_element("input");
    doc.tree.set_attr(password, "id", "password");
    doc.tree.set_attr(password, "name", "password");
    doc.tree.set_attr(password, "type", "password");
    doc.tree.set_attr(
        password,
        RULES_ATTR,
        r#"[{"op": ":minLength", "msg": "Use at least 8 characters.", "arg": 8}]"#,
    );
    doc.tree.append_child(password_group, password);

    let mut live = LiveValidator::new(BasicRules);
    live.set_options(OptionsPatch::default().wait(Some(300)).show_valid(true));
    live.init_on_load(&mut doc);

    let start = Instant::now();

    // The user types an incomplete address and pauses past the debounce
    doc.tree.set_attr(email, "value", "alice@");
    live.handle_event(&mut doc, FormEvent::KeyUp { target: email, key: 50 }, start);
    live.tick(&mut doc, start + Duration::from_millis(300));
    print_state(&doc, "after typing \"alice@\"");

    // Fixing the address and leaving the field clears the error
    doc.tree.set_attr(email, "value", "alice@example.org");
    live.handle_event(
        &mut doc,
        FormEvent::Blur { target: email },
        start + Duration::from_millis(400),
    );
    print_state(&doc, "after fixing the address");

    // Submitting with a short password blocks the submission
    doc.tree.set_attr(password, "value", "hunter2");
    let submitted = live.handle_event(
        &mut doc,
        FormEvent::Submit { form },
        start + Duration::from_millis(500),
    );
    println!("submission allowed: {submitted}");
    print_state(&doc, "after submit");

    Ok(())
}

fn print_state(doc: &Document, label: &str) {
    println!("-- {label}");
    for id in ["email", "password"] {
        let control = doc.get_element_by_id(id).unwrap();
        let group = doc.tree.parent(control).unwrap();
        let classes = doc.tree.attr(group, "class").unwrap_or("");
        let message = doc
            .get_element_by_id(&format!("{id}_message"))
            .map(|node| doc.tree.text_content(node))
            .unwrap_or_default();
        println!("   {id}: group=[{classes}] message=\"{message}\"");
    }
}
