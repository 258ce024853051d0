//! Form State
//!
//! Per-form flags, keyed by form id, created at initialization and kept
//! for the page lifetime.

use std::collections::HashMap;

use formic_dom::{Document, NodeId};

/// Flags tracked for one initialized form
#[derive(Debug, Clone, Copy, Default)]
pub struct FormFlags {
    /// A control of this form currently shows an error
    pub has_error: bool,
    /// An on-load validation pass is running; error clearing and focus
    /// side effects are suppressed
    pub on_load_validation: bool,
    /// Submit/image control that triggered the pending submission
    pub submitted_by: Option<NodeId>,
}

/// Registry of initialized forms
#[derive(Debug, Default)]
pub struct FormRegistry {
    forms: HashMap<String, FormFlags>,
}

/// Key a form by its id attribute; id-less forms share the empty key,
/// as they shared one slot in the id-keyed map this models.
pub fn form_key(doc: &Document, form: NodeId) -> String {
    doc.tree().attr(form, "id").unwrap_or_default().to_string()
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or reset) the entry for a form
    pub fn register(&mut self, doc: &Document, form: NodeId) {
        self.forms.insert(form_key(doc, form), FormFlags::default());
    }

    /// Check whether a form was initialized
    pub fn is_registered(&self, doc: &Document, form: NodeId) -> bool {
        self.forms.contains_key(&form_key(doc, form))
    }

    /// Read a form's flags; unregistered forms read as all-false
    pub fn flags(&self, doc: &Document, form: NodeId) -> FormFlags {
        self.forms
            .get(&form_key(doc, form))
            .copied()
            .unwrap_or_default()
    }

    /// Mutate a form's flags, creating the entry if needed
    pub fn update<F>(&mut self, doc: &Document, form: NodeId, mutate: F)
    where
        F: FnOnce(&mut FormFlags),
    {
        let entry = self.forms.entry(form_key(doc, form)).or_default();
        mutate(entry);
    }

    /// Flags of a control's owning form; controls outside any form read
    /// as all-false
    pub fn flags_of_owner(&self, doc: &Document, control: NodeId) -> FormFlags {
        match formic_dom::controls::form_owner(doc.tree(), control) {
            Some(form) => self.flags(doc, form),
            None => FormFlags::default(),
        }
    }

    /// Mutate the flags of a control's owning form, if it has one
    pub fn update_owner<F>(&mut self, doc: &Document, control: NodeId, mutate: F)
    where
        F: FnOnce(&mut FormFlags),
    {
        if let Some(form) = formic_dom::controls::form_owner(doc.tree(), control) {
            self.update(doc, form, mutate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_lifecycle() {
        let mut doc = Document::new();
        let body = doc.body();
        let form = doc.tree.create_element("form");
        doc.tree.set_attr(form, "id", "signup");
        doc.tree.append_child(body, form);

        let mut registry = FormRegistry::new();
        assert!(!registry.is_registered(&doc, form));
        assert!(!registry.flags(&doc, form).has_error);

        registry.register(&doc, form);
        assert!(registry.is_registered(&doc, form));

        registry.update(&doc, form, |f| f.has_error = true);
        assert!(registry.flags(&doc, form).has_error);

        registry.register(&doc, form);
        assert!(!registry.flags(&doc, form).has_error);
    }

    #[test]
    fn test_owner_flags() {
        let mut doc = Document::new();
        let body = doc.body();
        let form = doc.tree.create_element("form");
        doc.tree.set_attr(form, "id", "f");
        let input = doc.tree.create_element("input");
        doc.tree.append_child(body, form);
        doc.tree.append_child(form, input);

        let mut registry = FormRegistry::new();
        registry.update_owner(&doc, input, |f| f.on_load_validation = true);
        assert!(registry.flags_of_owner(&doc, input).on_load_validation);

        let orphan = doc.tree.create_element("input");
        doc.tree.append_child(body, orphan);
        assert!(!registry.flags_of_owner(&doc, orphan).has_error);
    }
}
