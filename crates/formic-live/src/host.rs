//! Host Effects
//!
//! Side effects the embedding page must perform: blocking alerts for
//! controls that opted out of inline display, and viewport scrolling
//! toward a focused error. Effects queue here and the host drains them;
//! the host also registers control geometry, standing in for bounding
//! rect queries.

use std::collections::HashMap;

use formic_dom::NodeId;

/// Pending host effects and registered geometry
#[derive(Debug, Default)]
pub struct Host {
    pending_alerts: Vec<String>,
    scroll_requests: Vec<f64>,
    control_tops: HashMap<NodeId, f64>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a blocking alert
    pub fn alert(&mut self, message: &str) {
        self.pending_alerts.push(message.to_string());
    }

    /// Alerts waiting to be shown
    pub fn pending_alerts(&self) -> &[String] {
        &self.pending_alerts
    }

    /// Drain the alert queue
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_alerts)
    }

    /// Queue a vertical scroll by `dy` pixels
    pub fn scroll_by(&mut self, dy: f64) {
        self.scroll_requests.push(dy);
    }

    /// Scrolls waiting to be applied
    pub fn scroll_requests(&self) -> &[f64] {
        &self.scroll_requests
    }

    /// Drain the scroll queue
    pub fn take_scrolls(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.scroll_requests)
    }

    /// Record a control's viewport-relative top edge
    pub fn set_control_top(&mut self, control: NodeId, top: f64) {
        self.control_tops.insert(control, top);
    }

    /// A control's viewport-relative top edge, if the host measured it
    pub fn control_top(&self, control: NodeId) -> Option<f64> {
        self.control_tops.get(&control).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_queue() {
        let mut host = Host::new();
        host.alert("Name is required");
        host.alert("Bad email");

        assert_eq!(host.pending_alerts().len(), 2);
        let drained = host.take_alerts();
        assert_eq!(drained[0], "Name is required");
        assert!(host.pending_alerts().is_empty());
    }

    #[test]
    fn test_geometry_registry() {
        let mut tree = formic_dom::DomTree::new();
        let control = tree.create_element("input");

        let mut host = Host::new();
        assert_eq!(host.control_top(control), None);

        host.set_control_top(control, 12.5);
        assert_eq!(host.control_top(control), Some(12.5));

        host.scroll_by(-37.5);
        assert_eq!(host.take_scrolls(), vec![-37.5]);
    }
}
