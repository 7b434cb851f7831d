//! Spotted-report bus: publish/subscribe with per-subscriber delivery
//! delay, keyed by tick.
//!
//! Sightings propagate to teammates as explicit messages instead of a
//! shared mutable map: a report published at tick T reaches a subscriber
//! at T + its personal delay, modeling callout latency.

use std::collections::{HashMap, VecDeque};

use breach_core::components::SpottedReport;
use breach_core::types::AgentId;

/// Deferred-delivery queues per subscriber.
#[derive(Debug, Default)]
pub struct SpottedBus {
    delays: HashMap<AgentId, u64>,
    queues: HashMap<AgentId, VecDeque<(u64, SpottedReport)>>,
}

impl SpottedBus {
    /// Register a subscriber with its personal delivery delay in ticks.
    /// Re-subscribing replaces the delay and clears the pending queue.
    pub fn subscribe(&mut self, id: AgentId, delay_ticks: u64) {
        self.delays.insert(id, delay_ticks);
        self.queues.insert(id, VecDeque::new());
    }

    /// Publish a report to a set of listeners. Each listener receives it
    /// after its own delay; unsubscribed listeners are skipped.
    pub fn publish(&mut self, report: SpottedReport, listeners: &[AgentId], tick: u64) {
        for id in listeners {
            let Some(&delay) = self.delays.get(id) else {
                continue;
            };
            if let Some(queue) = self.queues.get_mut(id) {
                queue.push_back((tick + delay, report));
            }
        }
    }

    /// Pop every report due at or before `tick`, in subscriber id order
    /// for determinism.
    pub fn deliver(&mut self, tick: u64) -> Vec<(AgentId, SpottedReport)> {
        let mut due: Vec<(AgentId, SpottedReport)> = Vec::new();
        let mut ids: Vec<AgentId> = self.queues.keys().copied().collect();
        ids.sort();
        for id in ids {
            let queue = self.queues.get_mut(&id).expect("subscribed id");
            while let Some(&(deliver_tick, report)) = queue.front() {
                if deliver_tick > tick {
                    break;
                }
                queue.pop_front();
                due.push((id, report));
            }
        }
        due
    }

    /// Drop all pending reports (round reset).
    pub fn clear(&mut self) {
        for queue in self.queues.values_mut() {
            queue.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breach_core::types::Position;

    fn report(enemy: u8, tick: u64) -> SpottedReport {
        SpottedReport {
            enemy: AgentId(enemy),
            position: Position::new(1.0, 2.0),
            spotted_tick: tick,
        }
    }

    #[test]
    fn delivery_respects_per_subscriber_delay() {
        let mut bus = SpottedBus::default();
        bus.subscribe(AgentId(1), 2);
        bus.subscribe(AgentId(2), 5);

        bus.publish(report(9, 10), &[AgentId(1), AgentId(2)], 10);

        assert!(bus.deliver(11).is_empty());
        let at_12 = bus.deliver(12);
        assert_eq!(at_12.len(), 1);
        assert_eq!(at_12[0].0, AgentId(1));

        let at_15 = bus.deliver(15);
        assert_eq!(at_15.len(), 1);
        assert_eq!(at_15[0].0, AgentId(2));
        assert!(bus.deliver(100).is_empty());
    }

    #[test]
    fn unsubscribed_listeners_are_skipped() {
        let mut bus = SpottedBus::default();
        bus.subscribe(AgentId(1), 0);
        bus.publish(report(9, 1), &[AgentId(1), AgentId(3)], 1);
        assert_eq!(bus.deliver(1).len(), 1);
    }

    #[test]
    fn clear_drops_pending_reports() {
        let mut bus = SpottedBus::default();
        bus.subscribe(AgentId(1), 1);
        bus.publish(report(9, 1), &[AgentId(1)], 1);
        bus.clear();
        assert!(bus.deliver(10).is_empty());
    }
}
