use chrono::Local;

use crate::models::ProgressEvent;

/// Append-only event stream for one operation, forwarded to a subscriber.
pub struct ProgressLog<'a> {
    events: Vec<ProgressEvent>,
    sink: &'a dyn Fn(&ProgressEvent),
}

impl<'a> ProgressLog<'a> {
    pub fn new(sink: &'a dyn Fn(&ProgressEvent)) -> Self {
        Self {
            events: Vec::new(),
            sink,
        }
    }

    pub fn emit(&mut self, message: impl Into<String>) {
        let event = ProgressEvent {
            seq: self.events.len(),
            timestamp: Local::now(),
            message: message.into(),
        };
        log::info!("{}", event.message);
        (self.sink)(&event);
        self.events.push(event);
    }

    pub fn into_events(self) -> Vec<ProgressEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn events_are_numbered_and_forwarded_in_order() {
        let seen = RefCell::new(Vec::new());
        let sink = |e: &ProgressEvent| seen.borrow_mut().push(e.message.clone());
        let mut log = ProgressLog::new(&sink);
        log.emit("one");
        log.emit(String::from("two"));

        let events = log.into_events();
        assert_eq!(events.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![0, 1]);
        assert!(events[0].timestamp <= events[1].timestamp);
        assert_eq!(*seen.borrow(), vec!["one", "two"]);
        assert!(events[1].display_line().ends_with("] two"));
    }
}
