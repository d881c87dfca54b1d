use std::sync::{Arc, Mutex};

use crate::event::{
    command::{CommandEvent, CommandFailedEvent, CommandStartedEvent, CommandSucceededEvent},
    EventHandler,
};

/// A buffer of command events that provides utility methods for querying the events received so
/// far. Register it with a bus via [`EventBuffer::handler`].
#[derive(Clone, Debug, Default)]
pub(crate) struct EventBuffer {
    events: Arc<Mutex<Vec<CommandEvent>>>,
}

impl EventBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn handler(&self) -> EventHandler<CommandEvent> {
        let events = self.events.clone();
        EventHandler::callback(move |ev| events.lock().unwrap().push(ev))
    }

    /// Every event received so far, in delivery order.
    pub(crate) fn all(&self) -> Vec<CommandEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Gets all of the command started events for the specified command name.
    pub(crate) fn get_command_started_events(&self, command_name: &str) -> Vec<CommandStartedEvent> {
        self.all()
            .into_iter()
            .filter_map(|event| match event {
                CommandEvent::Started(event) if event.command_name == command_name => Some(event),
                _ => None,
            })
            .collect()
    }

    /// Gets the first started/succeeded pair of events for the given command name.
    ///
    /// Panics if the command failed or could not be found in the events.
    pub(crate) fn get_successful_command_execution(
        &self,
        command_name: &str,
    ) -> (CommandStartedEvent, CommandSucceededEvent) {
        match self.pair_for(command_name) {
            (CommandEvent::Started(started), CommandEvent::Succeeded(succeeded)) => {
                (started, succeeded)
            }
            pair => panic!(
                "First event pair for {:?} not (Started, Succeeded): {:?}",
                command_name, pair
            ),
        }
    }

    /// Gets the first started/failed pair of events for the given command name.
    ///
    /// Panics if the command succeeded or could not be found in the events.
    pub(crate) fn get_failed_command_execution(
        &self,
        command_name: &str,
    ) -> (CommandStartedEvent, CommandFailedEvent) {
        match self.pair_for(command_name) {
            (CommandEvent::Started(started), CommandEvent::Failed(failed)) => (started, failed),
            pair => panic!(
                "First event pair for {:?} not (Started, Failed): {:?}",
                command_name, pair
            ),
        }
    }

    fn pair_for(&self, command_name: &str) -> (CommandEvent, CommandEvent) {
        let events: Vec<_> = self
            .all()
            .into_iter()
            .filter(|event| event.command_name() == command_name)
            .collect();
        match events.as_slice() {
            [first, second, ..] => (first.clone(), second.clone()),
            _ => panic!("too few command events for {:?}: {:?}", command_name, events),
        }
    }
}
